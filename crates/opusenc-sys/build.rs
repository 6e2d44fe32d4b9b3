// SPDX-License-Identifier: MPL-2.0
use std::path::{Path, PathBuf};

const LIBOPUSENC_SOURCES: &[&str] = &[
	"src/ogg_packer.c",
	"src/opus_header.c",
	"src/opusenc.c",
	"src/picture.c",
	"src/resample.c",
	"src/unicode_support.c",
];

fn source_dir(env_var: &str, submodule: &str) -> PathBuf {
	println!("cargo:rerun-if-env-changed={env_var}");
	match std::env::var(env_var).map(PathBuf::from) {
		Ok(dir) if dir.exists() => return dir,
		Ok(dir) => panic!("given {env_var} directory ({}) does not exist!", dir.display()),
		_ => {}
	}
	match std::env::var("CARGO_MANIFEST_DIR")
		.map(PathBuf::from)
		.map(|path| path.join(submodule))
	{
		Ok(dir) if dir.exists() => dir,
		Ok(dir) => panic!("{submodule} source submodule ({}) doesn't exist!", dir.display()),
		_ => panic!("CARGO_MANIFEST_DIR not set!"),
	}
}

fn build_opus_with_cmake(libopus_dir: &Path) -> PathBuf {
	println!(
		"cargo:info=Building libopus from {} with cmake.",
		libopus_dir.display()
	);
	cmake::Config::new(libopus_dir)
		.define("OPUS_BUILD_PROGRAMS", "OFF")
		.define("OPUS_BUILD_TESTING", "OFF")
		.build()
}

fn build_opusenc_with_cc(libopusenc_dir: &Path, opus_include_dir: &Path) {
	println!(
		"cargo:info=Building libopusenc from {} with cc.",
		libopusenc_dir.display()
	);
	let mut build = cc::Build::new();
	for source in LIBOPUSENC_SOURCES {
		build.file(libopusenc_dir.join(source));
	}
	build
		.include(libopusenc_dir.join("include"))
		.include(libopusenc_dir.join("src"))
		.include(opus_include_dir)
		.define("OUTSIDE_SPEEX", None)
		.define("RANDOM_PREFIX", Some("libopusenc"))
		.define("OPE_BUILD", None)
		.define("PACKAGE_NAME", Some("\"libopusenc\""))
		.define("PACKAGE_VERSION", Some("\"bundled\""))
		.warnings(false)
		.compile("opusenc");
}

fn link_bundled() -> Vec<PathBuf> {
	let libopus_dir = source_dir("LIBOPUS_SRC", "libopus");
	let libopusenc_dir = source_dir("LIBOPUSENC_SRC", "libopusenc");
	println!("cargo:rerun-if-changed={}", libopus_dir.join("src").display());
	println!(
		"cargo:rerun-if-changed={}",
		libopusenc_dir.join("src").display()
	);

	let opus_build_dir = build_opus_with_cmake(&libopus_dir);
	let opus_include_dir = opus_build_dir.join("include").join("opus");
	// cc emits the link directives for libopusenc itself.
	build_opusenc_with_cc(&libopusenc_dir, &opus_include_dir);

	println!(
		"cargo:info=Linking libopus from {}",
		opus_build_dir.display()
	);
	println!("cargo:rustc-link-lib=static=opus");
	for lib_dir in ["lib", "lib64"] {
		println!(
			"cargo:rustc-link-search=native={}",
			opus_build_dir.join(lib_dir).display()
		);
	}
	println!("cargo:include={}", libopusenc_dir.join("include").display());

	vec![libopusenc_dir.join("include"), opus_include_dir]
}

fn link_system() -> Vec<PathBuf> {
	println!("cargo:rerun-if-env-changed=LIBOPUSENC_LIB_DIR");
	if let Ok(dir) = std::env::var("LIBOPUSENC_LIB_DIR") {
		println!("cargo:rustc-link-search=native={dir}");
	}
	println!("cargo:rustc-link-lib=opusenc");
	println!("cargo:rustc-link-lib=opus");

	vec![
		PathBuf::from("/usr/include/opus"),
		PathBuf::from("/usr/local/include/opus"),
	]
}

#[cfg(feature = "generate-bindings")]
fn generate_bindings(include_dirs: &[PathBuf]) {
	use bindgen::callbacks::ParseCallbacks;

	#[derive(Debug)]
	struct DoxygenCallbacks;

	impl ParseCallbacks for DoxygenCallbacks {
		fn process_comment(&self, comment: &str) -> Option<String> {
			Some(doxygen_rs::transform(comment))
		}
	}

	let out_file = std::env::var("CARGO_MANIFEST_DIR")
		.map(PathBuf::from)
		.expect("CARGO_MANIFEST_DIR not set")
		.join("src/bindings.rs");
	let bindings = bindgen::Builder::default()
		.header("src/bindings.h")
		.clang_args(
			include_dirs
				.iter()
				.map(|dir| format!("-I{}", dir.display())),
		)
		.allowlist_function("ope_.*")
		.allowlist_type("OggOpus.*|OpusEncCallbacks|ope_.*")
		.allowlist_var("OPE_.*|OPUS_.*")
		.generate_block(true)
		.merge_extern_blocks(true)
		.sort_semantically(true)
		.parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
		.parse_callbacks(Box::new(DoxygenCallbacks))
		.generate()
		.expect("failed to generate libopusenc bindings");
	bindings
		.write_to_file(out_file)
		.expect("Couldn't write bindings!");
}

fn main() {
	println!("cargo:rerun-if-changed=src/bindings.h");
	let include_dirs = if std::env::var("CARGO_FEATURE_BUNDLED").is_ok() {
		link_bundled()
	} else {
		link_system()
	};
	#[cfg(feature = "generate-bindings")]
	generate_bindings(&include_dirs);
	#[cfg(not(feature = "generate-bindings"))]
	let _ = include_dirs;
}
