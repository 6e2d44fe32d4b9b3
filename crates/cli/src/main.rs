use anyhow::Context;
use clap::Parser;
use opusink::{ChannelFamily, Encoder, EncoderConfig};
use std::{
	fs::File,
	io::{BufReader, BufWriter, Write},
	path::PathBuf,
	process::ExitCode,
};
use tracing_subscriber::EnvFilter;

mod pcm;

use pcm::PcmReader;

const SAMPLES_PER_CHANNEL: usize = 256;

/// Encodes raw interleaved 16-bit little-endian PCM into an Ogg Opus file.
#[derive(Parser, Debug)]
#[command(name = "opusink", version)]
struct Cli {
	/// Input sampling rate in Hz
	#[arg(long, default_value_t = 44100, value_parser = clap::value_parser!(i32).range(1..))]
	rate: i32,

	/// Number of channels (1 or 2)
	#[arg(long, default_value_t = 2, value_parser = clap::value_parser!(i32).range(1..=2))]
	nchannels: i32,

	/// Raw PCM input file
	#[arg(long)]
	input: PathBuf,

	/// Ogg Opus output file
	#[arg(long, default_value = "out.ogg")]
	output: PathBuf,

	/// Extra OpusTags comment, as TAG=VALUE (repeatable)
	#[arg(long = "comment", value_name = "TAG=VALUE", value_parser = parse_comment)]
	comments: Vec<(String, String)>,

	/// Log lifecycle details
	#[arg(short, long)]
	verbose: bool,
}

fn parse_comment(raw: &str) -> Result<(String, String), String> {
	match raw.split_once('=') {
		Some((tag, value)) if !tag.is_empty() => Ok((tag.to_owned(), value.to_owned())),
		_ => Err(format!("expected TAG=VALUE, got {raw:?}")),
	}
}

/// A failed run, classified by the process exit code it maps to.
#[derive(Debug)]
enum Failure {
	/// Bad arguments, unopenable files, or a rejected encoder configuration.
	Setup(anyhow::Error),
	/// Reading the PCM input failed.
	Input(anyhow::Error),
	Encode(anyhow::Error),
}

impl Failure {
	fn exit_code(&self) -> u8 {
		match self {
			Self::Setup(_) => 1,
			Self::Input(_) => 2,
			Self::Encode(_) => 3,
		}
	}

	fn error(&self) -> &anyhow::Error {
		match self {
			Self::Setup(err) | Self::Input(err) | Self::Encode(err) => err,
		}
	}
}

fn run(cli: &Cli) -> Result<(), Failure> {
	let input = File::open(&cli.input)
		.with_context(|| format!("unable to open input file {}", cli.input.display()))
		.map_err(Failure::Setup)?;
	let output = File::create(&cli.output)
		.with_context(|| format!("unable to create file {}", cli.output.display()))
		.map_err(Failure::Setup)?;

	let mut config = EncoderConfig::new(cli.rate, cli.nchannels, ChannelFamily::MonoStereo);
	config.comments.extend(cli.comments.iter().cloned());
	let mut encoder = Encoder::new(config, BufWriter::new(output));
	encoder
		.init()
		.context("error while initializing encoder")
		.map_err(Failure::Setup)?;

	let channels = cli.nchannels as usize;
	let mut reader = PcmReader::new(BufReader::new(input), channels, SAMPLES_PER_CHANNEL);
	let mut frames = 0usize;
	loop {
		let chunk = match reader.next_chunk() {
			Ok(Some(chunk)) => chunk,
			Ok(None) => break,
			Err(err) => return Err(Failure::Input(anyhow::Error::new(err).context("i/o error"))),
		};
		let samples_per_channel = chunk.len() / channels;
		encoder
			.encode(chunk, samples_per_channel)
			.context("encoding error")
			.map_err(Failure::Encode)?;
		frames += samples_per_channel;
	}

	encoder
		.drain()
		.context("encoding error")
		.map_err(Failure::Encode)?;
	let mut output = encoder
		.into_inner()
		.context("encoding error")
		.map_err(Failure::Encode)?;
	output
		.flush()
		.with_context(|| format!("unable to write {}", cli.output.display()))
		.map_err(Failure::Encode)?;

	tracing::info!(
		frames,
		seconds = frames as f64 / cli.rate as f64,
		output = %cli.output.display(),
		"encoding complete"
	);
	Ok(())
}

fn init_tracing(verbose: bool) {
	let default = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn main() -> ExitCode {
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(err) => {
			let _ = err.print();
			return if err.use_stderr() {
				ExitCode::from(1)
			} else {
				ExitCode::SUCCESS
			};
		}
	};
	init_tracing(cli.verbose);
	tracing::debug!(libopusenc = opusink::libopusenc_version(), "starting");

	match run(&cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(failure) => {
			eprintln!("{:#}", failure.error());
			ExitCode::from(failure.exit_code())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	fn cli(input: PathBuf, output: PathBuf) -> Cli {
		Cli {
			rate: 44100,
			nchannels: 2,
			input,
			output,
			comments: vec![("TITLE".into(), "silence".into())],
			verbose: false,
		}
	}

	#[test]
	fn cli_definition_is_valid() {
		Cli::command().debug_assert();
	}

	#[test]
	fn rejects_unconventional_channel_counts() {
		let err = Cli::try_parse_from(["opusink", "--input", "a.pcm", "--nchannels", "3"])
			.unwrap_err();
		assert!(err.use_stderr());
	}

	#[test]
	fn applies_defaults() {
		let cli = Cli::try_parse_from(["opusink", "--input", "a.pcm"]).unwrap();
		assert_eq!(cli.rate, 44100);
		assert_eq!(cli.nchannels, 2);
		assert_eq!(cli.output, PathBuf::from("out.ogg"));
		assert!(cli.comments.is_empty());
	}

	#[test]
	fn parses_comments() {
		assert_eq!(
			parse_comment("ARTIST=a=b"),
			Ok(("ARTIST".to_owned(), "a=b".to_owned()))
		);
		assert!(parse_comment("=value").is_err());
		assert!(parse_comment("novalue").is_err());
	}

	#[test]
	fn encodes_a_pcm_file() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("in.pcm");
		let output = dir.path().join("out.ogg");
		// 10 full chunks plus a short tail.
		let samples = (SAMPLES_PER_CHANNEL * 10 + 100) * 2;
		std::fs::write(&input, vec![0u8; samples * 2]).unwrap();

		run(&cli(input, output.clone())).unwrap();

		let ogg = std::fs::read(output).unwrap();
		assert!(ogg.starts_with(b"OggS"));
		assert!(ogg.windows(13).any(|window| window == b"TITLE=silence"));
	}

	#[test]
	fn missing_input_is_a_setup_failure() {
		let dir = tempfile::tempdir().unwrap();
		let failure = run(&cli(dir.path().join("missing.pcm"), dir.path().join("out.ogg")))
			.unwrap_err();
		assert_eq!(failure.exit_code(), 1);
	}

	#[test]
	fn unreadable_input_is_an_input_failure() {
		let dir = tempfile::tempdir().unwrap();
		// Reading a directory fails after it has been opened.
		let failure = run(&cli(dir.path().to_path_buf(), dir.path().join("out.ogg")))
			.unwrap_err();
		assert_eq!(failure.exit_code(), 2);
	}
}
