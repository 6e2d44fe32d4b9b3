// SPDX-License-Identifier: MPL-2.0
//! Raw bindings to libopusenc.
//!
//! `bindings.rs` is a checked-in subset covering what `opusink` calls. The
//! `generate-bindings` feature replaces it with the complete bindgen output
//! for `bindings.h`, generated against the headers being linked.
#![allow(
	non_camel_case_types,
	non_snake_case,
	non_upper_case_globals,
	rustdoc::broken_intra_doc_links
)]

include!("bindings.rs");
