// SPDX-License-Identifier: MPL-2.0
//! Ogg Opus encoding on top of libopusenc, writing pages into any
//! [`std::io::Write`].
//!
//! libopusenc reports output through C callbacks that only carry a
//! pointer-sized token. Each [`Encoder`] registers its sink in the
//! process-wide [`WriterRegistry`] and passes the resulting [`WriterId`] as
//! that token; the callbacks look the sink up again on every page.
#![warn(
	clippy::correctness,
	clippy::suspicious,
	clippy::complexity,
	clippy::perf,
	clippy::style
)]
mod callbacks;
mod comments;
pub mod encode;
pub mod family;
pub mod registry;
pub mod sink;
#[macro_use]
pub mod error;

pub use crate::{
	encode::{Encodable, Encoder, EncoderConfig, EncoderState},
	error::{EncoderError, OpeErrorCode},
	family::ChannelFamily,
	registry::{registry, WriterId, WriterRegistry},
	sink::{OggSink, SharedSink},
};

/// Returns the libopusenc version string.
pub fn libopusenc_version() -> &'static str {
	use opusink_sys::ope_get_version_string;
	use std::ffi::CStr;

	// SAFETY: libopusenc returns a pointer to a static version string.
	unsafe { CStr::from_ptr(ope_get_version_string()) }
		.to_str()
		.unwrap_or("unknown")
}

/// Returns the ABI version of the linked libopusenc.
pub fn libopusenc_abi_version() -> i32 {
	// SAFETY: no preconditions.
	unsafe { opusink_sys::ope_get_abi_version() }
}
