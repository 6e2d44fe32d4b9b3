// SPDX-License-Identifier: MPL-2.0
use crate::{error::OpeErrorCode, map_error};
use opusink_sys::{ope_encoder_write, ope_encoder_write_float, OggOpusEnc};
use std::{ffi::c_int, ptr::NonNull};

/// A PCM sample type libopusenc accepts.
pub trait Encodable: Sized {
	/// Pushes `samples_per_channel` interleaved frames from `pcm` into the
	/// encoder.
	///
	/// # Safety
	///
	/// `encoder` must be a live libopusenc handle, and `pcm` must hold at
	/// least `samples_per_channel * channels` samples.
	unsafe fn write(
		encoder: NonNull<OggOpusEnc>,
		pcm: &[Self],
		samples_per_channel: usize,
	) -> Result<(), OpeErrorCode>;
}

fn frame_count(samples_per_channel: usize) -> Result<c_int, OpeErrorCode> {
	c_int::try_from(samples_per_channel).map_err(|_| OpeErrorCode::BadArg)
}

impl Encodable for i16 {
	unsafe fn write(
		encoder: NonNull<OggOpusEnc>,
		pcm: &[Self],
		samples_per_channel: usize,
	) -> Result<(), OpeErrorCode> {
		let frames = frame_count(samples_per_channel)?;
		map_error!((), unsafe {
			ope_encoder_write(encoder.as_ptr(), pcm.as_ptr(), frames)
		})
	}
}

impl Encodable for f32 {
	unsafe fn write(
		encoder: NonNull<OggOpusEnc>,
		pcm: &[Self],
		samples_per_channel: usize,
	) -> Result<(), OpeErrorCode> {
		let frames = frame_count(samples_per_channel)?;
		map_error!((), unsafe {
			ope_encoder_write_float(encoder.as_ptr(), pcm.as_ptr(), frames)
		})
	}
}
