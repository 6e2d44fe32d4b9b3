// SPDX-License-Identifier: MPL-2.0
use crate::{
	error::{EncoderError, OpeErrorCode},
	map_error,
};
use opusink_sys::{ope_comments_add, ope_comments_create, ope_comments_destroy, OggOpusComments};
use std::{ffi::CString, ptr::NonNull};

/// An owned OpusTags comment block, built from
/// [`EncoderConfig::comments`](crate::EncoderConfig::comments) during `init`.
pub(crate) struct Comments {
	ptr: NonNull<OggOpusComments>,
}

// SAFETY: the comment block is plain heap data owned by this value.
unsafe impl Send for Comments {}

impl Comments {
	pub(crate) fn new() -> Result<Self, EncoderError> {
		// SAFETY: no preconditions.
		let ptr = unsafe { ope_comments_create() };
		NonNull::new(ptr)
			.map(|ptr| Self { ptr })
			.ok_or(EncoderError::Comment(OpeErrorCode::AllocFail))
	}

	/// Adds a `tag=value` comment. Tags may not contain `=`.
	pub(crate) fn add(&mut self, tag: &str, value: &str) -> Result<(), EncoderError> {
		if tag.contains('=') {
			return Err(EncoderError::InvalidTag(tag.to_owned()));
		}
		let tag = c_string(tag)?;
		let value = c_string(value)?;
		map_error!((), unsafe {
			ope_comments_add(self.ptr.as_ptr(), tag.as_ptr(), value.as_ptr())
		})
		.map_err(EncoderError::Comment)
	}

	pub(crate) fn as_ptr(&self) -> *mut OggOpusComments {
		self.ptr.as_ptr()
	}
}

impl Drop for Comments {
	fn drop(&mut self) {
		// SAFETY: the pointer came from ope_comments_create and is freed once.
		unsafe { ope_comments_destroy(self.ptr.as_ptr()) }
	}
}

fn c_string(text: &str) -> Result<CString, EncoderError> {
	CString::new(text).map_err(|_| EncoderError::InvalidTag(text.to_owned()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_well_formed_comments() {
		let mut comments = Comments::new().unwrap();
		comments.add("ARTIST", "someone").unwrap();
		comments.add("TITLE", "some=thing").unwrap();
	}

	#[test]
	fn rejects_malformed_tags() {
		let mut comments = Comments::new().unwrap();
		assert!(matches!(
			comments.add("A=B", "c"),
			Err(EncoderError::InvalidTag(_))
		));
		assert!(matches!(
			comments.add("TAG", "nul\0byte"),
			Err(EncoderError::InvalidTag(_))
		));
	}
}
