// SPDX-License-Identifier: MPL-2.0
use opusink_sys::{
	ope_strerror, OPE_ALLOC_FAIL, OPE_BAD_ARG, OPE_CANNOT_OPEN, OPE_CLOSE_FAIL,
	OPE_INTERNAL_ERROR, OPE_INVALID_ICON, OPE_INVALID_PICTURE, OPE_TOO_LATE, OPE_UNIMPLEMENTED,
	OPE_WRITE_FAIL, OPUS_ALLOC_FAIL, OPUS_BAD_ARG, OPUS_BUFFER_TOO_SMALL, OPUS_INTERNAL_ERROR,
	OPUS_INVALID_PACKET, OPUS_INVALID_STATE, OPUS_UNIMPLEMENTED,
};
use std::{
	ffi::CStr,
	fmt::{Display, Error as FmtError, Formatter},
};

/// An error code reported by libopusenc, or by libopus through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpeErrorCode {
	BadArg,
	InternalError,
	Unimplemented,
	AllocFail,
	CannotOpen,
	TooLate,
	InvalidPicture,
	InvalidIcon,
	WriteFail,
	CloseFail,
	OpusBadArg,
	OpusBufferTooSmall,
	OpusInternalError,
	OpusInvalidPacket,
	OpusUnimplemented,
	OpusInvalidState,
	OpusAllocFail,
	Unknown(i32),
}

impl OpeErrorCode {
	pub fn code(self) -> i32 {
		match self {
			Self::BadArg => OPE_BAD_ARG,
			Self::InternalError => OPE_INTERNAL_ERROR,
			Self::Unimplemented => OPE_UNIMPLEMENTED,
			Self::AllocFail => OPE_ALLOC_FAIL,
			Self::CannotOpen => OPE_CANNOT_OPEN,
			Self::TooLate => OPE_TOO_LATE,
			Self::InvalidPicture => OPE_INVALID_PICTURE,
			Self::InvalidIcon => OPE_INVALID_ICON,
			Self::WriteFail => OPE_WRITE_FAIL,
			Self::CloseFail => OPE_CLOSE_FAIL,
			Self::OpusBadArg => OPUS_BAD_ARG,
			Self::OpusBufferTooSmall => OPUS_BUFFER_TOO_SMALL,
			Self::OpusInternalError => OPUS_INTERNAL_ERROR,
			Self::OpusInvalidPacket => OPUS_INVALID_PACKET,
			Self::OpusUnimplemented => OPUS_UNIMPLEMENTED,
			Self::OpusInvalidState => OPUS_INVALID_STATE,
			Self::OpusAllocFail => OPUS_ALLOC_FAIL,
			Self::Unknown(code) => code,
		}
	}

	/// The diagnostic string libopusenc associates with this code.
	pub fn description(self) -> &'static str {
		// SAFETY: ope_strerror accepts any integer and always returns a
		// pointer to a static, NUL-terminated string.
		unsafe { CStr::from_ptr(ope_strerror(self.code())) }
			.to_str()
			.unwrap_or("unknown error")
	}

	pub(crate) fn from_errno(errno: i32) -> Self {
		match errno {
			OPE_BAD_ARG => Self::BadArg,
			OPE_INTERNAL_ERROR => Self::InternalError,
			OPE_UNIMPLEMENTED => Self::Unimplemented,
			OPE_ALLOC_FAIL => Self::AllocFail,
			OPE_CANNOT_OPEN => Self::CannotOpen,
			OPE_TOO_LATE => Self::TooLate,
			OPE_INVALID_PICTURE => Self::InvalidPicture,
			OPE_INVALID_ICON => Self::InvalidIcon,
			OPE_WRITE_FAIL => Self::WriteFail,
			OPE_CLOSE_FAIL => Self::CloseFail,
			OPUS_BAD_ARG => Self::OpusBadArg,
			OPUS_BUFFER_TOO_SMALL => Self::OpusBufferTooSmall,
			OPUS_INTERNAL_ERROR => Self::OpusInternalError,
			OPUS_INVALID_PACKET => Self::OpusInvalidPacket,
			OPUS_UNIMPLEMENTED => Self::OpusUnimplemented,
			OPUS_INVALID_STATE => Self::OpusInvalidState,
			OPUS_ALLOC_FAIL => Self::OpusAllocFail,
			other => Self::Unknown(other),
		}
	}
}

impl Display for OpeErrorCode {
	fn fmt(&self, f: &mut Formatter) -> Result<(), FmtError> {
		write!(f, "{}", self.description())
	}
}

impl std::error::Error for OpeErrorCode {}

/// Errors surfaced by an [`Encoder`](crate::Encoder) session.
#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
	#[error("error initializing opus encoder: {0}")]
	Init(#[source] OpeErrorCode),
	#[error("ope_encoder_write() error: {0}")]
	Encode(#[source] OpeErrorCode),
	#[error("ope_encoder_drain() error: {0}")]
	Drain(#[source] OpeErrorCode),
	#[error("ope_encoder_flush_header() error: {0}")]
	FlushHeader(#[source] OpeErrorCode),
	#[error("ope_encoder_ctl() error: {0}")]
	Ctl(#[source] OpeErrorCode),
	#[error("unable to add comment: {0}")]
	Comment(#[source] OpeErrorCode),
	#[error("failed writing to sink: {0}")]
	SinkWrite(#[source] std::io::Error),
	#[error("invalid comment tag {0:?}")]
	InvalidTag(String),
	#[error("encoder is already initialized")]
	AlreadyInitialized,
	#[error("encoder is not initialized")]
	NotInitialized,
	#[error("encoder is already finished")]
	Finished,
	#[error("sink is still referenced by the writer registry")]
	SinkInUse,
}

/// Turns a native return value into a `Result`: negative values are error
/// codes, everything else is success.
#[macro_export]
macro_rules! map_error {
	($x:expr) => {{
		let result: i32 = $x;
		match result {
			..0 => Err($crate::error::OpeErrorCode::from_errno(result)),
			0.. => Ok(result),
		}
	}};
	(&$var:ident, $x:expr) => {{
		map_error!($x).map(|_| $var)
	}};
	((), $x:expr) => {{
		map_error!($x).map(|_| ())
	}};
	($return_type:ty, $x:expr) => {
		map_error!($x).map(|value| value as $return_type)
	};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_codes_map_both_ways() {
		for code in [
			OPE_BAD_ARG,
			OPE_INTERNAL_ERROR,
			OPE_UNIMPLEMENTED,
			OPE_ALLOC_FAIL,
			OPE_CANNOT_OPEN,
			OPE_TOO_LATE,
			OPE_INVALID_PICTURE,
			OPE_INVALID_ICON,
			OPE_WRITE_FAIL,
			OPE_CLOSE_FAIL,
			OPUS_BAD_ARG,
			OPUS_ALLOC_FAIL,
		] {
			let mapped = OpeErrorCode::from_errno(code);
			assert!(!matches!(mapped, OpeErrorCode::Unknown(_)), "{code}");
			assert_eq!(mapped.code(), code);
		}
	}

	#[test]
	fn unknown_codes_are_preserved() {
		assert_eq!(OpeErrorCode::from_errno(-99), OpeErrorCode::Unknown(-99));
		assert_eq!(OpeErrorCode::Unknown(-99).code(), -99);
	}

	#[test]
	fn map_error_splits_on_sign() {
		assert_eq!(map_error!(3), Ok(3));
		assert_eq!(map_error!((), 0), Ok(()));
		assert_eq!(map_error!((), OPE_TOO_LATE), Err(OpeErrorCode::TooLate));
		let value = 7;
		assert_eq!(map_error!(&value, 0), Ok(7));
	}

	#[test]
	fn descriptions_come_from_libopusenc() {
		assert!(!OpeErrorCode::BadArg.description().is_empty());
		assert_eq!(
			EncoderError::Init(OpeErrorCode::BadArg).to_string(),
			format!(
				"error initializing opus encoder: {}",
				OpeErrorCode::BadArg.description()
			)
		);
	}

	#[test]
	fn header_flush_errors_name_their_call() {
		let message = EncoderError::FlushHeader(OpeErrorCode::TooLate).to_string();
		assert!(message.starts_with("ope_encoder_flush_header() error: "), "{message}");
	}
}
