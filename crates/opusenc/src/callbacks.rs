// SPDX-License-Identifier: MPL-2.0
use crate::registry::{registry, WriterId};
use opusink_sys::{opus_int32, OpusEncCallbacks};
use std::{
	ffi::{c_int, c_uchar, c_void},
	panic::{catch_unwind, AssertUnwindSafe},
};

/// The callback table handed to `ope_encoder_create_callbacks`. libopusenc
/// copies it at creation.
pub(crate) static CALLBACKS: OpusEncCallbacks = OpusEncCallbacks {
	write: Some(write_trampoline),
	close: Some(close_trampoline),
};

const WRITE_OK: c_int = 0;
const WRITE_FAILED: c_int = 1;

unsafe extern "C" fn write_trampoline(
	user_data: *mut c_void,
	ptr: *const c_uchar,
	len: opus_int32,
) -> c_int {
	let id = WriterId::from_token(user_data);
	let Some(sink) = registry().get(id) else {
		// Callback after deregistration, or with a fabricated token.
		tracing::error!(%id, "libopusenc wrote to an unknown writer");
		std::process::abort();
	};

	let data = match usize::try_from(len) {
		Ok(0) => return WRITE_OK,
		// SAFETY: libopusenc passes a page buffer valid for `len` bytes for
		// the duration of the call.
		Ok(len) if !ptr.is_null() => unsafe { std::slice::from_raw_parts(ptr, len) },
		_ => {
			tracing::error!(%id, len, "libopusenc passed an invalid page buffer");
			return WRITE_FAILED;
		}
	};

	match catch_unwind(AssertUnwindSafe(|| sink.lock().write(data))) {
		Ok(Ok(())) => WRITE_OK,
		Ok(Err(err)) => {
			tracing::warn!(%id, error = %err, "writer rejected ogg page");
			WRITE_FAILED
		}
		Err(_) => {
			tracing::error!(%id, "writer panicked while writing ogg page");
			WRITE_FAILED
		}
	}
}

unsafe extern "C" fn close_trampoline(user_data: *mut c_void) -> c_int {
	let id = WriterId::from_token(user_data);
	let Some(sink) = registry().remove(id) else {
		return 0;
	};
	match catch_unwind(AssertUnwindSafe(|| sink.lock().close())) {
		Ok(Ok(())) => tracing::debug!(%id, "closed writer"),
		Ok(Err(err)) => tracing::warn!(%id, error = %err, "failed to close writer"),
		Err(_) => tracing::error!(%id, "writer panicked while closing"),
	}
	0
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sink::SharedSink;
	use parking_lot::Mutex;
	use std::{io, sync::Arc};

	struct Rejecting;

	impl io::Write for Rejecting {
		fn write(&mut self, _: &[u8]) -> io::Result<usize> {
			Err(io::Error::other("disk full"))
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn write_reaches_the_registered_sink() {
		let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
		let id = registry().add(buffer.clone() as SharedSink);
		let page = b"OggS\0";
		let status = unsafe { write_trampoline(id.as_token(), page.as_ptr(), page.len() as _) };
		assert_eq!(status, WRITE_OK);
		assert_eq!(buffer.lock().as_slice(), page);
		registry().remove(id);
	}

	#[test]
	fn write_failure_is_reported_as_status() {
		let id = registry().add(Arc::new(Mutex::new(Rejecting)));
		let status = unsafe { write_trampoline(id.as_token(), b"x".as_ptr(), 1) };
		assert_eq!(status, WRITE_FAILED);
		registry().remove(id);
	}

	const UNKNOWN_WRITER_CHILD: &str = "OPUSINK_UNKNOWN_WRITER_CHILD";

	#[test]
	fn write_to_unknown_writer_aborts() {
		if std::env::var_os(UNKNOWN_WRITER_CHILD).is_some() {
			// Ids count up from zero, so the largest one is never handed out.
			unsafe { write_trampoline(usize::MAX as *mut c_void, b"OggS".as_ptr(), 4) };
			return;
		}

		let output = std::process::Command::new(std::env::current_exe().unwrap())
			.args([
				"--exact",
				"callbacks::tests::write_to_unknown_writer_aborts",
				"--nocapture",
			])
			.env(UNKNOWN_WRITER_CHILD, "1")
			.output()
			.unwrap();
		assert!(
			!output.status.success(),
			"child survived: {}",
			String::from_utf8_lossy(&output.stdout)
		);
		#[cfg(unix)]
		{
			use std::os::unix::process::ExitStatusExt;
			const SIGABRT: i32 = 6;
			assert_eq!(output.status.signal(), Some(SIGABRT));
		}
	}

	#[test]
	fn close_deregisters_and_is_idempotent() {
		let id = registry().add(Arc::new(Mutex::new(Vec::<u8>::new())));
		assert_eq!(unsafe { close_trampoline(id.as_token()) }, 0);
		assert!(!registry().contains(id));
		assert_eq!(unsafe { close_trampoline(id.as_token()) }, 0);
	}
}
