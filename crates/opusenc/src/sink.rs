// SPDX-License-Identifier: MPL-2.0
use parking_lot::Mutex;
use std::{io, sync::Arc};

/// A destination for encoded Ogg pages.
///
/// Anything implementing [`io::Write`] is a sink: pages are written with
/// `write_all`, and the close signal flushes.
pub trait OggSink: Send {
	fn write(&mut self, data: &[u8]) -> io::Result<()>;

	fn close(&mut self) -> io::Result<()>;
}

impl<W: io::Write + Send> OggSink for W {
	fn write(&mut self, data: &[u8]) -> io::Result<()> {
		self.write_all(data)
	}

	fn close(&mut self) -> io::Result<()> {
		self.flush()
	}
}

/// A sink as stored in the registry. Each sink has its own lock, separate
/// from the registry's.
pub type SharedSink = Arc<Mutex<dyn OggSink>>;

/// Wraps a caller's writer and remembers the first write failure, so the
/// session can report the real I/O error instead of a bare native code.
pub(crate) struct SinkSlot<W> {
	inner: W,
	failure: Option<io::Error>,
}

impl<W> SinkSlot<W> {
	pub(crate) fn new(inner: W) -> Self {
		Self {
			inner,
			failure: None,
		}
	}

	pub(crate) fn take_failure(&mut self) -> Option<io::Error> {
		self.failure.take()
	}

	pub(crate) fn get_ref(&self) -> &W {
		&self.inner
	}

	pub(crate) fn into_inner(self) -> W {
		self.inner
	}
}

impl<W: io::Write + Send> OggSink for SinkSlot<W> {
	fn write(&mut self, data: &[u8]) -> io::Result<()> {
		match self.inner.write_all(data) {
			Ok(()) => Ok(()),
			Err(err) => {
				let reported = io::Error::new(err.kind(), err.to_string());
				if self.failure.is_none() {
					self.failure = Some(err);
				}
				Err(reported)
			}
		}
	}

	fn close(&mut self) -> io::Result<()> {
		self.inner.flush()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Broken;

	impl io::Write for Broken {
		fn write(&mut self, _: &[u8]) -> io::Result<usize> {
			Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn writers_are_sinks() {
		let mut buffer = Vec::new();
		OggSink::write(&mut buffer, b"OggS").unwrap();
		OggSink::close(&mut buffer).unwrap();
		assert_eq!(buffer, b"OggS");
	}

	#[test]
	fn slot_keeps_first_failure() {
		let mut slot = SinkSlot::new(Broken);
		assert!(OggSink::write(&mut slot, b"one").is_err());
		assert!(OggSink::write(&mut slot, b"two").is_err());
		let failure = slot.take_failure().unwrap();
		assert_eq!(failure.kind(), io::ErrorKind::BrokenPipe);
		assert!(slot.take_failure().is_none());
	}
}
