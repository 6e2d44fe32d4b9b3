use std::io::{self, Read};

/// Reads interleaved little-endian 16-bit PCM in fixed-size chunks.
pub struct PcmReader<R> {
	reader: R,
	channels: usize,
	bytes: Vec<u8>,
	samples: Vec<i16>,
}

impl<R: Read> PcmReader<R> {
	pub fn new(reader: R, channels: usize, samples_per_channel: usize) -> Self {
		Self {
			reader,
			channels,
			bytes: vec![0; samples_per_channel * channels * 2],
			samples: Vec::with_capacity(samples_per_channel * channels),
		}
	}

	/// Returns the next chunk of samples, or `None` at end of input.
	///
	/// Only the last chunk may be short. It always holds whole sample
	/// frames; a trailing partial frame is dropped.
	pub fn next_chunk(&mut self) -> io::Result<Option<&[i16]>> {
		let filled = fill(&mut self.reader, &mut self.bytes)?;
		let frame_bytes = self.channels * 2;
		let usable = filled - filled % frame_bytes;
		if usable != filled {
			tracing::warn!(
				dropped_bytes = filled - usable,
				"input ends with a partial sample frame"
			);
		}
		if usable == 0 {
			return Ok(None);
		}

		self.samples.clear();
		self.samples.extend(
			self.bytes[..usable]
				.chunks_exact(2)
				.map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
		);
		Ok(Some(&self.samples))
	}
}

/// Reads until `buf` is full or the input ends, returning the byte count.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
	let mut filled = 0;
	while filled < buf.len() {
		match reader.read(&mut buf[filled..]) {
			Ok(0) => break,
			Ok(n) => filled += n,
			Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
			Err(err) => return Err(err),
		}
	}
	Ok(filled)
}
