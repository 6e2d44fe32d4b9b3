// SPDX-License-Identifier: MPL-2.0
use crate::{
	callbacks::CALLBACKS,
	comments::Comments,
	encode::Encodable,
	error::{EncoderError, OpeErrorCode},
	family::ChannelFamily,
	map_error,
	registry::{registry, WriterId},
	sink::{SharedSink, SinkSlot},
};
use opusink_sys::{
	ope_encoder_create_callbacks, ope_encoder_ctl, ope_encoder_destroy, ope_encoder_drain,
	ope_encoder_flush_header, OggOpusEnc, OPE_OK, OPUS_GET_LOOKAHEAD_REQUEST,
	OPUS_SET_BITRATE_REQUEST, OPUS_SET_COMPLEXITY_REQUEST, OPUS_SET_VBR_REQUEST,
};
use parking_lot::Mutex;
use std::{io, ptr::NonNull, sync::Arc};

/// Stream parameters, fixed for the lifetime of an [`Encoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
	/// Input sampling rate in Hz. libopusenc resamples to 48 kHz internally.
	pub sample_rate: i32,
	pub channels: i32,
	pub family: ChannelFamily,
	/// `(tag, value)` pairs written to the OpusTags header.
	pub comments: Vec<(String, String)>,
}

impl EncoderConfig {
	pub fn new(sample_rate: i32, channels: i32, family: ChannelFamily) -> Self {
		Self {
			sample_rate,
			channels,
			family,
			comments: Vec::new(),
		}
	}

	pub fn with_comment(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
		self.comments.push((tag.into(), value.into()));
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
	Unconfigured,
	Initialized,
	Finished,
}

/// Native resources held between a successful `init` and `finish`. The
/// handle and the registry entry exist together or not at all.
struct Live {
	handle: NonNull<OggOpusEnc>,
	id: WriterId,
	comments: Comments,
	drained: bool,
}

enum Session {
	Unconfigured,
	Initialized(Live),
	Finished,
}

/// An Ogg Opus encoding session writing pages into `W`.
///
/// The session moves through `Unconfigured -> Initialized -> Finished`.
/// Calls on one session must not overlap; separate sessions may run on
/// separate threads. Dropping an initialized session finishes it.
pub struct Encoder<W: io::Write + Send + 'static> {
	config: EncoderConfig,
	sink: Arc<Mutex<SinkSlot<W>>>,
	session: Session,
}

// SAFETY: the native handle is only touched through `&mut self`, and the
// sink it writes to is `Send`.
unsafe impl<W: io::Write + Send + 'static> Send for Encoder<W> {}

impl<W: io::Write + Send + 'static> Encoder<W> {
	pub fn new(config: EncoderConfig, sink: W) -> Self {
		Self {
			config,
			sink: Arc::new(Mutex::new(SinkSlot::new(sink))),
			session: Session::Unconfigured,
		}
	}

	pub fn config(&self) -> &EncoderConfig {
		&self.config
	}

	pub fn state(&self) -> EncoderState {
		match self.session {
			Session::Unconfigured => EncoderState::Unconfigured,
			Session::Initialized(_) => EncoderState::Initialized,
			Session::Finished => EncoderState::Finished,
		}
	}

	/// The registry id of the sink, while the session is initialized.
	pub fn writer_id(&self) -> Option<WriterId> {
		match &self.session {
			Session::Initialized(live) => Some(live.id),
			_ => None,
		}
	}

	/// Creates the native encoder and registers the sink.
	///
	/// On failure nothing stays registered and the session remains
	/// unconfigured.
	pub fn init(&mut self) -> Result<(), EncoderError> {
		match self.session {
			Session::Unconfigured => {}
			Session::Initialized(_) => return Err(EncoderError::AlreadyInitialized),
			Session::Finished => return Err(EncoderError::Finished),
		}

		let mut comments = Comments::new()?;
		for (tag, value) in &self.config.comments {
			comments.add(tag, value)?;
		}

		let id = registry().add(self.sink.clone() as SharedSink);
		let mut error = OPE_OK;
		// SAFETY: the callback table is static, the comment block outlives
		// the call, and `error` is a valid out pointer.
		let handle = unsafe {
			ope_encoder_create_callbacks(
				&CALLBACKS,
				id.as_token(),
				comments.as_ptr(),
				self.config.sample_rate,
				self.config.channels,
				self.config.family.into(),
				&mut error,
			)
		};

		let handle = match NonNull::new(handle) {
			Some(handle) if error == OPE_OK => handle,
			handle => {
				if let Some(handle) = handle {
					// SAFETY: created above and not shared.
					unsafe { ope_encoder_destroy(handle.as_ptr()) };
				}
				registry().remove(id);
				let code = match error {
					OPE_OK => OpeErrorCode::AllocFail,
					error => OpeErrorCode::from_errno(error),
				};
				tracing::debug!(
					sample_rate = self.config.sample_rate,
					channels = self.config.channels,
					family = ?self.config.family,
					error = %code,
					"failed to create opus encoder"
				);
				return Err(EncoderError::Init(code));
			}
		};

		tracing::debug!(
			%id,
			sample_rate = self.config.sample_rate,
			channels = self.config.channels,
			family = ?self.config.family,
			"opus encoder initialized"
		);
		self.session = Session::Initialized(Live {
			handle,
			id,
			comments,
			drained: false,
		});
		Ok(())
	}

	/// Encodes `samples_per_channel` frames of interleaved PCM.
	///
	/// Pages are written to the sink whenever libopusenc has one ready, so a
	/// single call may write nothing or several pages. Once the stream is
	/// drained this fails with [`OpeErrorCode::TooLate`].
	///
	/// # Panics
	///
	/// If `pcm` does not hold exactly `samples_per_channel * channels`
	/// samples.
	pub fn encode<T: Encodable>(
		&mut self,
		pcm: &[T],
		samples_per_channel: usize,
	) -> Result<(), EncoderError> {
		let live = live(&mut self.session)?;
		assert_eq!(
			Some(pcm.len()),
			samples_per_channel.checked_mul(self.config.channels as usize),
			"pcm buffer must hold samples_per_channel * channels samples"
		);
		if live.drained {
			return Err(EncoderError::Encode(OpeErrorCode::TooLate));
		}
		// SAFETY: the handle is live and the buffer length was checked above.
		let result = unsafe { T::write(live.handle, pcm, samples_per_channel) };
		settle(&self.sink, result, EncoderError::Encode)
	}

	/// Flushes buffered audio and ends the Ogg stream. Does nothing before
	/// `init`, after `finish`, or when the stream is already drained.
	pub fn drain(&mut self) -> Result<(), EncoderError> {
		let Session::Initialized(live) = &mut self.session else {
			return Ok(());
		};
		if live.drained {
			return Ok(());
		}
		// SAFETY: the handle is live.
		let result = map_error!((), unsafe { ope_encoder_drain(live.handle.as_ptr()) });
		if result.is_ok() {
			live.drained = true;
			tracing::debug!(id = %live.id, "opus stream drained");
		}
		settle(&self.sink, result, EncoderError::Drain)
	}

	/// Drains the stream, then releases the comment block, the native
	/// encoder and the registry entry.
	///
	/// Teardown happens even if draining fails; the drain error is returned.
	/// Calling `finish` again, or before `init`, does nothing.
	pub fn finish(&mut self) -> Result<(), EncoderError> {
		if !matches!(self.session, Session::Initialized(_)) {
			return Ok(());
		}
		let drained = self.drain();
		let Session::Initialized(live) = std::mem::replace(&mut self.session, Session::Finished)
		else {
			return drained;
		};

		let Live {
			handle,
			id,
			comments,
			..
		} = live;
		drop(comments);
		// SAFETY: the handle is live and never used again. Destroying an
		// undrained stream fires the close callback.
		unsafe { ope_encoder_destroy(handle.as_ptr()) };
		registry().remove(id);
		tracing::debug!(%id, "opus encoder finished");
		drained
	}

	/// Writes the Ogg headers now instead of waiting for the first audio page.
	pub fn flush_header(&mut self) -> Result<(), EncoderError> {
		let live = live(&mut self.session)?;
		if live.drained {
			return Err(EncoderError::FlushHeader(OpeErrorCode::TooLate));
		}
		// SAFETY: the handle is live.
		let result = map_error!((), unsafe { ope_encoder_flush_header(live.handle.as_ptr()) });
		settle(&self.sink, result, EncoderError::FlushHeader)
	}

	/// Sets the target bitrate in bits per second.
	pub fn set_bitrate(&mut self, bitrate: i32) -> Result<(), EncoderError> {
		let live = live(&mut self.session)?;
		map_error!((), unsafe {
			ope_encoder_ctl(
				live.handle.as_ptr(),
				OPUS_SET_BITRATE_REQUEST as _,
				bitrate,
			)
		})
		.map_err(EncoderError::Ctl)
	}

	/// Enables or disables variable bitrate (default: enabled).
	pub fn set_vbr(&mut self, enabled: bool) -> Result<(), EncoderError> {
		let live = live(&mut self.session)?;
		map_error!((), unsafe {
			ope_encoder_ctl(
				live.handle.as_ptr(),
				OPUS_SET_VBR_REQUEST as _,
				enabled as i32,
			)
		})
		.map_err(EncoderError::Ctl)
	}

	/// Sets the encoder's computational complexity, 0-10.
	pub fn set_complexity(&mut self, complexity: i32) -> Result<(), EncoderError> {
		let live = live(&mut self.session)?;
		map_error!((), unsafe {
			ope_encoder_ctl(
				live.handle.as_ptr(),
				OPUS_SET_COMPLEXITY_REQUEST as _,
				complexity,
			)
		})
		.map_err(EncoderError::Ctl)
	}

	/// Returns the encoder's lookahead in samples at 48 kHz.
	pub fn lookahead(&mut self) -> Result<i32, EncoderError> {
		let live = live(&mut self.session)?;
		let mut lookahead = 0;
		map_error!(&lookahead, unsafe {
			ope_encoder_ctl(
				live.handle.as_ptr(),
				OPUS_GET_LOOKAHEAD_REQUEST as _,
				&mut lookahead,
			)
		})
		.map_err(EncoderError::Ctl)
	}

	/// Runs `f` against the sink.
	pub fn with_sink<R>(&self, f: impl FnOnce(&W) -> R) -> R {
		f(self.sink.lock().get_ref())
	}

	/// Finishes the session and hands back the sink.
	pub fn into_inner(mut self) -> Result<W, EncoderError> {
		self.finish()?;
		let sink = self.sink.clone();
		drop(self);
		Arc::try_unwrap(sink)
			.map(|slot| slot.into_inner().into_inner())
			.map_err(|_| EncoderError::SinkInUse)
	}
}

impl<W: io::Write + Send + 'static> Drop for Encoder<W> {
	fn drop(&mut self) {
		if let Err(err) = self.finish() {
			tracing::warn!(error = %err, "failed to finish opus encoder on drop");
		}
	}
}

fn live(session: &mut Session) -> Result<&mut Live, EncoderError> {
	match session {
		Session::Initialized(live) => Ok(live),
		Session::Unconfigured => Err(EncoderError::NotInitialized),
		Session::Finished => Err(EncoderError::Finished),
	}
}

/// Reports a write failure recorded by the sink ahead of the native result,
/// whether or not libopusenc noticed it.
fn settle<W>(
	sink: &Mutex<SinkSlot<W>>,
	result: Result<(), OpeErrorCode>,
	wrap: fn(OpeErrorCode) -> EncoderError,
) -> Result<(), EncoderError> {
	match (sink.lock().take_failure(), result) {
		(Some(err), _) => Err(EncoderError::SinkWrite(err)),
		(None, Err(code)) => Err(wrap(code)),
		(None, Ok(())) => Ok(()),
	}
}
