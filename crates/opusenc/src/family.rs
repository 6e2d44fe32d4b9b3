// SPDX-License-Identifier: MPL-2.0

/// The channel mapping family written to the OpusHead header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ChannelFamily {
	/// Mono or stereo, no mapping table.
	#[default]
	MonoStereo = 0,
	/// Vorbis channel order, for 1 to 8 channels.
	Surround = 1,
	/// Channels are coded independently with no defined layout.
	Independent = 255,
}

impl From<ChannelFamily> for i32 {
	fn from(value: ChannelFamily) -> Self {
		value as i32
	}
}
