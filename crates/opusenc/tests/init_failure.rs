// SPDX-License-Identifier: MPL-2.0
// The registry is process-wide, so this file holds a single test to own it.
use opusink::{registry, ChannelFamily, Encoder, EncoderConfig, EncoderError, EncoderState};

#[test]
fn rejected_configuration_leaves_no_registry_entry() {
	assert!(registry().is_empty());

	// Mapping family 0 only covers mono and stereo.
	let mut encoder = Encoder::new(
		EncoderConfig::new(48000, 6, ChannelFamily::MonoStereo),
		Vec::new(),
	);
	let err = encoder.init().unwrap_err();
	assert!(matches!(err, EncoderError::Init(_)), "{err}");
	assert!(err.to_string().starts_with("error initializing opus encoder: "));
	assert_eq!(encoder.state(), EncoderState::Unconfigured);
	assert!(registry().is_empty());

	let mut encoder = Encoder::new(
		EncoderConfig::new(48000, 0, ChannelFamily::MonoStereo),
		Vec::new(),
	);
	assert!(matches!(encoder.init(), Err(EncoderError::Init(_))));
	assert!(registry().is_empty());

	encoder.finish().unwrap();
	assert!(encoder.into_inner().unwrap().is_empty());
}
