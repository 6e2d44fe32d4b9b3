// SPDX-License-Identifier: MPL-2.0

mod encodable;
mod encoder;

pub use self::{
	encodable::Encodable,
	encoder::{Encoder, EncoderConfig, EncoderState},
};
