/* Hand-maintained subset of the libopusenc and libopus declarations used by
 * opusink. The `generate-bindings` feature overwrites this file with the full
 * bindgen output for the `ope_*`, `OPE_*` and `OPUS_*` items in bindings.h. */

pub type opus_int16 = i16;
pub type opus_int32 = i32;
pub type opus_uint32 = u32;

pub const OPUS_OK: i32 = 0;
pub const OPUS_BAD_ARG: i32 = -1;
pub const OPUS_BUFFER_TOO_SMALL: i32 = -2;
pub const OPUS_INTERNAL_ERROR: i32 = -3;
pub const OPUS_INVALID_PACKET: i32 = -4;
pub const OPUS_UNIMPLEMENTED: i32 = -5;
pub const OPUS_INVALID_STATE: i32 = -6;
pub const OPUS_ALLOC_FAIL: i32 = -7;
pub const OPUS_SET_BITRATE_REQUEST: u32 = 4002;
pub const OPUS_SET_VBR_REQUEST: u32 = 4006;
pub const OPUS_SET_COMPLEXITY_REQUEST: u32 = 4010;
pub const OPUS_GET_LOOKAHEAD_REQUEST: u32 = 4027;
pub const OPUS_AUTO: i32 = -1000;
pub const OPUS_BITRATE_MAX: i32 = -1;

pub const OPE_API_VERSION: u32 = 0;
pub const OPE_OK: i32 = 0;
pub const OPE_BAD_ARG: i32 = -11;
pub const OPE_INTERNAL_ERROR: i32 = -13;
pub const OPE_UNIMPLEMENTED: i32 = -15;
pub const OPE_ALLOC_FAIL: i32 = -17;
pub const OPE_CANNOT_OPEN: i32 = -30;
pub const OPE_TOO_LATE: i32 = -31;
pub const OPE_INVALID_PICTURE: i32 = -32;
pub const OPE_INVALID_ICON: i32 = -33;
pub const OPE_WRITE_FAIL: i32 = -34;
pub const OPE_CLOSE_FAIL: i32 = -35;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OggOpusComments {
	_unused: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OggOpusEnc {
	_unused: [u8; 0],
}

/// Called for writing a page.
///
/// # Arguments
///
/// * `user_data` - user-defined data passed to the callback
/// * `ptr` - buffer to be written
/// * `len` - number of bytes to be written
///
/// # Returns
///
/// error code: 0 for success, 1 for failure
pub type ope_write_func = ::std::option::Option<
	unsafe extern "C" fn(
		user_data: *mut ::std::os::raw::c_void,
		ptr: *const ::std::os::raw::c_uchar,
		len: opus_int32,
	) -> ::std::os::raw::c_int,
>;

/// Called for closing a stream.
///
/// # Arguments
///
/// * `user_data` - user-defined data passed to the callback
///
/// # Returns
///
/// error code: 0 for success, 1 for failure
pub type ope_close_func = ::std::option::Option<
	unsafe extern "C" fn(user_data: *mut ::std::os::raw::c_void) -> ::std::os::raw::c_int,
>;

/// Callback functions for accessing the stream.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OpusEncCallbacks {
	/// Callback for writing to the stream.
	pub write: ope_write_func,
	/// Callback for closing the stream.
	pub close: ope_close_func,
}

extern "C" {
	/// Create a new comments object.
	///
	/// # Returns
	///
	/// Newly-created comments object.
	pub fn ope_comments_create() -> *mut OggOpusComments;

	/// Create a deep copy of a comments object.
	pub fn ope_comments_copy(comments: *mut OggOpusComments) -> *mut OggOpusComments;

	/// Destroys a comments object.
	pub fn ope_comments_destroy(comments: *mut OggOpusComments);

	/// Add a comment.
	///
	/// # Returns
	///
	/// Error code
	pub fn ope_comments_add(
		comments: *mut OggOpusComments,
		tag: *const ::std::os::raw::c_char,
		val: *const ::std::os::raw::c_char,
	) -> ::std::os::raw::c_int;

	/// Add a comment as a single tag=value string.
	///
	/// # Returns
	///
	/// Error code
	pub fn ope_comments_add_string(
		comments: *mut OggOpusComments,
		tag_and_val: *const ::std::os::raw::c_char,
	) -> ::std::os::raw::c_int;

	/// Create a new OggOpus stream, calling the user-provided callbacks.
	///
	/// # Arguments
	///
	/// * `callbacks` - callback functions
	/// * `user_data` - user-defined data passed to the callbacks
	/// * `comments` - comments object
	/// * `rate` - input sampling rate (48 kHz is faster)
	/// * `channels` - number of channels
	/// * `family` - mapping family (0 for mono/stereo, 1 for surround)
	/// * `error` - error code (NULL if no error is to be returned)
	///
	/// # Returns
	///
	/// Newly-created encoder.
	pub fn ope_encoder_create_callbacks(
		callbacks: *const OpusEncCallbacks,
		user_data: *mut ::std::os::raw::c_void,
		comments: *mut OggOpusComments,
		rate: opus_int32,
		channels: ::std::os::raw::c_int,
		family: ::std::os::raw::c_int,
		error: *mut ::std::os::raw::c_int,
	) -> *mut OggOpusEnc;

	/// Add/encode any number of float samples to the stream.
	///
	/// # Returns
	///
	/// Error code
	pub fn ope_encoder_write_float(
		enc: *mut OggOpusEnc,
		pcm: *const f32,
		samples_per_channel: ::std::os::raw::c_int,
	) -> ::std::os::raw::c_int;

	/// Add/encode any number of 16-bit linear samples to the stream.
	///
	/// # Returns
	///
	/// Error code
	pub fn ope_encoder_write(
		enc: *mut OggOpusEnc,
		pcm: *const opus_int16,
		samples_per_channel: ::std::os::raw::c_int,
	) -> ::std::os::raw::c_int;

	/// Finalizes the stream, but does not deallocate the object.
	///
	/// # Returns
	///
	/// Error code
	pub fn ope_encoder_drain(enc: *mut OggOpusEnc) -> ::std::os::raw::c_int;

	/// Deallocates the object. Make sure to ope_drain() first.
	pub fn ope_encoder_destroy(enc: *mut OggOpusEnc);

	/// Write out the header now rather than wait for audio to begin.
	///
	/// # Returns
	///
	/// Error code
	pub fn ope_encoder_flush_header(enc: *mut OggOpusEnc) -> ::std::os::raw::c_int;

	/// Sets encoder options.
	///
	/// # Returns
	///
	/// Error code
	pub fn ope_encoder_ctl(
		enc: *mut OggOpusEnc,
		request: ::std::os::raw::c_int,
		...
	) -> ::std::os::raw::c_int;

	/// Converts a libopusenc error code into a human readable string.
	pub fn ope_strerror(error: ::std::os::raw::c_int) -> *const ::std::os::raw::c_char;

	/// Returns a string representing the version of libopusenc being used at
	/// run time.
	pub fn ope_get_version_string() -> *const ::std::os::raw::c_char;

	/// ABI version for this header. Can be used to check for features at
	/// run time.
	pub fn ope_get_abi_version() -> ::std::os::raw::c_int;
}
