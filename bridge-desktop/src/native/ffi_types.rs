// Parameter names follow the lagrangecodec C headers.
#![allow(non_camel_case_types)]

//! Raw signatures of the `lagrangecodec` exports.
//!
//! All five entry points take the input as `(const uint8_t*, int)` and return
//! an `int` status where zero means success.

use std::os::raw::{c_int, c_void};

use bridge_traits::VideoMetadata;

/// Chunk callback: `void cb(void* user_data, const uint8_t* data, int len)`.
pub(crate) type chunk_callback_t =
    unsafe extern "C" fn(user_data: *mut c_void, data: *const u8, len: c_int);

/// `audio_to_pcm`, `silk_decode` and `silk_encode` share this shape.
pub(crate) type audio_codec_fn_t = unsafe extern "C" fn(
    data: *const u8,
    len: c_int,
    callback: Option<chunk_callback_t>,
    user_data: *mut c_void,
) -> c_int;

/// `video_first_frame`: the library stores a pointer to its own frame buffer
/// in `out_frame` and the byte count in `out_size`.
pub(crate) type video_first_frame_fn_t = unsafe extern "C" fn(
    data: *const u8,
    len: c_int,
    out_frame: *mut *mut u8,
    out_size: *mut c_int,
) -> c_int;

/// `video_get_size`: fills the caller-owned metadata struct.
pub(crate) type video_get_size_fn_t =
    unsafe extern "C" fn(data: *const u8, len: c_int, info: *mut VideoMetadata) -> c_int;

/// Resolved entry points of one loaded library.
#[derive(Clone, Copy)]
pub(crate) struct EntryPoints {
    pub audio_to_pcm: audio_codec_fn_t,
    pub silk_decode: audio_codec_fn_t,
    pub silk_encode: audio_codec_fn_t,
    pub video_first_frame: video_first_frame_fn_t,
    pub video_get_size: video_get_size_fn_t,
}
