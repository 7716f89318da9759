//! Lagrange Codec C API
//!
//! C-compatible entry points with the same shapes as the native
//! `lagrangecodec` exports, backed by the memory-safe codec core. Managed
//! runtimes (JVM, Kotlin/Native, .NET) can bind to this library instead of
//! the raw codec.
//!
//! # Safety
//!
//! All functions in this module are designed to be called from C code. They
//! check pointers for null and report failures as negative status codes.
//! Panics never cross the boundary.
//!
//! # Example Usage (C)
//!
//! ```c
//! static void on_chunk(void* user, const uint8_t* data, int len) {
//!     fwrite(data, 1, len, (FILE*)user);
//! }
//!
//! int main() {
//!     if (lgc_init("./lib") != LGC_OK) {
//!         return 1;
//!     }
//!     int status = lgc_silk_encode(pcm, pcm_len, on_chunk, out_file);
//!     if (status != LGC_OK) {
//!         fprintf(stderr, "%s\n", lgc_status_message(status));
//!     }
//!     return status;
//! }
//! ```

use std::ffi::{c_char, c_int, c_void, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::slice;
use std::sync::OnceLock;

use bridge_traits::{
    VideoMetadata, STATUS_INPUT_TOO_LARGE, STATUS_RESERVED_BASE, STATUS_SINK_PANICKED,
};
use core_codec::error::{
    STATUS_BACKEND_CLOSED, STATUS_BACKEND_LOAD, STATUS_INVALID_INPUT, STATUS_MALFORMED_RESULT,
    STATUS_UNSUPPORTED_PLATFORM,
};
use core_codec::{ChunkStream, CodecError};
use core_runtime::{CodecConfig, CodecSettings};
use core_service::{CodecService, ServiceError};
use tracing::{error, warn};

// ============================================================================
// Status Codes
// ============================================================================

// Failures raised on this side use codes at the bottom of the `int` range.
// Any other non-zero status is the backend's own code, passed through.

/// Success.
pub const LGC_OK: c_int = 0;
/// Empty or inconsistent input, or a required pointer was null.
pub const LGC_ERR_INVALID_INPUT: c_int = STATUS_INVALID_INPUT;
/// No backend build for this OS and architecture.
pub const LGC_ERR_UNSUPPORTED_PLATFORM: c_int = STATUS_UNSUPPORTED_PLATFORM;
/// The codec library could not be loaded.
pub const LGC_ERR_BACKEND_LOAD: c_int = STATUS_BACKEND_LOAD;
/// The backend reported success with an unusable result.
pub const LGC_ERR_MALFORMED_RESULT: c_int = STATUS_MALFORMED_RESULT;
/// The backend was closed.
pub const LGC_ERR_CLOSED: c_int = STATUS_BACKEND_CLOSED;
/// Unexpected internal failure (a caught panic, a bad configuration).
pub const LGC_ERR_INTERNAL: c_int = STATUS_RESERVED_BASE + 7;

/// Chunk callback: `void cb(void* user_data, const uint8_t* data, int len)`.
#[allow(non_camel_case_types)]
pub type lgc_chunk_callback =
    unsafe extern "C" fn(user_data: *mut c_void, data: *const u8, len: c_int);

static SERVICE: OnceLock<CodecService> = OnceLock::new();

/// Installs the service the C entry points use.
///
/// For Rust hosts that construct their own [`CodecService`] (custom loader,
/// injected backend). Returns `false` if a service was already installed.
pub fn install_service(service: CodecService) -> bool {
    SERVICE.set(service).is_ok()
}

fn service() -> Result<&'static CodecService, ServiceError> {
    if let Some(service) = SERVICE.get() {
        return Ok(service);
    }
    let service = CodecService::global()?;
    Ok(SERVICE.get_or_init(|| service))
}

fn status_of(err: &ServiceError) -> c_int {
    match err.as_codec() {
        Some(codec) => codec.status_code(),
        None => LGC_ERR_INTERNAL,
    }
}

/// Runs `call`, converting errors and panics into status codes.
fn guarded<F>(operation: &str, call: F) -> c_int
where
    F: FnOnce() -> Result<(), ServiceError>,
{
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => LGC_OK,
        Ok(Err(err)) => {
            warn!(operation, "C API call failed: {err}");
            status_of(&err)
        }
        Err(_) => {
            error!(operation, "C API call panicked");
            LGC_ERR_INTERNAL
        }
    }
}

/// Borrows the caller's buffer. A null pointer or non-positive length yields
/// an empty slice, which the core rejects as invalid input.
unsafe fn input_slice<'a>(data: *const u8, len: c_int) -> &'a [u8] {
    if data.is_null() || len <= 0 {
        return &[];
    }
    slice::from_raw_parts(data, len as usize)
}

unsafe fn deliver(stream: &ChunkStream, callback: lgc_chunk_callback, user_data: *mut c_void) {
    for chunk in stream {
        // Chunks are bounded by the int-sized input contract of the backend.
        let len = c_int::try_from(chunk.len()).unwrap_or(c_int::MAX);
        callback(user_data, chunk.as_ptr(), len);
    }
}

unsafe fn stream_call<F>(
    operation: &str,
    data: *const u8,
    len: c_int,
    callback: Option<lgc_chunk_callback>,
    user_data: *mut c_void,
    run: F,
) -> c_int
where
    F: FnOnce(&CodecService, &[u8]) -> Result<ChunkStream, ServiceError>,
{
    let Some(callback) = callback else {
        return LGC_ERR_INVALID_INPUT;
    };
    let input = input_slice(data, len);

    guarded(operation, || {
        let stream = run(service()?, input)?;
        deliver(&stream, callback, user_data);
        Ok(())
    })
}

// ============================================================================
// Initialization
// ============================================================================

/// Initializes the codec backend.
///
/// `library_dir` is the directory holding the `<platform-dir>/` folders. Pass
/// null to use `LAGRANGE_CODEC_LIBRARY_DIR` or the default `./lib`. Calling
/// this is optional: the first codec call initializes with defaults. Once a
/// backend is initialized, later calls return its stored status.
///
/// # Safety
///
/// `library_dir` must be null or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn lgc_init(library_dir: *const c_char) -> c_int {
    let library_dir = if library_dir.is_null() {
        None
    } else {
        match CStr::from_ptr(library_dir).to_str() {
            Ok(dir) => Some(dir.to_owned()),
            Err(_) => return LGC_ERR_INVALID_INPUT,
        }
    };

    guarded("lgc_init", move || {
        if SERVICE.get().is_some() {
            return Ok(());
        }
        let mut settings = CodecSettings::from_env()?;
        if let Some(dir) = library_dir {
            settings.library_dir = dir.into();
        }
        let config = CodecConfig::builder().settings(settings).build()?;
        let service = CodecService::init_global(config)?;
        let _ = SERVICE.set(service);
        Ok(())
    })
}

/// Closes the codec backend. Later calls fail with `LGC_ERR_CLOSED`.
#[no_mangle]
pub extern "C" fn lgc_close() -> c_int {
    if let Some(service) = SERVICE.get() {
        service.close();
    }
    LGC_OK
}

// ============================================================================
// Audio
// ============================================================================

/// Decodes audio to 24 kHz mono s16le PCM.
///
/// On success `callback` is called once per output chunk, in order, before
/// this function returns. Nothing is delivered on failure.
///
/// # Safety
///
/// - `data` must point to `len` readable bytes, or be null.
/// - `callback` must be safe to call with `user_data`.
#[no_mangle]
pub unsafe extern "C" fn lgc_audio_to_pcm(
    data: *const u8,
    len: c_int,
    callback: Option<lgc_chunk_callback>,
    user_data: *mut c_void,
) -> c_int {
    stream_call("lgc_audio_to_pcm", data, len, callback, user_data, |s, input| {
        s.audio_to_pcm_chunks(input)
    })
}

/// Decodes SILK to 24 kHz mono s16le PCM.
///
/// # Safety
///
/// Same contract as [`lgc_audio_to_pcm`].
#[no_mangle]
pub unsafe extern "C" fn lgc_silk_decode(
    data: *const u8,
    len: c_int,
    callback: Option<lgc_chunk_callback>,
    user_data: *mut c_void,
) -> c_int {
    stream_call("lgc_silk_decode", data, len, callback, user_data, |s, input| {
        s.silk_decode_chunks(input)
    })
}

/// Encodes 24 kHz mono s16le PCM to SILK.
///
/// # Safety
///
/// Same contract as [`lgc_audio_to_pcm`].
#[no_mangle]
pub unsafe extern "C" fn lgc_silk_encode(
    data: *const u8,
    len: c_int,
    callback: Option<lgc_chunk_callback>,
    user_data: *mut c_void,
) -> c_int {
    stream_call("lgc_silk_encode", data, len, callback, user_data, |s, input| {
        s.silk_encode_chunks(input)
    })
}

// ============================================================================
// Video
// ============================================================================

/// Extracts the first video frame as an encoded image.
///
/// On success `*out_frame` receives a buffer of `*out_size` bytes that the
/// caller must release with [`lgc_free_frame`].
///
/// # Safety
///
/// - `data` must point to `len` readable bytes, or be null.
/// - `out_frame` and `out_size` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn lgc_video_first_frame(
    data: *const u8,
    len: c_int,
    out_frame: *mut *mut u8,
    out_size: *mut c_int,
) -> c_int {
    if out_frame.is_null() || out_size.is_null() {
        return LGC_ERR_INVALID_INPUT;
    }
    *out_frame = ptr::null_mut();
    *out_size = 0;
    let input = input_slice(data, len);

    guarded("lgc_video_first_frame", || {
        let frame = service()?.video_first_frame(input)?;
        let size = c_int::try_from(frame.len()).map_err(|_| {
            CodecError::MalformedResult(format!("frame of {} bytes is too large", frame.len()))
        })?;
        let boxed: Box<[u8]> = frame.to_vec().into_boxed_slice();
        *out_frame = Box::into_raw(boxed).cast::<u8>();
        *out_size = size;
        Ok(())
    })
}

/// Releases a frame returned by [`lgc_video_first_frame`].
///
/// # Safety
///
/// `frame` and `size` must come from one successful `lgc_video_first_frame`
/// call, and each frame may be freed only once. Null is ignored.
#[no_mangle]
pub unsafe extern "C" fn lgc_free_frame(frame: *mut u8, size: c_int) {
    if frame.is_null() || size <= 0 {
        return;
    }
    let raw = ptr::slice_from_raw_parts_mut(frame, size as usize);
    drop(Box::from_raw(raw));
}

/// Reads video width, height and duration (milliseconds) into `info`.
///
/// # Safety
///
/// - `data` must point to `len` readable bytes, or be null.
/// - `info` must be valid for writes of one `VideoMetadata`.
#[no_mangle]
pub unsafe extern "C" fn lgc_video_get_size(
    data: *const u8,
    len: c_int,
    info: *mut VideoMetadata,
) -> c_int {
    if info.is_null() {
        return LGC_ERR_INVALID_INPUT;
    }
    let input = input_slice(data, len);

    guarded("lgc_video_get_size", || {
        let metadata = service()?.video_get_size(input)?;
        info.write(metadata);
        Ok(())
    })
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Human-readable text for a status code. Never null; must not be freed.
#[no_mangle]
pub extern "C" fn lgc_status_message(status: c_int) -> *const c_char {
    let msg: &'static CStr = match status {
        LGC_OK => c"Success",
        LGC_ERR_INVALID_INPUT => c"Invalid input",
        LGC_ERR_UNSUPPORTED_PLATFORM => c"Unsupported platform",
        LGC_ERR_BACKEND_LOAD => c"Codec library could not be loaded",
        LGC_ERR_MALFORMED_RESULT => c"Malformed codec result",
        LGC_ERR_CLOSED => c"Codec backend closed",
        LGC_ERR_INTERNAL => c"Internal error",
        STATUS_INPUT_TOO_LARGE => c"Input too large for the codec library",
        STATUS_SINK_PANICKED => c"Chunk consumer panicked",
        _ => c"Codec backend error",
    };
    msg.as_ptr()
}
