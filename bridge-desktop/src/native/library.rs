#![expect(
    unsafe_code,
    reason = "dlopen, dlsym, and raw FFI function pointer calls"
)]

//! `lagrangecodec` loading and call marshalling.
//!
//! Loads the shared library with `libloading`, resolves the five codec
//! exports up front, and adapts each one to the [`CodecBackend`] trait. The
//! chunk callback is bridged through a trampoline that receives the Rust
//! closure as its `user_data` pointer.

use std::ffi::c_void;
use std::os::raw::c_int;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::ptr::{addr_of_mut, null_mut};
use std::sync::Arc;

use bridge_traits::{
    error::{BridgeError, Result},
    BackendLoader, CodecBackend, CodecOperation, StatusCode, VideoMetadata,
    STATUS_INPUT_TOO_LARGE, STATUS_OK, STATUS_SINK_PANICKED,
};
use tracing::{debug, error, info};

use super::ffi_types::{
    audio_codec_fn_t, video_first_frame_fn_t, video_get_size_fn_t, EntryPoints,
};

/// A loaded `lagrangecodec` library.
pub struct NativeCodecLibrary {
    entry: EntryPoints,
    path: PathBuf,
    // Keeps the code behind `entry` mapped. Declared last so it drops last.
    _library: Option<libloading::Library>,
}

// The library handle and function pointers are safe to send between threads.
// The codec exports keep no per-call global state.
unsafe impl Send for NativeCodecLibrary {}
unsafe impl Sync for NativeCodecLibrary {}

impl std::fmt::Debug for NativeCodecLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeCodecLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl NativeCodecLibrary {
    /// Load the library at `path` and resolve all codec exports.
    pub fn open(path: &Path) -> Result<Self> {
        // Safety: the artifact is the codec library shipped next to the
        // application; its initializers have no preconditions.
        let library = unsafe { libloading::Library::new(path) }
            .map_err(|e| BridgeError::LibraryLoad(format!("dlopen {}: {e}", path.display())))?;

        let entry = EntryPoints {
            audio_to_pcm: resolve::<audio_codec_fn_t>(&library, path, CodecOperation::AudioToPcm)?,
            silk_decode: resolve::<audio_codec_fn_t>(&library, path, CodecOperation::SilkDecode)?,
            silk_encode: resolve::<audio_codec_fn_t>(&library, path, CodecOperation::SilkEncode)?,
            video_first_frame: resolve::<video_first_frame_fn_t>(
                &library,
                path,
                CodecOperation::VideoFirstFrame,
            )?,
            video_get_size: resolve::<video_get_size_fn_t>(
                &library,
                path,
                CodecOperation::VideoGetSize,
            )?,
        };

        info!("Loaded lagrangecodec from {}", path.display());

        Ok(Self {
            entry,
            path: path.to_path_buf(),
            _library: Some(library),
        })
    }

    /// Wrap already-resolved entry points that live in the current image.
    #[cfg(test)]
    pub(crate) fn from_entry_points(entry: EntryPoints) -> Self {
        Self {
            entry,
            path: PathBuf::from("<in-process>"),
            _library: None,
        }
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn call_streaming(
        &self,
        func: audio_codec_fn_t,
        input: &[u8],
        sink: &mut dyn FnMut(&[u8]),
    ) -> StatusCode {
        let Ok(len) = c_int::try_from(input.len()) else {
            return STATUS_INPUT_TOO_LARGE;
        };

        let mut slot = SinkSlot {
            sink,
            panicked: false,
        };
        let user_data = addr_of_mut!(slot).cast::<c_void>();

        // Safety: `input` outlives the call, and `slot` is only dereferenced
        // by the trampoline while the library is inside this call.
        let status = unsafe { func(input.as_ptr(), len, Some(chunk_trampoline), user_data) };

        if slot.panicked && status == STATUS_OK {
            return STATUS_SINK_PANICKED;
        }
        status
    }
}

impl CodecBackend for NativeCodecLibrary {
    fn audio_to_pcm(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        self.call_streaming(self.entry.audio_to_pcm, input, sink)
    }

    fn silk_decode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        self.call_streaming(self.entry.silk_decode, input, sink)
    }

    fn silk_encode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode {
        self.call_streaming(self.entry.silk_encode, input, sink)
    }

    fn video_first_frame(&self, input: &[u8], frame: &mut dyn FnMut(&[u8])) -> StatusCode {
        let Ok(len) = c_int::try_from(input.len()) else {
            return STATUS_INPUT_TOO_LARGE;
        };

        let mut out_frame: *mut u8 = null_mut();
        let mut out_size: c_int = 0;
        let status = unsafe {
            (self.entry.video_first_frame)(
                input.as_ptr(),
                len,
                addr_of_mut!(out_frame),
                addr_of_mut!(out_size),
            )
        };
        if status != STATUS_OK {
            return status;
        }

        if !out_frame.is_null() && out_size > 0 {
            // Safety: on success the library guarantees `out_size` readable
            // bytes at `out_frame`. lagrangecodec exports no matching free,
            // so the buffer stays owned by the library.
            let bytes = unsafe { std::slice::from_raw_parts(out_frame, out_size as usize) };
            frame(bytes);
        } else {
            debug!("video_first_frame succeeded without a frame buffer");
        }
        status
    }

    fn video_get_size(&self, input: &[u8], info: &mut VideoMetadata) -> StatusCode {
        let Ok(len) = c_int::try_from(input.len()) else {
            return STATUS_INPUT_TOO_LARGE;
        };
        unsafe { (self.entry.video_get_size)(input.as_ptr(), len, info as *mut VideoMetadata) }
    }

    fn release(&self) {
        debug!("Releasing lagrangecodec handle for {}", self.path.display());
    }

    fn describe(&self) -> String {
        format!("lagrangecodec ({})", self.path.display())
    }
}

/// Resolve one export and copy the function pointer out of the symbol.
fn resolve<T: Copy>(
    library: &libloading::Library,
    path: &Path,
    operation: CodecOperation,
) -> Result<T> {
    let name = format!("{}\0", operation.symbol());
    let symbol: libloading::Symbol<'_, T> =
        unsafe { library.get(name.as_bytes()) }.map_err(|e| {
            debug!("symbol {} lookup failed: {e}", operation.symbol());
            BridgeError::MissingSymbol {
                symbol: operation.symbol().to_string(),
                library: path.display().to_string(),
            }
        })?;
    Ok(*symbol)
}

/// Per-call state behind the `user_data` pointer of a streaming export.
struct SinkSlot<'a> {
    sink: &'a mut dyn FnMut(&[u8]),
    panicked: bool,
}

/// C callback handed to the streaming exports.
///
/// `user_data` points at the [`SinkSlot`] owned by `call_streaming`. Empty
/// chunks are dropped. A sink panic never unwinds into C; once one is caught,
/// the rest of the call's chunks are ignored.
unsafe extern "C" fn chunk_trampoline(user_data: *mut c_void, data: *const u8, len: c_int) {
    if user_data.is_null() || data.is_null() || len <= 0 {
        return;
    }

    let slot = unsafe { &mut *user_data.cast::<SinkSlot<'_>>() };
    if slot.panicked {
        return;
    }
    let chunk = unsafe { std::slice::from_raw_parts(data, len as usize) };

    if catch_unwind(AssertUnwindSafe(|| (slot.sink)(chunk))).is_err() {
        slot.panicked = true;
        error!("chunk sink panicked; dropping the rest of the stream");
    }
}

/// [`BackendLoader`] that opens `lagrangecodec` from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLibraryLoader;

impl NativeLibraryLoader {
    pub fn new() -> Self {
        Self
    }
}

impl BackendLoader for NativeLibraryLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn CodecBackend>> {
        if !path.is_file() {
            return Err(BridgeError::LibraryLoad(format!(
                "codec library not found at {}",
                path.display()
            )));
        }
        let library = NativeCodecLibrary::open(path)?;
        Ok(Arc::new(library))
    }
}
