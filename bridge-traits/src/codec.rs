//! Codec backend contract.
//!
//! A [`CodecBackend`] is whatever actually transcodes media: the native
//! `lagrangecodec` shared library on desktop, or a stub in tests. Its methods
//! mirror the native entry points one-to-one but replace raw pointers with
//! slices and the C callback with a Rust closure, so callers above this layer
//! never handle foreign memory.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// Native status code. Zero is success; anything else is an opaque failure.
pub type StatusCode = i32;

/// Status code the backend returns on success.
pub const STATUS_OK: StatusCode = 0;

/// Lowest status code. Codes from here up to `STATUS_RESERVED_BASE + 15` are
/// produced on the Rust side and never by the native library, which reports
/// small integers.
pub const STATUS_RESERVED_BASE: StatusCode = StatusCode::MIN;

/// The input does not fit the native `int` length parameter.
pub const STATUS_INPUT_TOO_LARGE: StatusCode = STATUS_RESERVED_BASE;

/// A chunk sink panicked during a streaming call; later chunks were dropped.
pub const STATUS_SINK_PANICKED: StatusCode = STATUS_RESERVED_BASE + 1;

/// Fixed-layout video metadata record.
///
/// The backend writes this struct directly through a pointer, so the layout is
/// part of the ABI: `width` at offset 0, `height` at offset 4, `duration` at
/// offset 8, 16 bytes total with no padding between fields.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Stream duration in milliseconds
    pub duration: u64,
}

const _: () = {
    assert!(std::mem::size_of::<VideoMetadata>() == 16);
    assert!(std::mem::align_of::<VideoMetadata>() == 8);
    assert!(std::mem::offset_of!(VideoMetadata, width) == 0);
    assert!(std::mem::offset_of!(VideoMetadata, height) == 4);
    assert!(std::mem::offset_of!(VideoMetadata, duration) == 8);
};

impl VideoMetadata {
    pub fn new(width: u32, height: u32, duration_ms: u64) -> Self {
        Self {
            width,
            height,
            duration: duration_ms,
        }
    }

    /// Duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration)
    }

    /// Returns `true` when the backend reported no frame dimensions.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The backend entry points, by native symbol name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecOperation {
    AudioToPcm,
    SilkDecode,
    SilkEncode,
    VideoFirstFrame,
    VideoGetSize,
}

impl CodecOperation {
    pub const ALL: [CodecOperation; 5] = [
        CodecOperation::AudioToPcm,
        CodecOperation::SilkDecode,
        CodecOperation::SilkEncode,
        CodecOperation::VideoFirstFrame,
        CodecOperation::VideoGetSize,
    ];

    /// Exported symbol name in the native library.
    pub fn symbol(&self) -> &'static str {
        match self {
            CodecOperation::AudioToPcm => "audio_to_pcm",
            CodecOperation::SilkDecode => "silk_decode",
            CodecOperation::SilkEncode => "silk_encode",
            CodecOperation::VideoFirstFrame => "video_first_frame",
            CodecOperation::VideoGetSize => "video_get_size",
        }
    }

    /// Returns `true` for operations that deliver output through the chunk callback.
    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            CodecOperation::AudioToPcm | CodecOperation::SilkDecode | CodecOperation::SilkEncode
        )
    }
}

impl fmt::Display for CodecOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Codec backend capability.
///
/// Every method runs synchronously on the calling thread. Chunk-producing
/// methods call `sink` zero or more times, in output order, before they
/// return. The slice handed to `sink` is only valid for the duration of that
/// call; implementors may reuse or free it as soon as `sink` returns.
///
/// Implementations must not panic across this boundary; failures are
/// reported as a non-zero [`StatusCode`].
pub trait CodecBackend: PlatformSendSync {
    /// Decode any supported audio container into PCM chunks.
    fn audio_to_pcm(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode;

    /// Decode a SILK stream into PCM chunks.
    fn silk_decode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode;

    /// Encode PCM into SILK chunks.
    fn silk_encode(&self, input: &[u8], sink: &mut dyn FnMut(&[u8])) -> StatusCode;

    /// Extract the first video frame as an encoded image.
    ///
    /// A successful call hands exactly one frame to `frame`.
    fn video_first_frame(&self, input: &[u8], frame: &mut dyn FnMut(&[u8])) -> StatusCode;

    /// Probe video dimensions and duration into `info`.
    fn video_get_size(&self, input: &[u8], info: &mut VideoMetadata) -> StatusCode;

    /// Release backend resources. Called at most once per loaded backend.
    fn release(&self) {}

    /// Short human-readable description used in logs.
    fn describe(&self) -> String {
        "codec backend".to_string()
    }
}

/// Loads a codec backend from an artifact on disk.
pub trait BackendLoader: PlatformSendSync {
    fn load(&self, path: &Path) -> Result<Arc<dyn CodecBackend>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_metadata_duration() {
        let info = VideoMetadata::new(1920, 1080, 5000);
        assert_eq!(info.duration(), Duration::from_secs(5));
        assert!(!info.is_empty());
        assert!(VideoMetadata::default().is_empty());
    }

    #[test]
    fn test_video_metadata_reads_by_offset() {
        let info = VideoMetadata::new(1920, 1080, 5000);
        let base = std::ptr::addr_of!(info) as *const u8;

        // SAFETY: offsets are asserted at compile time and lie inside the struct.
        let (width, height, duration) = unsafe {
            (
                std::ptr::read_unaligned(base as *const u32),
                std::ptr::read_unaligned(base.add(4) as *const u32),
                std::ptr::read_unaligned(base.add(8) as *const u64),
            )
        };

        assert_eq!((width, height, duration), (1920, 1080, 5000));
    }

    #[test]
    fn test_operation_symbols() {
        let symbols: Vec<_> = CodecOperation::ALL.iter().map(|op| op.symbol()).collect();
        assert_eq!(
            symbols,
            vec![
                "audio_to_pcm",
                "silk_decode",
                "silk_encode",
                "video_first_frame",
                "video_get_size"
            ]
        );
        assert!(CodecOperation::SilkEncode.is_streaming());
        assert!(!CodecOperation::VideoFirstFrame.is_streaming());
    }

    #[test]
    fn test_operation_serde() {
        let json = serde_json::to_string(&CodecOperation::AudioToPcm).unwrap();
        assert_eq!(json, "\"audio_to_pcm\"");
    }
}
