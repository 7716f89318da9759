//! Workspace facade crate.
//!
//! Host applications depend on `lagrange-codec` and pick features instead of
//! wiring `core-service` and `core-codec` individually. With the default
//! `desktop-shims` feature the native `lagrangecodec` backend is loaded from
//! `./lib/<platform-dir>/` on first use.

#[cfg(feature = "desktop-shims")]
pub use core_codec::{BackendId, ChunkStream, CodecError, InvocationOutcome, VideoMetadata};

#[cfg(any(feature = "desktop-shims", feature = "async"))]
pub use core_service::{CodecService, PcmAudio, ServiceError, VideoPreview, VoiceRecord};

#[cfg(feature = "async")]
pub use core_service::AsyncCodecService;
