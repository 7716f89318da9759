//! Core service façade for codec callers.
//!
//! This crate wires the codec core into the API host applications call:
//! [`CodecService`] exposes `audio_to_pcm`, `silk_decode`, `silk_encode`,
//! `video_first_frame` and `video_get_size`, plus the voice and video helpers
//! built on top of them. Desktop apps typically enable the `desktop-shims`
//! feature (which loads `lagrangecodec` through `bridge-desktop`). The `async`
//! feature adds [`AsyncCodecService`] for tokio callers.
//!
//! ```no_run
//! use core_service::CodecService;
//!
//! # fn main() -> core_service::Result<()> {
//! let codec = CodecService::global()?;
//! let voice = codec.encode_voice(&std::fs::read("voice.mp3").unwrap())?;
//! println!("{} bytes of SILK, {:?}", voice.silk.len(), voice.duration);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod media;
pub mod service;

#[cfg(feature = "async")]
pub mod async_service;

pub use error::{Result, ServiceError};
pub use media::{PcmAudio, VideoPreview, VoiceRecord, PCM_SAMPLE_RATE};
pub use service::CodecService;

#[cfg(feature = "async")]
pub use async_service::AsyncCodecService;

pub use core_codec::{ChunkStream, CodecError, InvocationOutcome, VideoMetadata};
