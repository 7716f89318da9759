//! # Host Bridge Traits
//!
//! Capability contracts between the codec core and the environment it runs in.
//!
//! ## Overview
//!
//! The core never touches raw foreign memory. Everything that depends on the
//! host (which native library is installed, what the OS and CPU are, where
//! log output goes) sits behind a trait defined here and is implemented by a
//! bridge crate (`bridge-desktop` for the native `lagrangecodec` library) or
//! by a test stub.
//!
//! ## Traits
//!
//! ### Codec
//! - [`CodecBackend`](codec::CodecBackend) - The five backend entry points with typed arguments
//! - [`BackendLoader`](codec::BackendLoader) - Turns an artifact path into a live backend
//!
//! ### Platform Integration
//! - [`HostPlatform`](host::HostPlatform) - OS name and CPU architecture of the host
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Wire Types
//!
//! [`VideoMetadata`](codec::VideoMetadata) is `#[repr(C)]` and is read by byte
//! offset across the native boundary (width at 0, height at 4, duration at 8).
//!
//! ## Error Handling
//!
//! Loader and host failures use [`BridgeError`](error::BridgeError). Backend
//! entry points never return errors: they return the native status code and the
//! core decides what it means.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a loaded backend
//! can be shared between caller threads without locking.

pub mod codec;
pub mod error;
pub mod host;
pub mod logging;
pub mod platform;

pub use error::BridgeError;

// Re-export commonly used types
pub use codec::{
    BackendLoader, CodecBackend, CodecOperation, StatusCode, VideoMetadata,
    STATUS_INPUT_TOO_LARGE, STATUS_OK, STATUS_RESERVED_BASE, STATUS_SINK_PANICKED,
};
pub use host::{HostPlatform, StaticHost, SystemHost};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
