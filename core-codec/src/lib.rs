//! # Codec Core Module
//!
//! Resolves, loads, and drives the `lagrangecodec` backend.
//!
//! ## Overview
//!
//! This module handles:
//! - Platform resolution: host OS and CPU to a [`BackendId`] and artifact path
//! - The process-wide [`BackendHandle`] and its single-init [`BackendCell`]
//! - Dispatch: input validation, chunk collection, metadata marshalling
//! - Error normalization into [`InvocationOutcome`]
//!
//! Nothing in this crate touches raw foreign memory. The native boundary lives
//! behind [`bridge_traits::CodecBackend`].

pub mod backend;
pub mod dispatch;
pub mod error;
pub mod platform;
pub mod types;

pub use backend::{BackendCell, BackendHandle};
pub use dispatch::{
    validate, ChunkCollector, DispatchOptions, Dispatcher, Invocation, InvocationState,
};
pub use error::{CodecError, InvocationOutcome, Result};
pub use platform::{artifact_path, resolve, resolve_names, BackendArtifact, BackendId};
pub use types::{ChunkStream, MediaBuffer};

pub use bridge_traits::{CodecOperation, StatusCode, VideoMetadata};
