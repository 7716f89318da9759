//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the codec core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the codec crates depend on. It
//! decides where the native library is looked up, how backend failures are
//! reported, and how `tracing` output reaches the host.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CodecConfig, CodecConfigBuilder, CodecSettings, PartialResultPolicy};
pub use error::{Error, Result};
