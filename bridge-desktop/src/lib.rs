//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - [`NativeLibraryLoader`] implements `BackendLoader` by opening the
//!   `lagrangecodec` shared library with `libloading`
//! - [`NativeCodecLibrary`] implements `CodecBackend` over the raw C exports
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::NativeLibraryLoader;
//! use bridge_traits::BackendLoader;
//! use std::path::Path;
//!
//! let backend = NativeLibraryLoader::new()
//!     .load(Path::new("./lib/linux-x64/liblagrangecodec.so"))?;
//! let mut pcm = Vec::new();
//! let status = backend.silk_decode(&silk, &mut |chunk| pcm.extend_from_slice(chunk));
//! ```

mod native;

pub use native::{NativeCodecLibrary, NativeLibraryLoader};
