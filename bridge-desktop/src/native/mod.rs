//! Native `lagrangecodec` backend.
//!
//! The codec library is shipped per platform as
//! `<platform-dir>/<prefix>lagrangecodec<suffix>`; choosing the directory is
//! the core's job. This module only opens a given path and adapts the exports.

mod ffi_types;
mod library;

pub use library::{NativeCodecLibrary, NativeLibraryLoader};
