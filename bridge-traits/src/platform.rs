//! Thread-safety bound shared by every bridge trait.
//!
//! A loaded backend and the host adapters are shared across caller threads
//! behind an `Arc`, so each contract requires `Send + Sync`.

/// Blanket `Send + Sync` marker for bridge trait objects.
pub trait PlatformSendSync: Send + Sync {}

impl<T> PlatformSendSync for T where T: Send + Sync + ?Sized {}
