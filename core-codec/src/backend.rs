//! # Backend Handle
//!
//! Owns the loaded codec backend. A process loads at most one backend, through
//! a [`BackendCell`]; the handle is read-only afterwards and shared through an
//! `Arc` without locking.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use bridge_traits::{BackendLoader, CodecBackend};
use core_runtime::logging::strip_path;
use core_runtime::CodecConfig;
use tracing::{info, warn};

use crate::error::{CodecError, Result};
use crate::platform::{self, BackendArtifact};

/// A loaded backend and where it came from.
pub struct BackendHandle {
    artifact: Option<BackendArtifact>,
    backend: Arc<dyn CodecBackend>,
    closed: AtomicBool,
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("artifact", &self.artifact)
            .field("backend", &self.backend.describe())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl BackendHandle {
    /// Resolves the host platform and loads its artifact.
    ///
    /// An explicit `library_path` in the settings replaces the conventional
    /// location, but the host must still resolve to a supported backend.
    pub fn open(config: &CodecConfig) -> Result<Self> {
        let id = platform::resolve(config.host.as_ref())?;
        let artifact = match &config.settings.library_path {
            Some(path) => BackendArtifact::with_path(id, path)?,
            None => BackendArtifact::locate(id, &config.settings.library_dir)?,
        };
        Self::load(artifact, config.loader.as_ref())
    }

    /// Loads `artifact` through `loader`.
    pub fn load(artifact: BackendArtifact, loader: &dyn BackendLoader) -> Result<Self> {
        let backend = loader.load(&artifact.path).map_err(|e| {
            let file = artifact.path.to_string_lossy();
            warn!(
                backend = %artifact.id,
                file = strip_path(&file),
                "Codec backend load failed: {e}"
            );
            CodecError::from(e)
        })?;

        info!(
            backend = %artifact.id,
            path = %artifact.path.display(),
            "Loaded codec backend"
        );

        Ok(Self {
            artifact: Some(artifact),
            backend,
            closed: AtomicBool::new(false),
        })
    }

    /// Wraps an already-constructed backend.
    pub fn from_backend(backend: Arc<dyn CodecBackend>) -> Self {
        Self {
            artifact: None,
            backend,
            closed: AtomicBool::new(false),
        }
    }

    /// Artifact this backend was loaded from; `None` for injected backends.
    pub fn artifact(&self) -> Option<&BackendArtifact> {
        self.artifact.as_ref()
    }

    /// The backend, unless the handle has been closed.
    pub fn backend(&self) -> Result<&dyn CodecBackend> {
        if self.is_closed() {
            return Err(CodecError::BackendClosed);
        }
        Ok(self.backend.as_ref())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Releases the backend. Only the first call has an effect.
    ///
    /// Returns `true` if this call performed the release.
    pub fn close(&self) -> bool {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.backend.release();
        info!(backend = %self.backend.describe(), "Codec backend closed");
        true
    }
}

/// Single-initialization slot for process-wide backend state.
///
/// The first caller runs the initializer while concurrent callers block; the
/// outcome, success or failure, is stored and returned to every later caller.
/// A failed load is never retried. `T` is the shared value built around the
/// loaded handle, by default the handle itself.
pub struct BackendCell<T = Arc<BackendHandle>> {
    slot: OnceLock<Result<T>>,
}

impl<T: Clone> BackendCell<T> {
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    pub fn get_or_init<F>(&self, init: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.slot.get_or_init(init).clone()
    }

    /// Stored outcome, if initialization has already run.
    pub fn get(&self) -> Option<Result<T>> {
        self.slot.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T: Clone> Default for BackendCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{StatusCode, VideoMetadata, STATUS_OK};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct ReleaseCounter {
        releases: AtomicUsize,
    }

    impl CodecBackend for ReleaseCounter {
        fn audio_to_pcm(&self, _input: &[u8], _sink: &mut dyn FnMut(&[u8])) -> StatusCode {
            STATUS_OK
        }
        fn silk_decode(&self, _input: &[u8], _sink: &mut dyn FnMut(&[u8])) -> StatusCode {
            STATUS_OK
        }
        fn silk_encode(&self, _input: &[u8], _sink: &mut dyn FnMut(&[u8])) -> StatusCode {
            STATUS_OK
        }
        fn video_first_frame(&self, _input: &[u8], _frame: &mut dyn FnMut(&[u8])) -> StatusCode {
            STATUS_OK
        }
        fn video_get_size(&self, _input: &[u8], _info: &mut VideoMetadata) -> StatusCode {
            STATUS_OK
        }
        fn release(&self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_close_is_idempotent() {
        let backend = Arc::new(ReleaseCounter::default());
        let handle = BackendHandle::from_backend(backend.clone());

        assert!(handle.backend().is_ok());
        assert!(handle.close());
        assert!(!handle.close());
        assert!(!handle.close());

        assert_eq!(backend.releases.load(Ordering::SeqCst), 1);
        assert!(handle.is_closed());
        assert!(matches!(handle.backend(), Err(CodecError::BackendClosed)));
    }

    #[test]
    fn test_cell_caches_failure() {
        let cell: BackendCell = BackendCell::new();
        let mut attempts = 0;

        let first = cell.get_or_init(|| {
            attempts += 1;
            Err(CodecError::BackendLoad("missing".into()))
        });
        assert!(first.is_err());

        let second = cell.get_or_init(|| {
            attempts += 1;
            Ok(Arc::new(BackendHandle::from_backend(Arc::new(
                ReleaseCounter::default(),
            ))))
        });
        assert!(matches!(second, Err(CodecError::BackendLoad(_))));
        assert_eq!(attempts, 1);
        assert!(cell.is_initialized());
    }

    #[test]
    fn test_cell_returns_same_handle() {
        let cell: BackendCell = BackendCell::default();
        assert!(cell.get().is_none());

        let a = cell
            .get_or_init(|| {
                let backend = Arc::new(ReleaseCounter::default());
                Ok(Arc::new(BackendHandle::from_backend(backend)))
            })
            .unwrap();
        let b = cell.get_or_init(|| unreachable!()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.artifact().is_none());
    }
}
