//! # Codec Error Types
//!
//! Error taxonomy for codec invocations and its mapping to the normalized
//! [`InvocationOutcome`].

use bridge_traits::{BridgeError, CodecOperation, StatusCode, STATUS_RESERVED_BASE};
use bytes::Bytes;
use thiserror::Error;

// Local statuses sit in the reserved range so they never collide with a code
// the backend returns verbatim.

/// Status reported for local input validation failures.
pub const STATUS_INVALID_INPUT: StatusCode = STATUS_RESERVED_BASE + 2;
/// Status reported when the host has no backend build.
pub const STATUS_UNSUPPORTED_PLATFORM: StatusCode = STATUS_RESERVED_BASE + 3;
/// Status reported when the backend artifact could not be loaded.
pub const STATUS_BACKEND_LOAD: StatusCode = STATUS_RESERVED_BASE + 4;
/// Status reported when the backend returned a result of the wrong shape.
pub const STATUS_MALFORMED_RESULT: StatusCode = STATUS_RESERVED_BASE + 5;
/// Status reported for calls made after the handle was closed.
pub const STATUS_BACKEND_CLOSED: StatusCode = STATUS_RESERVED_BASE + 6;

/// Errors that can occur while resolving, loading, or invoking a backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    // ========================================================================
    // Initialization Errors
    // ========================================================================
    /// No backend build exists for this OS and architecture.
    #[error("Unsupported platform: os '{os}', arch '{arch}'")]
    UnsupportedPlatform { os: String, arch: String },

    /// The backend artifact is missing or incompatible.
    #[error("Failed to load codec backend: {0}")]
    BackendLoad(String),

    // ========================================================================
    // Invocation Errors
    // ========================================================================
    /// The input buffer was rejected before reaching the backend.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backend returned a non-zero status.
    ///
    /// `partial` holds the chunks emitted before the failure when the
    /// `Preserve` policy is configured, and is empty otherwise.
    #[error("Backend error in {operation}: status {code}")]
    Backend {
        operation: CodecOperation,
        code: StatusCode,
        partial: Vec<Bytes>,
    },

    /// The backend reported success but its output had the wrong shape.
    #[error("Malformed backend result: {0}")]
    MalformedResult(String),

    /// The handle was closed before this call.
    #[error("Codec backend is closed")]
    BackendClosed,
}

/// Normalized result of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationOutcome {
    Success,
    BackendError(StatusCode),
    UnsupportedPlatform,
    InvalidInput,
}

impl InvocationOutcome {
    /// Outcome of a finished call.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => InvocationOutcome::Success,
            Err(err) => err.outcome(),
        }
    }
}

impl CodecError {
    /// Maps the error onto the four-valued invocation outcome.
    ///
    /// Load failures count as `UnsupportedPlatform`: in both cases no backend
    /// can serve the host. Malformed results and closed handles surface as
    /// backend errors carrying their reserved status.
    pub fn outcome(&self) -> InvocationOutcome {
        match self {
            CodecError::UnsupportedPlatform { .. } | CodecError::BackendLoad(_) => {
                InvocationOutcome::UnsupportedPlatform
            }
            CodecError::InvalidInput(_) => InvocationOutcome::InvalidInput,
            CodecError::Backend { code, .. } => InvocationOutcome::BackendError(*code),
            CodecError::MalformedResult(_) | CodecError::BackendClosed => {
                InvocationOutcome::BackendError(self.status_code())
            }
        }
    }

    /// Integer status for C callers. Backend codes pass through verbatim.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CodecError::InvalidInput(_) => STATUS_INVALID_INPUT,
            CodecError::UnsupportedPlatform { .. } => STATUS_UNSUPPORTED_PLATFORM,
            CodecError::BackendLoad(_) => STATUS_BACKEND_LOAD,
            CodecError::Backend { code, .. } => *code,
            CodecError::MalformedResult(_) => STATUS_MALFORMED_RESULT,
            CodecError::BackendClosed => STATUS_BACKEND_CLOSED,
        }
    }

    /// Returns `true` for initialization failures that will never clear up
    /// within this process.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CodecError::UnsupportedPlatform { .. } | CodecError::BackendLoad(_)
        )
    }

    /// Returns `true` if the caller can fix the request and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CodecError::InvalidInput(_))
    }

    /// Chunks emitted before a backend failure, if they were preserved.
    pub fn partial_chunks(&self) -> &[Bytes] {
        match self {
            CodecError::Backend { partial, .. } => partial,
            _ => &[],
        }
    }
}

impl From<BridgeError> for CodecError {
    fn from(err: BridgeError) -> Self {
        CodecError::BackendLoad(err.to_string())
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_mapping() {
        let unsupported = CodecError::UnsupportedPlatform {
            os: "solaris".into(),
            arch: "sparc".into(),
        };
        assert_eq!(unsupported.outcome(), InvocationOutcome::UnsupportedPlatform);
        assert_eq!(
            CodecError::BackendLoad("missing".into()).outcome(),
            InvocationOutcome::UnsupportedPlatform
        );
        assert_eq!(
            CodecError::InvalidInput("empty".into()).outcome(),
            InvocationOutcome::InvalidInput
        );
        let backend = CodecError::Backend {
            operation: CodecOperation::SilkDecode,
            code: 42,
            partial: Vec::new(),
        };
        assert_eq!(backend.outcome(), InvocationOutcome::BackendError(42));
        assert_eq!(
            CodecError::BackendClosed.outcome(),
            InvocationOutcome::BackendError(STATUS_BACKEND_CLOSED)
        );
    }

    #[test]
    fn test_outcome_of_result() {
        let ok: Result<()> = Ok(());
        assert_eq!(InvocationOutcome::of(&ok), InvocationOutcome::Success);

        let err: Result<()> = Err(CodecError::InvalidInput("empty".into()));
        assert_eq!(InvocationOutcome::of(&err), InvocationOutcome::InvalidInput);
    }

    #[test]
    fn test_error_classification() {
        assert!(CodecError::BackendLoad("x".into()).is_fatal());
        assert!(!CodecError::BackendLoad("x".into()).is_retryable());
        assert!(CodecError::InvalidInput("x".into()).is_retryable());
        assert!(!CodecError::InvalidInput("x".into()).is_fatal());
        assert!(!CodecError::BackendClosed.is_fatal());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CodecError::InvalidInput("x".into()).status_code(),
            STATUS_INVALID_INPUT
        );
        assert_eq!(
            CodecError::MalformedResult("two frames".into()).status_code(),
            STATUS_MALFORMED_RESULT
        );
        let backend = CodecError::Backend {
            operation: CodecOperation::AudioToPcm,
            code: 7,
            partial: vec![Bytes::from_static(b"pcm")],
        };
        assert_eq!(backend.status_code(), 7);
        assert_eq!(backend.partial_chunks().len(), 1);
    }

    #[test]
    fn test_local_statuses_distinct_from_backend_codes() {
        let local = [
            CodecError::InvalidInput("x".into()),
            CodecError::UnsupportedPlatform {
                os: "plan9".into(),
                arch: "mips".into(),
            },
            CodecError::BackendLoad("x".into()),
            CodecError::MalformedResult("x".into()),
            CodecError::BackendClosed,
        ];
        for native in [-1, -2, -3, -4, -5, -6, 1, 42] {
            let backend = CodecError::Backend {
                operation: CodecOperation::SilkDecode,
                code: native,
                partial: Vec::new(),
            };
            for err in &local {
                assert_ne!(err.status_code(), backend.status_code());
                assert_ne!(err.outcome(), backend.outcome());
            }
        }
        assert!(local.iter().all(|e| e.status_code() < STATUS_RESERVED_BASE + 16));
    }

    #[test]
    fn test_bridge_error_is_load_failure() {
        let err: CodecError = BridgeError::MissingSymbol {
            symbol: "silk_encode".into(),
            library: "liblagrangecodec.so".into(),
        }
        .into();
        assert!(matches!(err, CodecError::BackendLoad(ref msg) if msg.contains("silk_encode")));
    }
}
