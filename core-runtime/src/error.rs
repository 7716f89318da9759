use thiserror::Error;

/// Configuration and environment setup failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid settings, a malformed environment value, or a logging setup
    /// that could not be installed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No implementation of a required host capability is available.
    #[error("Missing {capability}: {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
