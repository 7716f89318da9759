use thiserror::Error;

/// Failures raised by loaders and host adapters.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Library load error: {0}")]
    LibraryLoad(String),

    #[error("Missing symbol `{symbol}` in {library}")]
    MissingSymbol { symbol: String, library: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
