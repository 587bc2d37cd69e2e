//! Error types for the pack manager.

use thiserror::Error;

/// Errors that can occur while managing synthetic extensions.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("Panel for '{0}' has been disposed")]
    SurfaceDisposed(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for pack operations.
pub type PackResult<T> = Result<T, PackError>;
