//! Generation error types.

use std::path::PathBuf;

use hdrbind_ast::FrontEndError;
use hdrbind_core::CoreError;

/// Errors that can occur while generating a binding.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// The front-end could not produce a declaration tree.
    #[error("front-end: {0}")]
    FrontEnd(#[from] FrontEndError),

    /// Collection failed or the diagnostics gate refused to proceed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid binding configuration.
    #[error("invalid configuration: {detail}")]
    Config { detail: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The finished artifact could not be moved into place.
    #[error("failed to write {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// Whether this is the diagnostics gate's no-go.
    pub fn is_blocked(&self) -> bool {
        matches!(self, GenError::Core(CoreError::Blocked { .. }))
    }
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenError>;
