//! Front-end error types.

/// Errors raised while obtaining a declaration tree.
#[derive(Debug, thiserror::Error)]
pub enum FrontEndError {
    /// The native front-end could not produce a translation unit.
    #[error("front-end failure: {detail}")]
    Parse { detail: String },

    /// A serialized tree could not be decoded.
    #[error("invalid tree dump: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for front-end operations.
pub type Result<T> = std::result::Result<T, FrontEndError>;
