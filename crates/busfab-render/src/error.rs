//! Errors from the template renderer.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for results within the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while rendering or writing units.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown placeholder '%{name}%' on line {line}")]
    UnknownPlaceholder { name: String, line: usize },

    #[error("unterminated placeholder on line {line}")]
    UnterminatedPlaceholder { line: usize },

    #[error("unit '{unit}' has no fragment for token '{token}'")]
    MissingToken { unit: String, token: String },

    #[error("unknown output format: '{name}'. Available formats: vhdl, json")]
    UnknownFormat { name: String },

    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
