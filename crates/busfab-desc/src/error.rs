//! Error types for description file operations.

use std::path::PathBuf;

use busfab_core::GenerationError;

/// Errors that can occur while loading or converting descriptions.
#[derive(Debug, thiserror::Error)]
pub enum DescError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading description or core files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Description file not found.
    #[error("description file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The description is well-formed TOML but structurally invalid.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Result type for description operations.
pub type Result<T> = std::result::Result<T, DescError>;
