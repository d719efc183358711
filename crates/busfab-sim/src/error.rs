//! Errors from the reference model.

use thiserror::Error;

/// Convenience alias for results within the sim crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur while assembling a model.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("fabric has {expected} slaves but {got} slave models were supplied")]
    SlaveCountMismatch { expected: usize, got: usize },

    #[error("slave model {index} is '{got}' but the fabric expects '{expected}'")]
    SlaveOrderMismatch {
        index: usize,
        expected: String,
        got: String,
    },
}
