//! Structural errors detected at generation time.
//!
//! Every error carries enough context (slave id, offending offset or count)
//! to fix the input description. Generation is pure, so the same invalid
//! input always fails the same way and nothing is retried.

use thiserror::Error;

/// Errors that abort a generation run before any output is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("invalid bus widths: {detail}")]
    InvalidBusWidths { detail: String },

    #[error("slave '{slave}': registers '{first}' and '{second}' share offset {offset}")]
    DuplicateRegisterOffset {
        slave: String,
        offset: u64,
        first: String,
        second: String,
    },

    #[error("slave '{slave}': register '{register}' offset {offset} exceeds register address space (max {max})")]
    RegisterAddressOverflow {
        slave: String,
        register: String,
        offset: u64,
        max: u64,
    },

    #[error("{slaves} slaves do not fit in a core address space of {capacity}")]
    AddressSpaceExhausted { slaves: usize, capacity: u64 },

    #[error("duplicate slave id: '{id}'")]
    DuplicateSlaveId { id: String },

    #[error("slave '{slave}': duplicate register name '{name}'")]
    DuplicateRegisterName { slave: String, name: String },

    #[error("slave '{slave}': register '{register}' is {width} bits wide (allowed 1..={data_width})")]
    RegisterWidthOutOfRange {
        slave: String,
        register: String,
        width: u32,
        data_width: u32,
    },

    #[error("slave '{slave}': register '{register}' reset value {value:#x} does not fit in {width} bits")]
    ResetValueTooWide {
        slave: String,
        register: String,
        value: u64,
        width: u32,
    },

    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error("slave '{slave}': pinned base address {base} is outside the core address space of {capacity}")]
    BaseAddressOutOfRange {
        slave: String,
        base: u64,
        capacity: u64,
    },

    #[error("slaves '{first}' and '{second}' are both pinned to base address {base}")]
    BaseAddressConflict {
        first: String,
        second: String,
        base: u64,
    },

    #[error("unit '{unit}' would declare '{name}' twice")]
    NameCollision { unit: String, name: String },

    #[error("cannot digest generated specs: {detail}")]
    Digest { detail: String },
}

impl GenerationError {
    /// The slave this error is attributed to, if any.
    pub fn slave(&self) -> Option<&str> {
        match self {
            GenerationError::DuplicateRegisterOffset { slave, .. }
            | GenerationError::RegisterAddressOverflow { slave, .. }
            | GenerationError::DuplicateRegisterName { slave, .. }
            | GenerationError::RegisterWidthOutOfRange { slave, .. }
            | GenerationError::ResetValueTooWide { slave, .. }
            | GenerationError::BaseAddressOutOfRange { slave, .. } => Some(slave),
            GenerationError::DuplicateSlaveId { id } => Some(id),
            GenerationError::BaseAddressConflict { second, .. } => Some(second),
            GenerationError::InvalidBusWidths { .. }
            | GenerationError::AddressSpaceExhausted { .. }
            | GenerationError::InvalidIdentifier { .. }
            | GenerationError::NameCollision { .. }
            | GenerationError::Digest { .. } => None,
        }
    }
}

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, GenerationError>;
