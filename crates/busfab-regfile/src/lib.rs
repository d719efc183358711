//! Register-file generator for busfab slaves.
//!
//! Compiles a [`SlaveDescriptor`](busfab_core::SlaveDescriptor) into a
//! [`RegisterFileSpec`]: one synchronous register bank with per-register
//! address comparators, write-enable gating, a zero-default read
//! multiplexer, and reset-dominant storage. Each slave is generated
//! independently of every other slave.

pub mod generate;
pub mod tokens;

pub use generate::{
    generate, generate_with_qualifier, AckPolicy, ReadDefault, RegisterFileSpec, RegisterLogic,
    WriteEnable,
};
pub use tokens::register_file_tokens;
