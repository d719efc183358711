//! Core data model for the busfab shared-bus fabric generator.
//!
//! A single bus master reaches N register-mapped slave peripherals through a
//! generated interconnect. This crate holds the immutable value data every
//! generation stage shares:
//!
//! - **Bus parameters:** [`BusWidths`] and the [`GeneratorConfig`] threaded
//!   through every stage
//! - **Descriptors:** [`RegisterDescriptor`] and [`SlaveDescriptor`], the input
//!   boundary of a generation run
//! - **Tokens:** [`Token`] and [`TokenMap`], the output boundary handed to the
//!   template renderer
//! - **Errors:** [`GenerationError`], the structural failures detected before
//!   any output is emitted

pub mod builder;
pub mod config;
pub mod error;
pub mod hash;
pub mod hdl;
pub mod tokens;
pub mod types;

pub use builder::SlaveBuilder;
pub use config::{GeneratorConfig, WriteQualifier};
pub use error::{GenerationError, Result};
pub use hash::ContentHash;
pub use tokens::{RenderUnit, Token, TokenLevel, TokenMap, UnitKind};
pub use types::{BitVector, BusWidths, Direction, RegisterDescriptor, SlaveDescriptor, SlaveId};
