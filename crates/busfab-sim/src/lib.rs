//! Reference model for busfab-generated logic.
//!
//! Evaluates register files and the interconnect one clock edge at a time,
//! following the same predicates the emitted HDL encodes, and checks
//! generated specs for structural defects.

pub mod check;
pub mod error;
pub mod fabric;
pub mod slave;

pub use check::{
    check_fabric, check_output, check_register_file, declared_twice, Diagnostic, Severity,
};
pub use error::{Result, SimError};
pub use fabric::{FabricModel, IrqState, MasterCycle, MasterResponse};
pub use slave::{BusCycle, SlaveModel};
