//! Fabric generation for busfab.
//!
//! Plans the slave address map, generates the interconnect between the
//! single bus master and its slaves, and drives the whole run through a
//! single-pass pipeline:
//! plan -> per-slave register files -> fabric -> token maps -> report.

pub mod generate;
pub mod pipeline;
pub mod plan;
pub mod report;
pub mod tokens;

pub use generate::{generate, generate_for, FabricSpec, InterruptDecoder, SlavePort};
pub use pipeline::{run, GenerationOutput};
pub use plan::{plan, FabricTopology, PlacedSlave};
pub use report::{GenerationReport, SlaveSummary};
pub use tokens::fabric_tokens;
