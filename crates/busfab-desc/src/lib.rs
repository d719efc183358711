//! Fabric description files for busfab.
//!
//! A fabric is described in a `fabric.toml` file: the fabric name and write
//! qualification, the bus widths, the output directory, and the slaves with
//! their registers. Additional slaves may live in `cores/*.core.toml` next
//! to the description.

pub mod description;
pub mod error;
pub mod parse;

pub use description::{BusSection, CoreFile, FabricDescription, FabricSection, OutputSection};
pub use error::{DescError, Result};
pub use parse::{
    description_to_toml, discover_cores, generate_template, load_core, load_description,
    load_project, parse_description, validate_description, ValidationIssue,
};
