//! The immutable configuration value threaded through every generation stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::BusWidths;

/// How the bus signals write intent to a slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteQualifier {
    /// Every strobe cycle is a write cycle; register capture is gated by
    /// address match alone.
    #[default]
    StrobeOnly,
    /// A dedicated `we` line qualifies writes.
    WriteEnable,
}

impl WriteQualifier {
    /// Whether generated logic carries a `we` signal.
    pub fn has_we_line(&self) -> bool {
        matches!(self, WriteQualifier::WriteEnable)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WriteQualifier::StrobeOnly => "strobe-only",
            WriteQualifier::WriteEnable => "write-enable",
        }
    }
}

impl fmt::Display for WriteQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Fabric name, used for the interconnect entity.
    pub name: String,
    /// Global bus widths.
    pub widths: BusWidths,
    /// Write-intent signalling.
    pub write_qualifier: WriteQualifier,
    /// Generate register files on scoped threads.
    pub parallel: bool,
}

impl GeneratorConfig {
    pub fn new(name: impl Into<String>, widths: BusWidths) -> Self {
        Self {
            name: name.into(),
            widths,
            write_qualifier: WriteQualifier::default(),
            parallel: false,
        }
    }

    pub fn with_write_qualifier(mut self, write_qualifier: WriteQualifier) -> Self {
        self.write_qualifier = write_qualifier;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
