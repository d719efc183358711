//! Generation report summarizing a pipeline run.

use std::fmt;

use serde::Serialize;

use busfab_core::types::{BusWidths, SlaveId};
use busfab_core::WriteQualifier;

/// Placement summary of one slave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlaveSummary {
    pub id: SlaveId,
    pub base_address: u64,
    pub priority: u32,
    /// Number of registers.
    pub registers: usize,
    pub interrupt: bool,
}

/// Summary report of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Fabric name.
    pub name: String,
    pub widths: BusWidths,
    pub write_qualifier: WriteQualifier,
    /// Slaves in topology order.
    pub slaves: Vec<SlaveSummary>,
    /// Render unit names, in emission order.
    pub units: Vec<String>,
    pub interrupt_vector_width: u32,
    /// SHA-256 over the topology, register files and fabric.
    pub digest: String,
    /// Total pipeline duration in milliseconds.
    pub duration_ms: u64,
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Generation Report ===")?;
        writeln!(f, "Fabric: {}", self.name)?;
        writeln!(f, "Bus: {}", self.widths)?;
        writeln!(f, "Write qualifier: {}", self.write_qualifier)?;
        writeln!(f, "Duration: {} ms", self.duration_ms)?;

        writeln!(f)?;
        writeln!(f, "--- Slaves ({}) ---", self.slaves.len())?;
        for s in &self.slaves {
            writeln!(
                f,
                "  {:<12} base {:>3}  priority {:>2}  {} registers{}",
                s.id.as_str(),
                s.base_address,
                s.priority,
                s.registers,
                if s.interrupt { "  irq" } else { "" },
            )?;
        }

        writeln!(f)?;
        writeln!(f, "--- Units ({}) ---", self.units.len())?;
        for unit in &self.units {
            writeln!(f, "  {unit}")?;
        }

        writeln!(f)?;
        writeln!(f, "Interrupt vector: {} bits", self.interrupt_vector_width)?;
        writeln!(f, "Digest: {}", self.digest)?;
        Ok(())
    }
}
