//! Generation pipeline orchestrator.

use std::panic;
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use busfab_core::error::{GenerationError, Result};
use busfab_core::hdl::first_duplicate;
use busfab_core::types::{validate_identifier, BusWidths, SlaveDescriptor};
use busfab_core::{ContentHash, GeneratorConfig, RenderUnit, UnitKind, WriteQualifier};
use busfab_regfile::{generate_with_qualifier, register_file_tokens, RegisterFileSpec};

use crate::generate::{generate_for, FabricSpec};
use crate::plan::{plan, FabricTopology};
use crate::report::{GenerationReport, SlaveSummary};
use crate::tokens::fabric_tokens;

/// Output of a successful generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub topology: FabricTopology,
    /// One register file per slave, in topology order.
    pub register_files: Vec<RegisterFileSpec>,
    pub fabric: FabricSpec,
    /// Register-file units in topology order, then the fabric unit.
    pub units: Vec<RenderUnit>,
    pub report: GenerationReport,
}

impl GenerationOutput {
    /// Find a render unit by name.
    pub fn unit(&self, name: &str) -> Option<&RenderUnit> {
        self.units.iter().find(|u| u.name.eq_ignore_ascii_case(name))
    }
}

/// Run the full generation pipeline:
/// name check -> plan -> register files -> fabric -> token maps -> report.
///
/// Nothing is returned on error. When several slaves are invalid, the one
/// earliest in topology order is reported, also when `parallel` is set.
pub fn run(slaves: &[SlaveDescriptor], config: &GeneratorConfig) -> Result<GenerationOutput> {
    let start = Instant::now();

    // Stage 1: Fabric name and topology
    validate_identifier(&config.name)?;
    let topology = plan(slaves, &config.widths)?;

    // Stage 2: Register files
    let register_files = if config.parallel {
        register_files_parallel(&topology, &config.widths, config.write_qualifier)?
    } else {
        topology
            .slaves()
            .iter()
            .map(|s| generate_with_qualifier(s, &config.widths, config.write_qualifier))
            .collect::<Result<Vec<_>>>()?
    };

    // Stage 3: Interconnect
    let fabric = generate_for(&topology, config);
    let declared = fabric.declared_names();
    if let Some(name) = first_duplicate(&declared) {
        return Err(GenerationError::NameCollision {
            unit: fabric.entity.clone(),
            name: name.to_string(),
        });
    }

    // Stage 4: Token maps
    let mut units: Vec<RenderUnit> = register_files
        .iter()
        .map(|rf| RenderUnit {
            name: rf.entity.clone(),
            kind: UnitKind::RegisterFile,
            tokens: register_file_tokens(rf),
        })
        .collect();
    units.push(RenderUnit {
        name: fabric.entity.clone(),
        kind: UnitKind::Fabric,
        tokens: fabric_tokens(&fabric),
    });

    let digest = ContentHash::of(&(&topology, &register_files, &fabric))?.to_string();
    let report = GenerationReport {
        name: config.name.clone(),
        widths: config.widths,
        write_qualifier: config.write_qualifier,
        slaves: topology
            .placed()
            .map(|p| SlaveSummary {
                id: p.descriptor.id.clone(),
                base_address: p.base_address,
                priority: p.priority,
                registers: p.descriptor.registers.len(),
                interrupt: p.descriptor.has_interrupt,
            })
            .collect(),
        units: units.iter().map(|u| u.name.clone()).collect(),
        interrupt_vector_width: fabric.interrupts.vector_width,
        digest,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        fabric = %config.name,
        slaves = topology.len(),
        units = units.len(),
        digest = %report.digest,
        "generation complete"
    );

    Ok(GenerationOutput {
        topology,
        register_files,
        fabric,
        units,
        report,
    })
}

/// Generate every register file on its own scoped thread.
///
/// Results are joined in topology order, so the first error reported is the
/// same one a sequential run would report.
fn register_files_parallel(
    topology: &FabricTopology,
    widths: &BusWidths,
    write_qualifier: WriteQualifier,
) -> Result<Vec<RegisterFileSpec>> {
    debug!(slaves = topology.len(), "generating register files in parallel");
    thread::scope(|scope| {
        let handles: Vec<_> = topology
            .slaves()
            .iter()
            .map(|slave| scope.spawn(move || generate_with_qualifier(slave, widths, write_qualifier)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    })
}
