//! `busfab plan`: print the planned address map.

use anyhow::Result;

use busfab_fabric::{plan, FabricTopology, SlaveSummary};

use super::{prepare, text_or_json};
use crate::project::Project;

pub fn run(project: &Project, format: Option<&str>) -> Result<()> {
    let json = text_or_json(format)?;
    let (config, slaves) = prepare(project)?;
    let topology = plan(&slaves, &config.widths)?;
    let summary = summarize(&topology);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Fabric: {} ({})", config.name, config.widths);
    println!("  {:<12} {:>6} {:>10}  irq", "slave", "base", "priority");
    for s in &summary {
        println!(
            "  {:<12} {:>6} {:>10}  {}",
            s.id.as_str(),
            format!("{:#x}", s.base_address),
            s.priority,
            if s.interrupt { "yes" } else { "-" }
        );
    }
    let free = config.widths.slave_capacity() - summary.len() as u64;
    println!("{} of {} core addresses free", free, config.widths.slave_capacity());
    Ok(())
}

fn summarize(topology: &FabricTopology) -> Vec<SlaveSummary> {
    topology
        .placed()
        .map(|p| SlaveSummary {
            id: p.descriptor.id.clone(),
            base_address: p.base_address,
            priority: p.priority,
            registers: p.descriptor.registers.len(),
            interrupt: p.descriptor.has_interrupt,
        })
        .collect()
}
