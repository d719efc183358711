//! Interconnect generation from a planned topology.
//!
//! The master address splits into a core field and a register field. Each
//! slave gets a comparator on the core field, an AND-gated strobe, and a
//! slot in the acknowledge OR, the read-data multiplexer, and (when
//! interrupt-capable) the interrupt OR and priority decoder.

use serde::Serialize;
use tracing::debug;

use busfab_core::hdl::constant_name;
use busfab_core::types::{bits_for, low_mask, BitVector, BusWidths, SlaveId};
use busfab_core::{GeneratorConfig, WriteQualifier};

use crate::plan::FabricTopology;

/// Fabric-side view of one slave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlavePort {
    pub id: SlaveId,
    /// Position in the topology; also the interrupt vector value.
    pub index: usize,
    /// Comparator constant, `core_address_width` bits wide.
    pub base: BitVector,
    pub priority: u32,
    pub has_interrupt: bool,
}

impl SlavePort {
    /// `selected(s) := (coreAddress == baseAddressOf(s))`.
    pub fn selected(&self, core_address: u64) -> bool {
        core_address == self.base.value()
    }

    fn stem(&self) -> String {
        self.id.hdl_name()
    }

    pub fn base_constant(&self) -> String {
        constant_name(&["slave", &self.stem(), "base"])
    }

    pub fn select_signal(&self) -> String {
        format!("{}_sel", self.stem())
    }

    pub fn strobe_port(&self) -> String {
        format!("{}_stb_o", self.stem())
    }

    pub fn ack_port(&self) -> String {
        format!("{}_ack_i", self.stem())
    }

    pub fn data_port(&self) -> String {
        format!("{}_dat_i", self.stem())
    }

    pub fn irq_port(&self) -> String {
        format!("{}_irq_i", self.stem())
    }
}

/// Priority decoder over the interrupt-capable slaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterruptDecoder {
    /// Slave indices in priority order, highest first.
    pub sources: Vec<usize>,
    pub vector_width: u32,
    /// Vector value when no source asserts. Never a valid slave index.
    pub no_interrupt: u64,
}

impl InterruptDecoder {
    fn for_slaves(slaves: &[SlavePort]) -> Self {
        let mut ranked: Vec<&SlavePort> = slaves.iter().filter(|s| s.has_interrupt).collect();
        ranked.sort_by_key(|s| s.priority);
        let vector_width = bits_for(slaves.len() as u64 + 1);
        Self {
            sources: ranked.iter().map(|s| s.index).collect(),
            vector_width,
            no_interrupt: low_mask(vector_width),
        }
    }

    /// Highest-priority asserting source, or the sentinel.
    pub fn resolve(&self, asserted: impl Fn(usize) -> bool) -> u64 {
        self.sources
            .iter()
            .copied()
            .find(|&index| asserted(index))
            .map(|index| index as u64)
            .unwrap_or(self.no_interrupt)
    }
}

/// The generated interconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FabricSpec {
    /// Entity name of the interconnect.
    pub entity: String,
    pub widths: BusWidths,
    pub write_qualifier: WriteQualifier,
    /// Slaves in topology order.
    pub slaves: Vec<SlavePort>,
    pub interrupts: InterruptDecoder,
}

impl FabricSpec {
    /// The slave whose comparator matches `core_address`.
    pub fn selected_slave(&self, core_address: u64) -> Option<&SlavePort> {
        self.slaves.iter().find(|s| s.selected(core_address))
    }

    pub fn interrupt_sources(&self) -> impl Iterator<Item = &SlavePort> {
        self.interrupts.sources.iter().map(|&i| &self.slaves[i])
    }

    pub fn slave(&self, id: &SlaveId) -> Option<&SlavePort> {
        self.slaves.iter().find(|s| &s.id == id)
    }

    /// Every generic, port, constant and signal the interconnect declares.
    pub fn declared_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [
            "ADDR_W", "DATA_W", "CORE_W", "REG_W", "wbm_adr_i", "wbm_dat_i", "wbm_dat_o",
            "wbm_stb_i", "wbm_ack_o", "s_adr_o", "s_dat_o", "irq_vector_o", "irq_o",
        ]
        .iter()
        .map(|n| n.to_string())
        .collect();
        if self.write_qualifier.has_we_line() {
            names.push("wbm_we_i".to_string());
            names.push("s_we_o".to_string());
        }
        let has_core_field = self.widths.core_address_width() > 0;
        if has_core_field {
            names.push("core_adr".to_string());
        }
        for s in &self.slaves {
            names.extend([s.strobe_port(), s.ack_port(), s.data_port(), s.select_signal()]);
            if s.has_interrupt {
                names.push(s.irq_port());
            }
            if has_core_field {
                names.push(s.base_constant());
            }
        }
        names
    }
}

/// Generate a fabric named `fabric` with strobe-only write qualification.
pub fn generate(topology: &FabricTopology, widths: &BusWidths) -> FabricSpec {
    generate_for(topology, &GeneratorConfig::new("fabric", *widths))
}

/// Generate the interconnect for a planned topology.
///
/// Relies on the planner's guarantee of distinct base addresses; nothing is
/// re-checked here.
pub fn generate_for(topology: &FabricTopology, config: &GeneratorConfig) -> FabricSpec {
    let widths = config.widths;
    let core_w = widths.core_address_width().max(1);
    let slaves: Vec<SlavePort> = topology
        .placed()
        .map(|p| SlavePort {
            id: p.descriptor.id.clone(),
            index: p.index,
            base: BitVector::truncate(core_w, p.base_address),
            priority: p.priority,
            has_interrupt: p.descriptor.has_interrupt,
        })
        .collect();
    let interrupts = InterruptDecoder::for_slaves(&slaves);

    debug!(
        fabric = %config.name,
        slaves = slaves.len(),
        interrupt_sources = interrupts.sources.len(),
        vector_width = interrupts.vector_width,
        "generated fabric"
    );

    FabricSpec {
        entity: format!("{}_intercon", config.name.to_ascii_lowercase()),
        widths,
        write_qualifier: config.write_qualifier,
        slaves,
        interrupts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busfab_core::types::SlaveDescriptor;

    use crate::plan::plan;

    fn widths() -> BusWidths {
        BusWidths::new(16, 32, 4).unwrap()
    }

    fn topology(spec: &[(&str, bool)]) -> FabricTopology {
        let slaves: Vec<SlaveDescriptor> = spec
            .iter()
            .map(|(id, irq)| {
                let mut s = SlaveDescriptor::new(*id);
                s.has_interrupt = *irq;
                s
            })
            .collect();
        plan(&slaves, &widths()).unwrap()
    }

    #[test]
    fn declared_names_follow_the_ports() {
        let fabric = generate(&topology(&[("uart", true), ("gpio", false)]), &widths());
        let names = fabric.declared_names();
        for expected in ["wbm_dat_i", "uart_irq_i", "gpio_dat_i", "gpio_sel", "core_adr", "SLAVE_UART_BASE"] {
            assert!(names.iter().any(|n| n == expected), "{expected}");
        }
        assert!(!names.iter().any(|n| n == "gpio_irq_i" || n == "s_we_o"));
        assert!(busfab_core::hdl::first_duplicate(&names).is_none());
    }

    #[test]
    fn comparators_are_mutually_exclusive() {
        let fabric = generate(&topology(&[("a", false), ("b", false), ("c", false)]), &widths());
        for core in 0..widths().slave_capacity() {
            let hits = fabric.slaves.iter().filter(|s| s.selected(core)).count();
            assert!(hits <= 1, "core address {core} selects {hits} slaves");
        }
        assert_eq!(fabric.selected_slave(1).unwrap().id.as_str(), "b");
        assert!(fabric.selected_slave(7).is_none());
    }

    #[test]
    fn priority_decoder_picks_highest() {
        let fabric = generate(&topology(&[("x", true), ("y", true)]), &widths());
        assert_eq!(fabric.interrupts.sources, vec![0, 1]);
        assert_eq!(fabric.interrupts.resolve(|_| true), 0);
        assert_eq!(fabric.interrupts.resolve(|i| i == 1), 1);
    }

    #[test]
    fn sentinel_is_not_an_index() {
        let fabric = generate(&topology(&[("a", true), ("b", false), ("c", true)]), &widths());
        assert_eq!(fabric.interrupts.vector_width, 2);
        assert_eq!(fabric.interrupts.no_interrupt, 3);
        assert_eq!(fabric.interrupts.resolve(|_| false), 3);
        // b is not a source even when "asserted"
        assert_eq!(fabric.interrupts.resolve(|i| i == 1), 3);
        assert_eq!(fabric.interrupt_sources().count(), 2);
    }

    #[test]
    fn vector_width_grows_with_slave_count() {
        let fabric = generate(
            &topology(&[("a", true), ("b", true), ("c", true), ("d", true)]),
            &widths(),
        );
        assert_eq!(fabric.interrupts.vector_width, 3);
        assert_eq!(fabric.interrupts.no_interrupt, 7);

        let empty = generate(&topology(&[]), &widths());
        assert_eq!(empty.interrupts.vector_width, 1);
        assert_eq!(empty.interrupts.no_interrupt, 1);
    }

    #[test]
    fn port_names() {
        let fabric = generate(&topology(&[("Uart", true)]), &widths());
        let port = &fabric.slaves[0];
        assert_eq!(port.base_constant(), "SLAVE_UART_BASE");
        assert_eq!(port.strobe_port(), "uart_stb_o");
        assert_eq!(port.ack_port(), "uart_ack_i");
        assert_eq!(port.data_port(), "uart_dat_i");
        assert_eq!(port.irq_port(), "uart_irq_i");
        assert_eq!(port.select_signal(), "uart_sel");
        assert_eq!(port.base.width(), 4);
        assert_eq!(fabric.entity, "fabric_intercon");
    }

    #[test]
    fn entity_from_config_name() {
        let cfg = GeneratorConfig::new("SoC", widths());
        let fabric = generate_for(&topology(&[("a", false)]), &cfg);
        assert_eq!(fabric.entity, "soc_intercon");
    }
}
