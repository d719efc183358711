//! Register-file model.

use std::collections::BTreeMap;

use busfab_core::types::low_mask;
use busfab_regfile::RegisterFileSpec;

/// Bus and peripheral inputs of a register file for one clock edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusCycle {
    pub reset: bool,
    pub strobe: bool,
    /// Only consulted when the register file carries a `we` line.
    pub we: bool,
    /// Register address (`wb_adr_i`).
    pub address: u64,
    pub write_data: u64,
    /// Hardware loads of host-read registers, by register name.
    pub loads: BTreeMap<String, u64>,
}

impl BusCycle {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn reset() -> Self {
        Self {
            reset: true,
            ..Self::default()
        }
    }

    /// A strobed write cycle.
    pub fn write(address: u64, data: u64) -> Self {
        Self {
            strobe: true,
            we: true,
            address,
            write_data: data,
            ..Self::default()
        }
    }

    /// A strobed read cycle.
    pub fn read(address: u64) -> Self {
        Self {
            strobe: true,
            address,
            ..Self::default()
        }
    }

    /// Assert the load strobe of a host-read register.
    pub fn with_load(mut self, register: &str, value: u64) -> Self {
        self.loads.insert(register.to_ascii_lowercase(), value);
        self
    }
}

/// State of one generated register file.
#[derive(Debug, Clone)]
pub struct SlaveModel {
    spec: RegisterFileSpec,
    /// Stored values, parallel to `spec.registers`.
    values: Vec<u64>,
    irq_in: bool,
}

impl SlaveModel {
    /// A register file in its reset state.
    pub fn new(spec: &RegisterFileSpec) -> Self {
        Self {
            values: spec.registers.iter().map(|r| r.reset_value.value()).collect(),
            spec: spec.clone(),
            irq_in: false,
        }
    }

    pub fn spec(&self) -> &RegisterFileSpec {
        &self.spec
    }

    /// Apply one rising clock edge.
    ///
    /// Reset dominates every write enable and hardware load.
    pub fn clock(&mut self, cycle: &BusCycle) {
        let address = cycle.address & low_mask(self.spec.widths.register_address_width());
        for (reg, value) in self.spec.registers.iter().zip(self.values.iter_mut()) {
            if cycle.reset {
                *value = reg.reset_value.value();
                continue;
            }
            let mask = low_mask(reg.width_bits);
            if let Some(we) = reg.write_enable {
                if we.active(cycle.strobe, cycle.we, reg.selected(address)) {
                    *value = cycle.write_data & mask;
                }
            } else if reg.hardware_loaded() {
                if let Some(load) = cycle.loads.get(&reg.name.to_ascii_lowercase()) {
                    *value = load & mask;
                }
            }
        }
    }

    /// Combinational read data for `address`; zero when nothing readable
    /// matches.
    pub fn read_data(&self, address: u64) -> u64 {
        let address = address & low_mask(self.spec.widths.register_address_width());
        self.spec
            .registers
            .iter()
            .zip(&self.values)
            .find(|(r, _)| r.readable() && r.selected(address))
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    pub fn ack(&self, strobe: bool) -> bool {
        self.spec.ack(strobe)
    }

    /// Stored value of a register.
    pub fn value(&self, name: &str) -> Option<u64> {
        self.index_of(name).map(|i| self.values[i])
    }

    /// Value on a register's output port, if it has one.
    pub fn output(&self, name: &str) -> Option<u64> {
        self.index_of(name)
            .filter(|&i| self.spec.registers[i].drives_output())
            .map(|i| self.values[i])
    }

    /// Drive the peripheral interrupt input.
    pub fn set_irq(&mut self, asserted: bool) {
        self.irq_in = asserted;
    }

    /// The interrupt output; always low for slaves without one.
    pub fn irq(&self) -> bool {
        self.spec.has_interrupt && self.irq_in
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.spec
            .registers
            .iter()
            .position(|r| r.name.eq_ignore_ascii_case(name))
    }
}
