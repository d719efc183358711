//! Interconnect model: one master, every slave model behind it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use busfab_core::types::SlaveId;
use busfab_fabric::FabricSpec;

use crate::error::{Result, SimError};
use crate::slave::{BusCycle, SlaveModel};

/// Master-side inputs for one clock edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterCycle {
    pub reset: bool,
    pub strobe: bool,
    pub we: bool,
    /// Full master address (`wbm_adr_i`).
    pub address: u64,
    pub write_data: u64,
    /// Hardware loads, per slave and register.
    pub loads: BTreeMap<SlaveId, BTreeMap<String, u64>>,
}

impl MasterCycle {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn reset() -> Self {
        Self {
            reset: true,
            ..Self::default()
        }
    }

    pub fn write(address: u64, data: u64) -> Self {
        Self {
            strobe: true,
            we: true,
            address,
            write_data: data,
            ..Self::default()
        }
    }

    pub fn read(address: u64) -> Self {
        Self {
            strobe: true,
            address,
            ..Self::default()
        }
    }

    pub fn with_load(mut self, slave: &str, register: &str, value: u64) -> Self {
        self.loads
            .entry(SlaveId::from(slave))
            .or_default()
            .insert(register.to_ascii_lowercase(), value);
        self
    }
}

/// Combinational master outputs sampled in a cycle, before the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterResponse {
    pub ack: bool,
    pub read_data: u64,
}

/// Interrupt outputs of the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqState {
    /// `irq_o`
    pub irq: bool,
    /// `irq_vector_o`
    pub vector: u64,
}

/// A generated fabric with its slaves.
#[derive(Debug, Clone)]
pub struct FabricModel {
    spec: FabricSpec,
    slaves: Vec<SlaveModel>,
}

impl FabricModel {
    /// Assemble a model; `slaves` must follow the fabric's topology order.
    pub fn new(spec: &FabricSpec, slaves: Vec<SlaveModel>) -> Result<Self> {
        if slaves.len() != spec.slaves.len() {
            return Err(SimError::SlaveCountMismatch {
                expected: spec.slaves.len(),
                got: slaves.len(),
            });
        }
        for (index, (port, model)) in spec.slaves.iter().zip(&slaves).enumerate() {
            if port.id.hdl_name() != model.spec().slave.hdl_name() {
                return Err(SimError::SlaveOrderMismatch {
                    index,
                    expected: port.id.to_string(),
                    got: model.spec().slave.to_string(),
                });
            }
        }
        Ok(Self {
            spec: spec.clone(),
            slaves,
        })
    }

    pub fn slave(&self, id: &str) -> Option<&SlaveModel> {
        self.position(id).map(|i| &self.slaves[i])
    }

    pub fn slave_mut(&mut self, id: &str) -> Option<&mut SlaveModel> {
        self.position(id).map(|i| &mut self.slaves[i])
    }

    /// Evaluate the combinational outputs for `cycle`, then apply the clock
    /// edge to every slave.
    ///
    /// Unselected slaves see a de-asserted strobe.
    pub fn clock(&mut self, cycle: &MasterCycle) -> MasterResponse {
        let (core, register) = self.spec.widths.split_address(cycle.address);
        let mut ack = false;
        let mut read_data = 0;

        for (port, slave) in self.spec.slaves.iter().zip(self.slaves.iter_mut()) {
            let strobe = cycle.strobe && port.selected(core);
            ack |= slave.ack(strobe);
            if port.selected(core) {
                read_data = slave.read_data(register);
            }
            let bus = BusCycle {
                reset: cycle.reset,
                strobe,
                we: cycle.we,
                address: register,
                write_data: cycle.write_data,
                loads: cycle.loads.get(&port.id).cloned().unwrap_or_default(),
            };
            slave.clock(&bus);
        }

        trace!(address = cycle.address, core, register, ack, read_data, "fabric cycle");
        MasterResponse { ack, read_data }
    }

    /// Interrupt outputs when exactly the slaves in `asserting` raise their
    /// interrupt lines.
    pub fn interrupts(&self, asserting: &BTreeSet<SlaveId>) -> IrqState {
        let raised = |index: usize| asserting.contains(&self.spec.slaves[index].id);
        let irq = self.spec.interrupts.sources.iter().any(|&i| raised(i));
        IrqState {
            irq,
            vector: self.spec.interrupts.resolve(raised),
        }
    }

    /// Interrupt outputs driven by the slave models' own irq lines.
    pub fn current_interrupts(&self) -> IrqState {
        let asserting: BTreeSet<SlaveId> = self
            .spec
            .slaves
            .iter()
            .zip(&self.slaves)
            .filter(|(_, m)| m.irq())
            .map(|(p, _)| p.id.clone())
            .collect();
        self.interrupts(&asserting)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.spec
            .slaves
            .iter()
            .position(|p| p.id.as_str().eq_ignore_ascii_case(id))
    }
}
