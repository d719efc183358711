//! Fabric topology planning: core-address assignment and interrupt priority.
//!
//! Slaves are placed in input order. Unpinned slaves take the lowest free
//! core address, so an input without pins maps to `0, 1, 2, ...`. Priority
//! follows input order, index 0 being the highest.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use busfab_core::error::{GenerationError, Result};
use busfab_core::types::{BusWidths, SlaveDescriptor, SlaveId};

/// The planned address map of a fabric.
///
/// Only [`plan`] builds one, so every slave has a base address and a rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FabricTopology {
    /// Slaves in input order.
    ordered_slaves: Vec<SlaveDescriptor>,
    base_address_of: BTreeMap<SlaveId, u64>,
    /// Interrupt priority rank, 0 = highest.
    priority_of: BTreeMap<SlaveId, u32>,
}

/// A slave together with its placement.
#[derive(Debug, Clone, Copy)]
pub struct PlacedSlave<'a> {
    /// Position in `ordered_slaves`.
    pub index: usize,
    pub descriptor: &'a SlaveDescriptor,
    pub base_address: u64,
    pub priority: u32,
}

impl FabricTopology {
    pub fn len(&self) -> usize {
        self.ordered_slaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_slaves.is_empty()
    }

    /// Slaves in input order.
    pub fn slaves(&self) -> &[SlaveDescriptor] {
        &self.ordered_slaves
    }

    pub fn base_addresses(&self) -> &BTreeMap<SlaveId, u64> {
        &self.base_address_of
    }

    pub fn priorities(&self) -> &BTreeMap<SlaveId, u32> {
        &self.priority_of
    }

    pub fn base_address(&self, id: &SlaveId) -> Option<u64> {
        self.base_address_of.get(id).copied()
    }

    pub fn priority(&self, id: &SlaveId) -> Option<u32> {
        self.priority_of.get(id).copied()
    }

    /// Slaves with their placement, in input order.
    pub fn placed(&self) -> impl Iterator<Item = PlacedSlave<'_>> {
        self.ordered_slaves
            .iter()
            .enumerate()
            .filter_map(|(index, descriptor)| {
                Some(PlacedSlave {
                    index,
                    descriptor,
                    base_address: self.base_address(&descriptor.id)?,
                    priority: self.priority(&descriptor.id)?,
                })
            })
    }

    /// The slave decoded at `core_address`, if any.
    pub fn slave_at(&self, core_address: u64) -> Option<&SlaveDescriptor> {
        self.ordered_slaves
            .iter()
            .find(|s| self.base_address_of.get(&s.id) == Some(&core_address))
    }
}

/// Assign every slave a distinct core address and a priority rank.
pub fn plan(slaves: &[SlaveDescriptor], widths: &BusWidths) -> Result<FabricTopology> {
    let capacity = widths.slave_capacity();
    if slaves.len() as u64 > capacity {
        return Err(GenerationError::AddressSpaceExhausted {
            slaves: slaves.len(),
            capacity,
        });
    }

    let mut seen = BTreeSet::new();
    for slave in slaves {
        if !seen.insert(slave.id.hdl_name()) {
            return Err(GenerationError::DuplicateSlaveId {
                id: slave.id.to_string(),
            });
        }
    }

    for slave in slaves {
        slave.check_register_span(widths)?;
    }

    // Pinned addresses first, so auto-placed slaves flow around them.
    let mut pinned: BTreeMap<u64, &SlaveId> = BTreeMap::new();
    for slave in slaves {
        let Some(base) = slave.base_address else {
            continue;
        };
        if base >= capacity {
            return Err(GenerationError::BaseAddressOutOfRange {
                slave: slave.id.to_string(),
                base,
                capacity,
            });
        }
        if let Some(first) = pinned.insert(base, &slave.id) {
            return Err(GenerationError::BaseAddressConflict {
                first: first.to_string(),
                second: slave.id.to_string(),
                base,
            });
        }
    }

    let mut base_address_of = BTreeMap::new();
    let mut priority_of = BTreeMap::new();
    let mut next_free = 0u64;
    for (index, slave) in slaves.iter().enumerate() {
        let base = match slave.base_address {
            Some(base) => base,
            None => {
                while pinned.contains_key(&next_free) {
                    next_free += 1;
                }
                let base = next_free;
                next_free += 1;
                base
            }
        };
        debug!(slave = %slave.id, base, priority = index, "placed slave");
        base_address_of.insert(slave.id.clone(), base);
        priority_of.insert(slave.id.clone(), index as u32);
    }

    Ok(FabricTopology {
        ordered_slaves: slaves.to_vec(),
        base_address_of,
        priority_of,
    })
}
