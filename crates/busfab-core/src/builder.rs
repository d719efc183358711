//! Slave construction API.
//!
//! `SlaveBuilder` assembles a [`SlaveDescriptor`] register by register and
//! validates it against the bus widths on `build`.
//!
//! # Example
//!
//! ```rust
//! use busfab_core::builder::SlaveBuilder;
//! use busfab_core::types::{BusWidths, Direction};
//!
//! let widths = BusWidths::new(16, 32, 4).unwrap();
//!
//! let mut builder = SlaveBuilder::new("uart");
//! builder.interrupt();
//! builder.add_register("ctrl", 8, Direction::HostWrite);
//! builder.add_register("status", 8, Direction::HostRead);
//! builder.add_register_at("divisor", 0x10, 16, Direction::Both, 0x1B2);
//!
//! let slave = builder.build(&widths).unwrap();
//! assert_eq!(slave.registers.len(), 3);
//! assert_eq!(slave.registers[1].offset, 1);
//! ```

use crate::error::Result;
use crate::types::{BusWidths, Direction, RegisterDescriptor, SlaveDescriptor};

/// A builder for slave descriptors.
#[derive(Debug, Clone)]
pub struct SlaveBuilder {
    slave: SlaveDescriptor,
    /// Offset handed to the next auto-placed register.
    next_offset: u64,
}

impl SlaveBuilder {
    /// Start a slave with the given id and no registers.
    pub fn new(id: &str) -> Self {
        Self {
            slave: SlaveDescriptor::new(id),
            next_offset: 0,
        }
    }

    /// Mark the slave as interrupt-capable.
    pub fn interrupt(&mut self) -> &mut Self {
        self.slave.has_interrupt = true;
        self
    }

    /// Pin the slave to a core address.
    pub fn base_address(&mut self, base: u64) -> &mut Self {
        self.slave.base_address = Some(base);
        self
    }

    /// Add a register at the offset after the last one added, reset to zero.
    pub fn add_register(&mut self, name: &str, width_bits: u32, direction: Direction) -> &mut Self {
        let offset = self.next_offset;
        self.add_register_at(name, offset, width_bits, direction, 0)
    }

    /// Add a register at an explicit offset with a reset value.
    pub fn add_register_at(
        &mut self,
        name: &str,
        offset: u64,
        width_bits: u32,
        direction: Direction,
        reset_value: u64,
    ) -> &mut Self {
        self.slave.registers.push(
            RegisterDescriptor::new(name, offset, width_bits, direction).with_reset(reset_value),
        );
        self.next_offset = offset.saturating_add(1);
        self
    }

    /// Set the reset value of the most recently added register.
    pub fn reset(&mut self, value: u64) -> &mut Self {
        if let Some(last) = self.slave.registers.last_mut() {
            last.reset_value = value;
        }
        self
    }

    /// Validate against `widths` and return the descriptor.
    pub fn build(&self, widths: &BusWidths) -> Result<SlaveDescriptor> {
        self.slave.validate(widths)?;
        Ok(self.slave.clone())
    }
}
