//! SoC fabric: a worked busfab example.
//!
//! Three slaves on a 16-bit address / 32-bit data bus with a 4-bit core
//! field (up to 16 slaves of 4096 registers each):
//!
//!   uart   core 0   ctrl (W, reset 0x03), status (R), data (RW), irq
//!   gpio   core 1   out (W), in (R), dir (RW)
//!   timer  core 8   load (W), count (R), irq, pinned
//!
//! Writes are qualified by a dedicated `we` line. The uart outranks the
//! timer for interrupts; with both asserting, `irq_vector_o` reads 0.

use busfab_core::types::{BusWidths, Direction, SlaveDescriptor};
use busfab_core::{GeneratorConfig, Result, SlaveBuilder, WriteQualifier};

pub const FABRIC_NAME: &str = "soc";
pub const TIMER_BASE: u64 = 8;

pub fn widths() -> Result<BusWidths> {
    BusWidths::new(16, 32, 4)
}

pub fn config() -> Result<GeneratorConfig> {
    Ok(GeneratorConfig::new(FABRIC_NAME, widths()?)
        .with_write_qualifier(WriteQualifier::WriteEnable)
        .with_parallel(true))
}

/// The slaves, in priority order.
pub fn slaves() -> Result<Vec<SlaveDescriptor>> {
    let widths = widths()?;

    let mut uart = SlaveBuilder::new("uart");
    uart.interrupt()
        .add_register("ctrl", 8, Direction::HostWrite)
        .reset(0x03)
        .add_register("status", 8, Direction::HostRead)
        .add_register("data", 8, Direction::Both);

    let mut gpio = SlaveBuilder::new("gpio");
    gpio.add_register("out", 32, Direction::HostWrite)
        .add_register("in", 32, Direction::HostRead)
        .add_register("dir", 32, Direction::Both);

    let mut timer = SlaveBuilder::new("timer");
    timer
        .interrupt()
        .base_address(TIMER_BASE)
        .add_register("load", 32, Direction::HostWrite)
        .add_register("count", 32, Direction::HostRead);

    Ok(vec![
        uart.build(&widths)?,
        gpio.build(&widths)?,
        timer.build(&widths)?,
    ])
}
