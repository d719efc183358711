//! Slave descriptor to register-bank spec.

use serde::Serialize;
use tracing::debug;

use busfab_core::error::{GenerationError, Result};
use busfab_core::hdl::{constant_name, first_duplicate};
use busfab_core::types::{BitVector, BusWidths, Direction, SlaveDescriptor, SlaveId};
use busfab_core::WriteQualifier;

/// Acknowledge behavior of a register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AckPolicy {
    /// Every strobe cycle is acknowledged, whether or not the register
    /// address matches a defined register. Unmatched writes are no-ops.
    AnyStrobe,
}

/// Read data driven when no readable register matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadDefault {
    Zero,
}

/// Write-enable predicate of a host-writable register:
/// `strobe AND [we] AND selected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteEnable {
    /// Whether the bus `we` line is part of the predicate.
    pub requires_we: bool,
}

impl WriteEnable {
    /// Evaluate the predicate for one cycle.
    pub fn active(&self, strobe: bool, we: bool, selected: bool) -> bool {
        strobe && (we || !self.requires_we) && selected
    }
}

/// Generated logic for one register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterLogic {
    pub name: String,
    pub offset: u64,
    pub width_bits: u32,
    pub direction: Direction,
    /// Comparator constant, `register_address_width` bits wide.
    pub address: BitVector,
    pub reset_value: BitVector,
    /// Present for host-writable registers.
    pub write_enable: Option<WriteEnable>,
}

impl RegisterLogic {
    /// `registerSelected(r) := (registerAddress == r.offset)`.
    pub fn selected(&self, register_address: u64) -> bool {
        register_address == self.offset
    }

    pub fn readable(&self) -> bool {
        self.direction.host_readable()
    }

    /// Host-read registers are loaded by the peripheral.
    pub fn hardware_loaded(&self) -> bool {
        self.direction == Direction::HostRead
    }

    /// Host-writable registers drive an output port.
    pub fn drives_output(&self) -> bool {
        self.direction.host_writable()
    }

    fn stem(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    pub fn storage_signal(&self) -> String {
        format!("reg_{}", self.stem())
    }

    pub fn select_signal(&self) -> String {
        format!("sel_{}", self.stem())
    }

    pub fn enable_signal(&self) -> String {
        format!("we_{}", self.stem())
    }

    pub fn address_constant(&self) -> String {
        constant_name(&["reg", &self.name, "addr"])
    }

    pub fn input_port(&self) -> String {
        format!("{}_i", self.stem())
    }

    pub fn load_port(&self) -> String {
        format!("{}_ld_i", self.stem())
    }

    pub fn output_port(&self) -> String {
        format!("{}_o", self.stem())
    }
}

/// Bus ports and generics every register file declares.
const BUS_NAMES: &[&str] = &[
    "ADDR_W", "DATA_W", "clk_i", "rst_i", "wb_adr_i", "wb_dat_i", "wb_dat_o", "wb_stb_i",
    "wb_ack_o",
];

/// A compiled register bank for one slave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterFileSpec {
    pub slave: SlaveId,
    /// Entity name of the generated register file.
    pub entity: String,
    pub widths: BusWidths,
    pub write_qualifier: WriteQualifier,
    /// Registers in address order.
    pub registers: Vec<RegisterLogic>,
    pub has_interrupt: bool,
    pub ack: AckPolicy,
    pub read_default: ReadDefault,
}

impl RegisterFileSpec {
    /// The register whose comparator matches `register_address`, if any.
    ///
    /// Offsets are distinct, so at most one register matches.
    pub fn register_at(&self, register_address: u64) -> Option<&RegisterLogic> {
        self.registers.iter().find(|r| r.selected(register_address))
    }

    pub fn register(&self, name: &str) -> Option<&RegisterLogic> {
        self.registers
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn readable_registers(&self) -> impl Iterator<Item = &RegisterLogic> {
        self.registers.iter().filter(|r| r.readable())
    }

    pub fn writable_registers(&self) -> impl Iterator<Item = &RegisterLogic> {
        self.registers.iter().filter(|r| r.write_enable.is_some())
    }

    /// Acknowledge output for a cycle.
    pub fn ack(&self, strobe: bool) -> bool {
        match self.ack {
            AckPolicy::AnyStrobe => strobe,
        }
    }

    /// Every generic, port, constant and signal the entity declares, in
    /// declaration order.
    pub fn declared_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUS_NAMES.iter().map(|n| n.to_string()).collect();
        if self.write_qualifier.has_we_line() {
            names.push("wb_we_i".to_string());
        }
        if self.has_interrupt {
            names.push("irq_i".to_string());
            names.push("irq_o".to_string());
        }
        for r in &self.registers {
            if r.hardware_loaded() {
                names.push(r.input_port());
                names.push(r.load_port());
            }
            if r.drives_output() {
                names.push(r.output_port());
            }
        }
        for r in &self.registers {
            names.push(r.address_constant());
            names.push(r.storage_signal());
            names.push(r.select_signal());
            if r.write_enable.is_some() {
                names.push(r.enable_signal());
            }
        }
        names
    }
}

/// Compile a slave with the default strobe-only write qualification.
pub fn generate(slave: &SlaveDescriptor, widths: &BusWidths) -> Result<RegisterFileSpec> {
    generate_with_qualifier(slave, widths, WriteQualifier::default())
}

/// Compile a slave into a register-file spec.
///
/// Fails on any per-slave invariant violation, including
/// `DuplicateRegisterOffset` and `RegisterAddressOverflow`, and with
/// `NameCollision` when two register names derive the same HDL name
/// (`x` loads through `x_ld_i`, which is also the input port of `x_ld`).
pub fn generate_with_qualifier(
    slave: &SlaveDescriptor,
    widths: &BusWidths,
    write_qualifier: WriteQualifier,
) -> Result<RegisterFileSpec> {
    slave.validate(widths)?;

    let mut registers: Vec<RegisterLogic> = slave
        .registers
        .iter()
        .map(|reg| RegisterLogic {
            name: reg.name.clone(),
            offset: reg.offset,
            width_bits: reg.width_bits,
            direction: reg.direction,
            address: BitVector::truncate(widths.register_address_width(), reg.offset),
            reset_value: reg.reset_vector(),
            write_enable: reg.direction.host_writable().then_some(WriteEnable {
                requires_we: write_qualifier.has_we_line(),
            }),
        })
        .collect();
    registers.sort_by_key(|r| r.offset);

    debug!(
        slave = %slave.id,
        registers = registers.len(),
        writable = registers.iter().filter(|r| r.write_enable.is_some()).count(),
        "generated register file"
    );

    let spec = RegisterFileSpec {
        slave: slave.id.clone(),
        entity: format!("{}_regs", slave.id.hdl_name()),
        widths: *widths,
        write_qualifier,
        registers,
        has_interrupt: slave.has_interrupt,
        ack: AckPolicy::AnyStrobe,
        read_default: ReadDefault::Zero,
    };
    let declared = spec.declared_names();
    if let Some(name) = first_duplicate(&declared) {
        return Err(GenerationError::NameCollision {
            unit: spec.entity.clone(),
            name: name.to_string(),
        });
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use busfab_core::types::RegisterDescriptor;
    use busfab_core::{GenerationError, SlaveBuilder};

    fn widths() -> BusWidths {
        BusWidths::new(16, 32, 4).unwrap()
    }

    fn uart() -> SlaveDescriptor {
        let mut b = SlaveBuilder::new("Uart");
        b.interrupt();
        b.add_register_at("status", 2, 8, Direction::HostRead, 0);
        b.add_register_at("ctrl", 0, 8, Direction::HostWrite, 0x03);
        b.add_register_at("data", 1, 8, Direction::Both, 0);
        b.build(&widths()).unwrap()
    }

    #[test]
    fn registers_in_address_order() {
        let spec = generate(&uart(), &widths()).unwrap();
        let names: Vec<&str> = spec.registers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ctrl", "data", "status"]);
        assert_eq!(spec.entity, "uart_regs");
        assert!(spec.has_interrupt);
    }

    #[test]
    fn write_enable_only_for_writable() {
        let spec = generate(&uart(), &widths()).unwrap();
        assert!(spec.register("ctrl").unwrap().write_enable.is_some());
        assert!(spec.register("data").unwrap().write_enable.is_some());
        assert!(spec.register("status").unwrap().write_enable.is_none());
        assert_eq!(spec.writable_registers().count(), 2);
        assert_eq!(spec.readable_registers().count(), 2);
    }

    #[test]
    fn strobe_only_write_enable() {
        let spec = generate(&uart(), &widths()).unwrap();
        let we = spec.register("ctrl").unwrap().write_enable.unwrap();
        assert!(!we.requires_we);
        assert!(we.active(true, false, true));
        assert!(!we.active(false, true, true));
        assert!(!we.active(true, true, false));
    }

    #[test]
    fn write_enable_line_qualifies() {
        let spec =
            generate_with_qualifier(&uart(), &widths(), WriteQualifier::WriteEnable).unwrap();
        let we = spec.register("ctrl").unwrap().write_enable.unwrap();
        assert!(we.requires_we);
        assert!(!we.active(true, false, true));
        assert!(we.active(true, true, true));
    }

    #[test]
    fn comparator_lookup() {
        let spec = generate(&uart(), &widths()).unwrap();
        assert_eq!(spec.register_at(1).unwrap().name, "data");
        assert!(spec.register_at(7).is_none());
        assert_eq!(spec.register("status").unwrap().address.width(), 12);
    }

    #[test]
    fn ack_on_any_strobe() {
        let spec = generate(&uart(), &widths()).unwrap();
        assert!(spec.ack(true));
        assert!(!spec.ack(false));
    }

    #[test]
    fn duplicate_offsets_fail() {
        let mut slave = SlaveDescriptor::new("bad");
        slave
            .registers
            .push(RegisterDescriptor::new("a", 0, 8, Direction::HostWrite));
        slave
            .registers
            .push(RegisterDescriptor::new("b", 0, 8, Direction::HostRead));
        assert!(matches!(
            generate(&slave, &widths()),
            Err(GenerationError::DuplicateRegisterOffset { offset: 0, .. })
        ));
    }

    #[test]
    fn signal_names() {
        let spec = generate(&uart(), &widths()).unwrap();
        let status = spec.register("status").unwrap();
        assert_eq!(status.storage_signal(), "reg_status");
        assert_eq!(status.select_signal(), "sel_status");
        assert_eq!(status.address_constant(), "REG_STATUS_ADDR");
        assert_eq!(status.input_port(), "status_i");
        assert_eq!(status.load_port(), "status_ld_i");
        assert!(status.hardware_loaded());
        assert!(!status.drives_output());
    }

    #[test]
    fn load_strobe_cannot_shadow_a_sibling_input() {
        let mut b = SlaveBuilder::new("adc");
        b.add_register("x", 8, Direction::HostRead)
            .add_register("x_ld", 8, Direction::HostRead);
        let slave = b.build(&widths()).unwrap();
        assert_eq!(
            generate(&slave, &widths()),
            Err(GenerationError::NameCollision {
                unit: "adc_regs".into(),
                name: "x_ld_i".into(),
            })
        );
    }

    #[test]
    fn storage_cannot_shadow_an_address_constant() {
        // reg_a_addr is both the storage of `a_addr` and, in VHDL's
        // case-insensitive namespace, the REG_A_ADDR constant of `a`.
        let mut b = SlaveBuilder::new("dma");
        b.add_register("a", 8, Direction::Both)
            .add_register("a_addr", 8, Direction::Both);
        let slave = b.build(&widths()).unwrap();
        assert!(matches!(
            generate(&slave, &widths()),
            Err(GenerationError::NameCollision { ref name, .. }) if name.eq_ignore_ascii_case("reg_a_addr")
        ));
    }

    #[test]
    fn declared_names_cover_ports_and_signals() {
        let spec = generate(&uart(), &widths()).unwrap();
        let names = spec.declared_names();
        for expected in ["clk_i", "irq_o", "status_ld_i", "ctrl_o", "we_data", "REG_CTRL_ADDR"] {
            assert!(names.iter().any(|n| n == expected), "{expected}");
        }
        assert!(!names.iter().any(|n| n == "wb_we_i"));
        assert!(first_duplicate(&names).is_none());
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate(&uart(), &widths()).unwrap();
        let b = generate(&uart(), &widths()).unwrap();
        assert_eq!(a, b);
    }
}
