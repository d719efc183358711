//! Bus parameters and the descriptors a generation run consumes.
//!
//! All values here are immutable once constructed. A run builds them from
//! the input description, threads them through planning and generation, and
//! drops them after the token maps are produced.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Widest supported bus address.
pub const MAX_ADDRESS_WIDTH: u32 = 32;

/// Widest supported data bus (and register).
pub const MAX_DATA_WIDTH: u32 = 64;

/// Register names whose derived port names would collide with the bus ports
/// of the generated register file.
const RESERVED_REGISTER_NAMES: &[&str] = &[
    "clk", "rst", "irq", "wb_adr", "wb_dat", "wb_stb", "wb_we", "wb_ack",
];

/// Slave ids whose per-slave fabric ports would collide with the master
/// ports of the interconnect (`wbm_dat_i`).
const RESERVED_SLAVE_IDS: &[&str] = &["wbm"];

/// Mask covering the low `width` bits.
pub fn low_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Number of bits needed to represent `count` distinct values (at least 1).
pub fn bits_for(count: u64) -> u32 {
    if count <= 2 {
        1
    } else {
        64 - (count - 1).leading_zeros()
    }
}

// ---------------------------------------------------------------------------
// Bus widths
// ---------------------------------------------------------------------------

/// Global bus parameters.
///
/// The master address splits into a core-select field (upper
/// `core_address_width` bits) and a register field (lower
/// `register_address_width` bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawBusWidths")]
pub struct BusWidths {
    address_width: u32,
    data_width: u32,
    core_address_width: u32,
    register_address_width: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawBusWidths {
    address_width: u32,
    data_width: u32,
    core_address_width: u32,
    #[serde(default)]
    register_address_width: Option<u32>,
}

impl TryFrom<RawBusWidths> for BusWidths {
    type Error = GenerationError;

    fn try_from(raw: RawBusWidths) -> Result<Self> {
        let widths = BusWidths::new(raw.address_width, raw.data_width, raw.core_address_width)?;
        if let Some(reg) = raw.register_address_width {
            if reg != widths.register_address_width {
                return Err(GenerationError::InvalidBusWidths {
                    detail: format!(
                        "register-address-width {reg} does not equal address-width {} minus core-address-width {}",
                        raw.address_width, raw.core_address_width
                    ),
                });
            }
        }
        Ok(widths)
    }
}

impl BusWidths {
    /// Build bus widths, deriving the register field as
    /// `address_width - core_address_width`. The register field must keep at
    /// least one bit.
    pub fn new(address_width: u32, data_width: u32, core_address_width: u32) -> Result<Self> {
        if address_width == 0 || address_width > MAX_ADDRESS_WIDTH {
            return Err(GenerationError::InvalidBusWidths {
                detail: format!("address width {address_width} not in 1..={MAX_ADDRESS_WIDTH}"),
            });
        }
        if data_width == 0 || data_width > MAX_DATA_WIDTH {
            return Err(GenerationError::InvalidBusWidths {
                detail: format!("data width {data_width} not in 1..={MAX_DATA_WIDTH}"),
            });
        }
        if core_address_width >= address_width {
            return Err(GenerationError::InvalidBusWidths {
                detail: format!(
                    "core address width {core_address_width} leaves no register address bits in address width {address_width}"
                ),
            });
        }
        Ok(Self {
            address_width,
            data_width,
            core_address_width,
            register_address_width: address_width - core_address_width,
        })
    }

    pub fn address_width(&self) -> u32 {
        self.address_width
    }

    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    pub fn core_address_width(&self) -> u32 {
        self.core_address_width
    }

    pub fn register_address_width(&self) -> u32 {
        self.register_address_width
    }

    /// Number of slaves the core-select field can enumerate.
    pub fn slave_capacity(&self) -> u64 {
        1u64 << self.core_address_width
    }

    /// Number of register addresses within one slave.
    pub fn register_capacity(&self) -> u64 {
        1u64 << self.register_address_width
    }

    /// Largest valid register offset.
    pub fn max_register_offset(&self) -> u64 {
        self.register_capacity() - 1
    }

    /// Split a master address into `(core_address, register_address)`.
    pub fn split_address(&self, address: u64) -> (u64, u64) {
        let address = address & low_mask(self.address_width);
        (
            address >> self.register_address_width,
            address & low_mask(self.register_address_width),
        )
    }

    /// Join a core address and register address into a master address.
    pub fn join_address(&self, core: u64, register: u64) -> u64 {
        ((core & low_mask(self.core_address_width)) << self.register_address_width)
            | (register & low_mask(self.register_address_width))
    }
}

impl fmt::Display for BusWidths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "addr {} = core {} + reg {}, data {}",
            self.address_width,
            self.core_address_width,
            self.register_address_width,
            self.data_width
        )
    }
}

// ---------------------------------------------------------------------------
// Bit vectors
// ---------------------------------------------------------------------------

/// A fixed-width bit vector (at most 64 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitVector {
    width: u32,
    value: u64,
}

impl BitVector {
    /// Create a bit vector, or `None` if the width is out of range or the
    /// value does not fit.
    pub fn new(width: u32, value: u64) -> Option<Self> {
        if width == 0 || width > 64 || value & !low_mask(width) != 0 {
            return None;
        }
        Some(Self { width, value })
    }

    /// Truncate `value` to `width` bits.
    pub fn truncate(width: u32, value: u64) -> Self {
        let width = width.clamp(1, 64);
        Self {
            width,
            value: value & low_mask(width),
        }
    }

    /// The all-zero vector of the given width.
    pub fn zero(width: u32) -> Self {
        Self::truncate(width, 0)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'h{:x}", self.width, self.value)
    }
}

// ---------------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------------

/// Which side of the bus may access a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Written by the host, driven out to the peripheral.
    HostWrite,
    /// Loaded by the peripheral, read by the host.
    HostRead,
    /// Written and read back by the host.
    Both,
}

impl Direction {
    /// Whether the host may write this register over the bus.
    pub fn host_writable(&self) -> bool {
        matches!(self, Direction::HostWrite | Direction::Both)
    }

    /// Whether the host may read this register over the bus.
    pub fn host_readable(&self) -> bool {
        matches!(self, Direction::HostRead | Direction::Both)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::HostWrite => "host-write",
            Direction::HostRead => "host-read",
            Direction::Both => "both",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One addressable register of a slave.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegisterDescriptor {
    /// Register name, unique within its slave.
    pub name: String,
    /// Register offset within the slave, 0-based.
    pub offset: u64,
    /// Width in bits (1..=data width).
    pub width_bits: u32,
    /// Access direction.
    pub direction: Direction,
    /// Value forced on reset.
    #[serde(default)]
    pub reset_value: u64,
}

impl RegisterDescriptor {
    pub fn new(name: impl Into<String>, offset: u64, width_bits: u32, direction: Direction) -> Self {
        Self {
            name: name.into(),
            offset,
            width_bits,
            direction,
            reset_value: 0,
        }
    }

    pub fn with_reset(mut self, reset_value: u64) -> Self {
        self.reset_value = reset_value;
        self
    }

    /// Reset value as a bit vector of the register's width.
    pub fn reset_vector(&self) -> BitVector {
        BitVector::truncate(self.width_bits, self.reset_value)
    }
}

// ---------------------------------------------------------------------------
// Slaves
// ---------------------------------------------------------------------------

/// A globally unique slave identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlaveId(String);

impl SlaveId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form used in emitted HDL.
    pub fn hdl_name(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for SlaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlaveId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A register-mapped slave peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlaveDescriptor {
    pub id: SlaveId,
    /// Registers in declaration order.
    #[serde(default)]
    pub registers: Vec<RegisterDescriptor>,
    /// Whether the slave drives an interrupt line.
    #[serde(default, rename = "interrupt")]
    pub has_interrupt: bool,
    /// Optional pinned core address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_address: Option<u64>,
}

impl SlaveDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: SlaveId::new(id),
            registers: Vec::new(),
            has_interrupt: false,
            base_address: None,
        }
    }

    /// The register at the highest offset, if the slave has any registers.
    pub fn highest_register(&self) -> Option<&RegisterDescriptor> {
        self.registers.iter().max_by_key(|r| r.offset)
    }

    /// Look up a register by name (case-insensitive).
    pub fn register(&self, name: &str) -> Option<&RegisterDescriptor> {
        self.registers
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Fail with `RegisterAddressOverflow` if any offset falls outside the
    /// register field.
    pub fn check_register_span(&self, widths: &BusWidths) -> Result<()> {
        let max = widths.max_register_offset();
        for reg in &self.registers {
            if reg.offset > max {
                return Err(GenerationError::RegisterAddressOverflow {
                    slave: self.id.to_string(),
                    register: reg.name.clone(),
                    offset: reg.offset,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check every per-slave invariant: identifiers, register widths and
    /// reset values, the register address span, and name/offset uniqueness.
    pub fn validate(&self, widths: &BusWidths) -> Result<()> {
        validate_slave_id(self.id.as_str())?;

        let mut names: BTreeMap<String, &str> = BTreeMap::new();
        let mut offsets: BTreeMap<u64, &str> = BTreeMap::new();
        for reg in &self.registers {
            validate_identifier(&reg.name)?;
            let lower = reg.name.to_ascii_lowercase();
            if RESERVED_REGISTER_NAMES.contains(&lower.as_str()) {
                return Err(GenerationError::InvalidIdentifier {
                    name: reg.name.clone(),
                    reason: "collides with a bus port of the register file".into(),
                });
            }
            if names.insert(lower, &reg.name).is_some() {
                return Err(GenerationError::DuplicateRegisterName {
                    slave: self.id.to_string(),
                    name: reg.name.clone(),
                });
            }
            if reg.width_bits == 0 || reg.width_bits > widths.data_width() {
                return Err(GenerationError::RegisterWidthOutOfRange {
                    slave: self.id.to_string(),
                    register: reg.name.clone(),
                    width: reg.width_bits,
                    data_width: widths.data_width(),
                });
            }
            if BitVector::new(reg.width_bits, reg.reset_value).is_none() {
                return Err(GenerationError::ResetValueTooWide {
                    slave: self.id.to_string(),
                    register: reg.name.clone(),
                    value: reg.reset_value,
                    width: reg.width_bits,
                });
            }
            if let Some(first) = offsets.insert(reg.offset, &reg.name) {
                return Err(GenerationError::DuplicateRegisterOffset {
                    slave: self.id.to_string(),
                    offset: reg.offset,
                    first: first.to_string(),
                    second: reg.name.clone(),
                });
            }
        }
        self.check_register_span(widths)
    }
}

/// Check that `id` is an identifier whose fabric ports stay clear of the
/// master ports.
pub fn validate_slave_id(id: &str) -> Result<()> {
    validate_identifier(id)?;
    if RESERVED_SLAVE_IDS.contains(&id.to_ascii_lowercase().as_str()) {
        return Err(GenerationError::InvalidIdentifier {
            name: id.to_string(),
            reason: "collides with the master ports of the interconnect".into(),
        });
    }
    Ok(())
}

/// Check that `name` is usable as an HDL identifier stem.
///
/// ASCII letter first, then letters, digits, or single underscores; no
/// trailing underscore.
pub fn validate_identifier(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(GenerationError::InvalidIdentifier {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };
    let mut chars = name.chars();
    match chars.next() {
        None => return invalid("empty"),
        Some(c) if !c.is_ascii_alphabetic() => return invalid("must start with a letter"),
        _ => {}
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return invalid("only letters, digits, and underscores are allowed");
    }
    if name.contains("__") {
        return invalid("doubled underscore");
    }
    if name.ends_with('_') {
        return invalid("trailing underscore");
    }
    Ok(())
}
