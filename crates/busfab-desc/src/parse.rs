//! TOML parsing, serialization, validation, and discovery for fabric
//! descriptions.
//!
//! The description lives in `fabric.toml`; extra slaves may be dropped into
//! a `cores/` directory next to it as `<name>.core.toml` files, each holding
//! a single slave table.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use busfab_core::types::{validate_identifier, validate_slave_id, Direction, SlaveDescriptor};
use busfab_core::{GenerationError, SlaveBuilder, WriteQualifier};

use crate::description::{BusSection, CoreFile, FabricDescription, FabricSection, OutputSection};
use crate::error::{DescError, Result};

/// A validation issue found in a fabric description.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: "error",
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: "warning",
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }
}

/// Load a description from a `fabric.toml` file.
pub fn load_description(path: &Path) -> Result<FabricDescription> {
    if !path.exists() {
        return Err(DescError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_description(&content)
}

/// Parse a description from a TOML string.
pub fn parse_description(toml_str: &str) -> Result<FabricDescription> {
    let description: FabricDescription = toml::from_str(toml_str)?;
    Ok(description)
}

/// Serialize a description to pretty TOML.
pub fn description_to_toml(description: &FabricDescription) -> Result<String> {
    let toml_str = toml::to_string_pretty(description)?;
    Ok(toml_str)
}

/// Load a description together with the core files next to it.
///
/// Core-file slaves are appended after the inline slaves, in file-name order.
pub fn load_project(path: &Path) -> Result<FabricDescription> {
    let mut description = load_description(path)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let cores = discover_cores(dir)?;
    debug!(path = %path.display(), cores = cores.len(), "loaded fabric description");
    description.append_cores(cores);
    Ok(description)
}

/// Validate a description, collecting every issue.
///
/// Returns `Ok(())` if there are no issues at all, or `Err(issues)` with
/// errors and warnings. Warnings alone do not stop generation; callers
/// decide with [`ValidationIssue::is_error`].
pub fn validate_description(
    description: &FabricDescription,
) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let slaves = &description.slaves;

    // 1. Fabric name is an HDL identifier
    if let Err(e) = validate_identifier(&description.fabric.name) {
        issues.push(ValidationIssue::error(format!("fabric name: {e}")));
    }

    // 2. Bus widths
    let widths = match description.bus.widths() {
        Ok(w) => Some(w),
        Err(e) => {
            issues.push(ValidationIssue::error(e.to_string()));
            None
        }
    };

    // 3. Per-slave invariants
    for slave in slaves {
        let result = match &widths {
            Some(w) => slave.validate(w),
            None => validate_slave_id(slave.id.as_str()),
        };
        if let Err(e) = result {
            issues.push(ValidationIssue::error(e.to_string()));
        }
    }

    // 4. Slave ids are unique
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for slave in slaves {
        if !seen.insert(slave.id.hdl_name()) {
            issues.push(ValidationIssue::error(
                GenerationError::DuplicateSlaveId {
                    id: slave.id.to_string(),
                }
                .to_string(),
            ));
        }
    }

    if let Some(w) = &widths {
        // 5. Slaves fit in the core address space
        let capacity = w.slave_capacity();
        if slaves.len() as u64 > capacity {
            issues.push(ValidationIssue::error(
                GenerationError::AddressSpaceExhausted {
                    slaves: slaves.len(),
                    capacity,
                }
                .to_string(),
            ));
        }

        // 6. Pinned base addresses are in range and distinct
        let mut pinned: BTreeMap<u64, &str> = BTreeMap::new();
        for slave in slaves {
            let Some(base) = slave.base_address else {
                continue;
            };
            let error = if base >= capacity {
                GenerationError::BaseAddressOutOfRange {
                    slave: slave.id.to_string(),
                    base,
                    capacity,
                }
            } else if let Some(first) = pinned.insert(base, slave.id.as_str()) {
                GenerationError::BaseAddressConflict {
                    first: first.to_string(),
                    second: slave.id.to_string(),
                    base,
                }
            } else {
                continue;
            };
            issues.push(ValidationIssue::error(error.to_string()));
        }
    }

    // 7. Warnings
    if slaves.is_empty() {
        issues.push(ValidationIssue::warning("fabric has no slaves"));
    } else if !slaves.iter().any(|s| s.has_interrupt) {
        issues.push(ValidationIssue::warning(
            "no slave is interrupt-capable; irq_o is tied low",
        ));
    }
    for slave in slaves.iter().filter(|s| s.registers.is_empty()) {
        issues.push(ValidationIssue::warning(format!(
            "slave '{}' has an empty register file",
            slave.id
        )));
    }

    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("{}", issue.message);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Generate a template `fabric.toml` for a new fabric.
///
/// Seeds a two-slave fabric: an interrupt-capable uart and a gpio block.
pub fn generate_template(name: &str) -> Result<String> {
    let bus = BusSection {
        address_width: 16,
        data_width: 32,
        core_address_width: 4,
    };
    let widths = bus.widths()?;

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

    let description = FabricDescription {
        fabric: FabricSection {
            name: name.into(),
            write_qualifier: WriteQualifier::StrobeOnly,
            parallel: false,
        },
        bus,
        output: OutputSection::default(),
        slaves: vec![uart.build(&widths)?, gpio.build(&widths)?],
    };
    Ok(format!(
        "# busfab fabric description\n\n{}",
        description_to_toml(&description)?
    ))
}

/// Load a single-slave core file.
pub fn load_core(path: &Path) -> Result<SlaveDescriptor> {
    if !path.exists() {
        return Err(DescError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let slave: SlaveDescriptor = toml::from_str(&content)?;
    Ok(slave)
}

/// Discover and load all `.core.toml` files in a project's `cores/`
/// directory, sorted by name.
pub fn discover_cores(project_dir: &Path) -> Result<Vec<CoreFile>> {
    let cores_dir = project_dir.join("cores");
    if !cores_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut found: Vec<(String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(&cores_dir)? {
        let path = entry?.path();
        if let Some(name) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(".core.toml"))
        {
            found.push((name.to_string(), path.clone()));
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));

    found
        .into_iter()
        .map(|(name, path)| {
            let slave = load_core(&path)?;
            debug!(core = %name, slave = %slave.id, "discovered core file");
            Ok(CoreFile { name, path, slave })
        })
        .collect()
}
