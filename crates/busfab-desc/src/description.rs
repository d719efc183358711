//! Description file data model.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use busfab_core::types::{BusWidths, SlaveDescriptor};
use busfab_core::{GeneratorConfig, WriteQualifier};

use crate::error::Result;

/// A complete fabric description (`fabric.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FabricDescription {
    pub fabric: FabricSection,
    pub bus: BusSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub slaves: Vec<SlaveDescriptor>,
}

/// `[fabric]`: naming and generation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FabricSection {
    pub name: String,
    #[serde(default)]
    pub write_qualifier: WriteQualifier,
    /// Generate register files concurrently.
    #[serde(default)]
    pub parallel: bool,
}

/// `[bus]`: raw bus widths.
///
/// Kept unchecked so that validation can report bad widths alongside every
/// other issue instead of failing at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BusSection {
    pub address_width: u32,
    pub data_width: u32,
    pub core_address_width: u32,
}

impl BusSection {
    pub fn widths(&self) -> busfab_core::Result<BusWidths> {
        BusWidths::new(self.address_width, self.data_width, self.core_address_width)
    }
}

/// `[output]`: where generated files go, relative to the description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputSection {
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("hdl"),
        }
    }
}

/// A slave loaded from a `cores/<name>.core.toml` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreFile {
    /// File stem without `.core.toml`.
    pub name: String,
    pub path: PathBuf,
    pub slave: SlaveDescriptor,
}

impl FabricDescription {
    /// Split into the generator configuration and the ordered slave list.
    pub fn into_parts(self) -> Result<(GeneratorConfig, Vec<SlaveDescriptor>)> {
        let widths = self.bus.widths()?;
        let config = GeneratorConfig::new(self.fabric.name, widths)
            .with_write_qualifier(self.fabric.write_qualifier)
            .with_parallel(self.fabric.parallel);
        Ok((config, self.slaves))
    }

    /// The generator configuration, without consuming the description.
    pub fn config(&self) -> Result<GeneratorConfig> {
        Ok(GeneratorConfig::new(self.fabric.name.clone(), self.bus.widths()?)
            .with_write_qualifier(self.fabric.write_qualifier)
            .with_parallel(self.fabric.parallel))
    }

    /// Append core-file slaves after the inline ones, in the given order.
    pub fn append_cores(&mut self, cores: Vec<CoreFile>) {
        self.slaves.extend(cores.into_iter().map(|c| c.slave));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DescError;
    use busfab_core::GenerationError;

    fn description(core_w: u32) -> FabricDescription {
        FabricDescription {
            fabric: FabricSection {
                name: "soc".into(),
                write_qualifier: WriteQualifier::WriteEnable,
                parallel: true,
            },
            bus: BusSection {
                address_width: 16,
                data_width: 32,
                core_address_width: core_w,
            },
            output: OutputSection::default(),
            slaves: vec![SlaveDescriptor::new("uart")],
        }
    }

    #[test]
    fn into_parts_carries_options() {
        let (config, slaves) = description(4).into_parts().unwrap();
        assert_eq!(config.name, "soc");
        assert_eq!(config.widths.register_address_width(), 12);
        assert_eq!(config.write_qualifier, WriteQualifier::WriteEnable);
        assert!(config.parallel);
        assert_eq!(slaves.len(), 1);
    }

    #[test]
    fn into_parts_rejects_bad_widths() {
        assert!(matches!(
            description(20).into_parts(),
            Err(DescError::Generation(GenerationError::InvalidBusWidths { .. }))
        ));
    }

    #[test]
    fn cores_follow_inline_slaves() {
        let mut desc = description(4);
        desc.append_cores(vec![CoreFile {
            name: "timer".into(),
            path: PathBuf::from("cores/timer.core.toml"),
            slave: SlaveDescriptor::new("timer"),
        }]);
        let ids: Vec<&str> = desc.slaves.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["uart", "timer"]);
    }

    #[test]
    fn output_dir_defaults_to_hdl() {
        assert_eq!(OutputSection::default().dir, PathBuf::from("hdl"));
    }
}
