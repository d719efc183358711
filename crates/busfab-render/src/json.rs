//! JSON dump of token maps.

use busfab_core::RenderUnit;

use crate::error::Result;
use crate::render::{OutputFormat, RenderedFile, Renderer};

/// Emits each unit's name, kind and token map as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, unit: &RenderUnit) -> Result<RenderedFile> {
        let mut contents = serde_json::to_string_pretty(unit)?;
        contents.push('\n');
        Ok(RenderedFile {
            unit: unit.name.clone(),
            file_name: format!("{}.tokens.json", unit.name),
            contents,
        })
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}
