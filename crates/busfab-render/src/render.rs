//! Renderer trait, output formats, and writing rendered files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use busfab_core::RenderUnit;

use crate::error::{RenderError, Result};
use crate::json::JsonRenderer;
use crate::template::TemplateRenderer;

/// The kind of file a renderer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Vhdl,
    Json,
}

impl OutputFormat {
    /// Parse an output format from a string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "vhdl" | "vhd" => Ok(OutputFormat::Vhdl),
            "json" => Ok(OutputFormat::Json),
            _ => Err(RenderError::UnknownFormat {
                name: s.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Vhdl => "vhdl",
            OutputFormat::Json => "json",
        }
    }
}

/// One rendered unit, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Name of the unit this file came from.
    pub unit: String,
    pub file_name: String,
    pub contents: String,
}

impl RenderedFile {
    /// Write the file into `dir`, returning its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = self.contents.len(), "wrote unit");
        Ok(path)
    }
}

/// Turns a render unit into a file.
pub trait Renderer {
    /// Render one unit.
    fn render(&self, unit: &RenderUnit) -> Result<RenderedFile>;

    /// The format this renderer produces.
    fn format(&self) -> OutputFormat;
}

/// A renderer for `format`, with VHDL templates optionally taken from
/// `template_dir`.
pub fn renderer_for(format: OutputFormat, template_dir: Option<&Path>) -> Result<Box<dyn Renderer>> {
    Ok(match format {
        OutputFormat::Vhdl => match template_dir {
            Some(dir) => Box::new(TemplateRenderer::from_dir(dir)?),
            None => Box::new(TemplateRenderer::builtin()?),
        },
        OutputFormat::Json => Box::new(JsonRenderer),
    })
}

/// Render every unit and write it into `dir`, creating the directory.
///
/// All units are rendered before anything is written, so a rendering
/// failure leaves `dir` untouched.
pub fn write_files(renderer: &dyn Renderer, units: &[RenderUnit], dir: &Path) -> Result<Vec<PathBuf>> {
    let files = units
        .iter()
        .map(|u| renderer.render(u))
        .collect::<Result<Vec<_>>>()?;
    fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let paths = files
        .iter()
        .map(|f| f.write_to(dir))
        .collect::<Result<Vec<_>>>()?;
    info!(
        dir = %dir.display(),
        files = paths.len(),
        format = renderer.format().name(),
        "rendered units"
    );
    Ok(paths)
}
