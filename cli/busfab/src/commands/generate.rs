//! `busfab generate`: render every unit into the output directory.

use std::path::Path;

use anyhow::{Context, Result};

use busfab_render::{renderer_for, write_files, OutputFormat};

use super::generate_output;
use crate::project::Project;

/// Generate and write one file per unit into `out_dir`.
pub fn run(
    project: &Project,
    out_dir: &Path,
    emit: Option<&str>,
    template_dir: Option<&Path>,
) -> Result<()> {
    let format = OutputFormat::parse(emit.unwrap_or("vhdl"))?;
    let renderer = renderer_for(format, template_dir).with_context(|| match template_dir {
        Some(dir) => format!("loading templates from {}", dir.display()),
        None => "loading built-in templates".to_string(),
    })?;

    let output = generate_output(project)?;
    let paths = write_files(renderer.as_ref(), &output.units, out_dir)
        .with_context(|| format!("writing {}", out_dir.display()))?;

    print!("{}", output.report);
    println!();
    for path in &paths {
        println!("  wrote {}", path.display());
    }
    Ok(())
}
