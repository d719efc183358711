//! CLI command implementations.

pub mod check;
pub mod clean;
pub mod generate;
pub mod init;
pub mod inspect;
pub mod plan;

use anyhow::{bail, Result};

use busfab_core::types::SlaveDescriptor;
use busfab_core::GeneratorConfig;
use busfab_desc::validate_description;
use busfab_fabric::{run, GenerationOutput};

use crate::project::Project;

/// Validate the project and split it into configuration and slaves.
///
/// Errors are printed one per line before bailing; warnings are left to the
/// log.
pub(crate) fn prepare(project: &Project) -> Result<(GeneratorConfig, Vec<SlaveDescriptor>)> {
    if let Err(issues) = validate_description(&project.description) {
        let errors: Vec<_> = issues.iter().filter(|i| i.is_error()).collect();
        if !errors.is_empty() {
            for issue in &errors {
                eprintln!("error: {}", issue.message);
            }
            bail!(
                "{} is invalid: {} error(s)",
                project.path.display(),
                errors.len()
            );
        }
    }
    Ok(project.description.clone().into_parts()?)
}

/// Validate and run the whole generation pipeline.
pub(crate) fn generate_output(project: &Project) -> Result<GenerationOutput> {
    let (config, slaves) = prepare(project)?;
    Ok(run(&slaves, &config)?)
}

/// Reject anything but `text` or `json`.
pub(crate) fn text_or_json(format: Option<&str>) -> Result<bool> {
    match format {
        None | Some("text") => Ok(false),
        Some("json") => Ok(true),
        Some(other) => bail!("unknown format: '{other}'. Choose: text, json"),
    }
}
