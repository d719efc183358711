//! `busfab check`: validate a description and the logic generated from it.

use anyhow::{bail, Result};

use busfab_sim::{check_output, Diagnostic, Severity};

use super::generate_output;
use crate::project::Project;

/// Validate, generate in memory, and run the structural checks.
pub fn run(project: &Project) -> Result<()> {
    let output = generate_output(project)?;
    let diagnostics = check_output(&output);

    for d in &diagnostics {
        println!("{}", format_diagnostic(d));
    }

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        bail!("check failed: {errors} structural error(s)");
    }
    println!(
        "{}: {} slaves, {} units, {} warning(s)",
        output.report.name,
        output.fabric.slaves.len(),
        output.units.len(),
        diagnostics.len()
    );
    Ok(())
}

fn format_diagnostic(d: &Diagnostic) -> String {
    let severity = match d.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    let mut line = match &d.unit {
        Some(unit) => format!("{severity}: [{unit}] {}", d.message),
        None => format!("{severity}: {}", d.message),
    };
    if let Some(s) = &d.suggestion {
        line.push_str(&format!("\n  help: {s}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::template_project;

    #[test]
    fn template_passes() {
        let dir = tempfile::tempdir().unwrap();
        run(&template_project(dir.path())).unwrap();
    }

    #[test]
    fn duplicate_ids_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = template_project(dir.path());
        let copy = project.description.slaves[0].clone();
        project.description.slaves.push(copy);
        assert!(run(&project).is_err());
    }

    #[test]
    fn diagnostic_formatting() {
        let d = Diagnostic {
            severity: Severity::Warning,
            message: "no registers".into(),
            unit: Some("idle_regs".into()),
            suggestion: Some("add one".into()),
        };
        assert_eq!(format_diagnostic(&d), "warning: [idle_regs] no registers\n  help: add one");
    }
}
