//! `busfab init`: scaffold a fabric project.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use busfab_desc::generate_template;

use crate::project::DESCRIPTION_FILE;

/// Create `<name>/fabric.toml` relative to the working directory.
pub fn run(name: &str) -> Result<()> {
    create_project(Path::new(name), name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }
    // The fabric name doubles as an HDL identifier.
    let fabric_name = name.replace('-', "_");

    fs::create_dir_all(project_dir.join("cores")).context("creating cores/ directory")?;
    let content = generate_template(&fabric_name)?;
    fs::write(project_dir.join(DESCRIPTION_FILE), content)
        .with_context(|| format!("writing {DESCRIPTION_FILE}"))?;
    fs::write(project_dir.join(".gitignore"), "hdl/\n").context("writing .gitignore")?;

    println!("Created fabric '{fabric_name}'");
    println!("  {name}/{DESCRIPTION_FILE}");
    println!("  {name}/cores/");
    println!("  {name}/.gitignore");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use busfab_desc::{load_description, validate_description};

    #[test]
    fn init_creates_project_structure() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("my-soc");
        create_project(&project, "my-soc").unwrap();

        assert!(project.join(DESCRIPTION_FILE).is_file());
        assert!(project.join("cores").is_dir());
        assert!(project.join(".gitignore").is_file());
    }

    #[test]
    fn init_generates_valid_description() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("my-soc");
        create_project(&project, "my-soc").unwrap();

        let desc = load_description(&project.join(DESCRIPTION_FILE)).unwrap();
        assert_eq!(desc.fabric.name, "my_soc");
        assert!(validate_description(&desc).is_ok());
    }

    #[test]
    fn init_refuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("existing");
        fs::create_dir(&project).unwrap();
        let err = create_project(&project, "existing").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
