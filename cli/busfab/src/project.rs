//! Locating and loading `fabric.toml`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use busfab_desc::{load_project, FabricDescription};

/// File name searched for when no `--input` is given.
pub const DESCRIPTION_FILE: &str = "fabric.toml";

/// A loaded description, core files included.
#[derive(Debug, Clone)]
pub struct Project {
    pub description: FabricDescription,
    /// Path of the description file.
    pub path: PathBuf,
    /// Directory holding the description; relative paths resolve against it.
    pub dir: PathBuf,
}

impl Project {
    /// Search upward from `start_dir` for `fabric.toml` and load it.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<Self>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(DESCRIPTION_FILE);
            if candidate.is_file() {
                return Self::load(&candidate).map(Some);
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Load the description at `path` and the cores next to it.
    pub fn load(path: &Path) -> Result<Self> {
        let description =
            load_project(path).with_context(|| format!("loading {}", path.display()))?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            description,
            path: path.to_path_buf(),
            dir,
        })
    }

    /// `--input` if given, otherwise the nearest `fabric.toml` above `cwd`.
    pub fn resolve(cwd: &Path, input: Option<&str>) -> Result<Self> {
        if let Some(input) = input {
            return Self::load(&cwd.join(input));
        }
        match Self::find_and_load(cwd)? {
            Some(project) => Ok(project),
            None => bail!("no {DESCRIPTION_FILE} found (run `busfab init` first)"),
        }
    }

    /// Output directory: `override_dir` relative to `cwd`, else the
    /// description's `[output] dir` relative to the description.
    pub fn output_dir(&self, cwd: &Path, override_dir: Option<&str>) -> PathBuf {
        match override_dir {
            Some(dir) => cwd.join(dir),
            None => self.dir.join(&self.description.output.dir),
        }
    }
}
