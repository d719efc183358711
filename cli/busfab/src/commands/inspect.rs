//! `busfab inspect`: print the token map of one unit.

use anyhow::{anyhow, Result};

use super::{generate_output, text_or_json};
use crate::project::Project;

pub fn run(project: &Project, unit: &str, format: Option<&str>) -> Result<()> {
    let json = text_or_json(format)?;
    let output = generate_output(project)?;
    let found = output.unit(unit).ok_or_else(|| {
        let names: Vec<&str> = output.units.iter().map(|u| u.name.as_str()).collect();
        anyhow!("unknown unit: '{unit}'. Available: {}", names.join(", "))
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(found)?);
        return Ok(());
    }

    println!("=== {} ({} tokens) ===", found.name, found.tokens.len());
    for (token, text) in found.tokens.iter() {
        println!("--- {token} ---");
        if text.is_empty() {
            println!("  (empty)");
        } else {
            println!("{text}");
        }
    }
    Ok(())
}
