//! Build artifact cleanup.
//!
//! - `sun clean` - Remove the `int/` directory (every configuration)
//! - `sun clean --all` - Also remove the linked artifact and compile database

use super::compdb::COMPILE_COMMANDS;
use crate::config::Settings;
use crate::project::{INT_DIR, Project};
use anyhow::{Context, Result};
use colored::*;
use std::fs;

/// Returns whether anything was removed
pub fn clean(project: &Project, settings: &Settings, all: bool) -> Result<bool> {
    let mut cleaned = false;

    let int_dir = project.dir.join(INT_DIR);
    if int_dir.exists() {
        fs::remove_dir_all(&int_dir)
            .with_context(|| format!("Failed to remove {}", int_dir.display()))?;
        println!("{} Removed {}", "🗑️".red(), int_dir.display());
        cleaned = true;
    }

    if all {
        let output = project.output_file(&project.toolchain(settings));
        let compdb = project.dir.join(COMPILE_COMMANDS);
        for path in [output, compdb] {
            if path.is_file() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                println!("{} Removed {}", "🗑️".red(), path.display());
                cleaned = true;
            }
        }
    }

    if cleaned {
        println!("{} Clean complete.", "✓".green());
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(cleaned)
}
