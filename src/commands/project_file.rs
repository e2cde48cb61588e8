//! Project file command handlers
//!
//! Handles `sun create` and `sun set`.

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::error::SunError;
use crate::project;

/// Create a project file compiling every `.cpp` in `dir`
pub fn create(dir: &Path, name: Option<&str>, kind: Option<&str>) -> Result<()> {
    let path = project::create_project_file(dir, name, kind)?;
    println!("{} Created {}", "✓".green(), path.display());
    println!("   Run 'sun' to build your project.");
    Ok(())
}

/// Turn `set` arguments into the directive to append
pub fn setting_line(setting: &[String]) -> Result<String> {
    match setting {
        [kind] if kind == "static" || kind == "dynamic" || kind == "shared" => Ok(kind.clone()),
        [key, value] if key == "name" => Ok(format!("name {}", value)),
        [] => Err(SunError::BadArgument("Set what?".to_string()).into()),
        _ => Err(SunError::BadArgument(format!(
            "Unknown setting \"{}\", expected static, dynamic, shared or name <value>",
            setting.join(" ")
        ))
        .into()),
    }
}

/// Append a configuration line to an existing project file
pub fn set(dir: &Path, name: Option<&str>, setting: &[String]) -> Result<()> {
    let line = setting_line(setting)?;
    let path = project::append_directive(dir, name, &line)?;
    println!("{} Added '{}' to {}", "✓".green(), line, path.display());
    Ok(())
}
