//! `compile_commands.json` for editors and clangd.

use super::scheduler::CompileUnit;
use crate::toolchain::Toolchain;
use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

pub const COMPILE_COMMANDS: &str = "compile_commands.json";

pub fn compile_commands(dir: &Path, units: &[CompileUnit], toolchain: &Toolchain) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = units
        .iter()
        .map(|unit| {
            let mut arguments = vec![toolchain.program.clone()];
            arguments.extend(toolchain.compile_args(&unit.source, &unit.object));
            json!({
                "directory": dir.to_string_lossy(),
                "arguments": arguments,
                "file": unit.source.to_string_lossy(),
                "output": unit.object.to_string_lossy(),
            })
        })
        .collect();
    serde_json::Value::Array(entries)
}

pub fn write_compile_commands(
    dir: &Path,
    units: &[CompileUnit],
    toolchain: &Toolchain,
) -> Result<PathBuf> {
    let path = dir.join(COMPILE_COMMANDS);
    let json_str = serde_json::to_string_pretty(&compile_commands(dir, units, toolchain))?;
    fs::write(&path, json_str)?;
    Ok(path)
}
