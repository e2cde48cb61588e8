//! Process execution seam.
//!
//! The build engine never spawns processes directly; it goes through an
//! [`Executor`], which lets the whole pipeline run against a fake toolchain.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Runs one external program and returns its combined output.
///
/// Contract: the returned text is empty if and only if the program
/// succeeded without printing anything. `Err` means the program could not
/// be started at all.
pub trait Executor: Sync {
    fn execute(&self, program: &str, args: &[String]) -> Result<String>;
}

/// Executor backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, program: &str, args: &[String]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute '{}'", program))?;

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() && text.is_empty() {
            text = format!("{} exited with {}\n", program, output.status);
        }
        Ok(text)
    }
}

/// Run a built artifact with stdio inherited so its output streams live
pub fn run_artifact(path: &Path, args: &[String]) -> Result<ExitStatus> {
    Command::new(path)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run {}", path.display()))
}
