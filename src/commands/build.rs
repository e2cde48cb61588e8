//! Build and run command handlers
//!
//! Handles `sun`, `sun build` and `sun run`.

use anyhow::Result;
use colored::*;
use std::path::Path;
use std::time::Instant;

use crate::build::{BuildOutcome, Builder};
use crate::config::Settings;
use crate::error::SunError;
use crate::project::LinkKind;
use crate::toolchain::{self, Executor};

/// Build the project in `dir` and everything it requires
pub fn build(
    dir: &Path,
    name: Option<&str>,
    settings: &Settings,
    exec: &dyn Executor,
) -> Result<BuildOutcome> {
    let start_time = Instant::now();
    let mut builder = Builder::new(settings, exec);
    let project = builder.load(dir, name)?;

    let kind = match project.link_kind {
        LinkKind::Executable => "executable",
        LinkKind::StaticLibrary => "static library",
        LinkKind::DynamicLibrary => "dynamic library",
    };
    println!("{} Project: {} ({})", "🚀".blue(), project.name().bold(), kind);

    let outcome = builder.build(&project)?;

    let report = &outcome.report;
    if report.recompiled.is_empty() {
        println!("{} Up to date, nothing recompiled", "⚡".green());
    } else {
        println!(
            "   Compiled {} of {} files",
            report.recompiled.len(),
            report.objects.len()
        );
    }
    println!(
        "{} Built {} in {:.2?}",
        "✓".green(),
        outcome.output.display(),
        start_time.elapsed()
    );
    Ok(outcome)
}

/// Build, then run the executable with `args`, streaming its output
pub fn build_and_run(
    dir: &Path,
    name: Option<&str>,
    args: &[String],
    settings: &Settings,
    exec: &dyn Executor,
) -> Result<()> {
    let outcome = build(dir, name, settings, exec)?;
    if outcome.link_kind.is_library() {
        return Err(SunError::BadArgument(format!(
            "{} is a library and cannot be run",
            outcome.output.display()
        ))
        .into());
    }

    println!("{} Running...", ">>>".cyan());
    let status = toolchain::run_artifact(&outcome.output, args)?;
    if !status.success() {
        println!("{} Program exited with {}", "!".yellow(), status);
    }
    Ok(())
}
