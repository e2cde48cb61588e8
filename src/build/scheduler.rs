//! Incremental compilation scheduler.
//!
//! Every source of a project becomes a [`CompileUnit`]. A dedicated rayon
//! pool, sized to the work, drains the units; each worker checks staleness,
//! runs the compiler for stale units and reports the object path either way.

use super::staleness::needs_recompile;
use crate::toolchain::{Executor, Toolchain};
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One source file and the object it compiles to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    pub source: PathBuf,
    pub object: PathBuf,
}

impl CompileUnit {
    /// Object path is `<int_dir>/<source stem>.o`
    pub fn new(source: &Path, int_dir: &Path) -> Self {
        let object = int_dir.join(format!("{}.o", display_name(source)));
        Self {
            source: source.to_path_buf(),
            object,
        }
    }

    pub fn name(&self) -> String {
        display_name(&self.source)
    }
}

fn display_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Outcome of one compile phase
#[derive(Debug, Default)]
pub struct CompileReport {
    /// One object per unit, fresh or rebuilt
    pub objects: Vec<PathBuf>,
    /// Sources that were actually recompiled
    pub recompiled: Vec<PathBuf>,
    /// Sources whose compiler run printed diagnostics
    pub reported: Vec<PathBuf>,
}

impl CompileReport {
    pub fn merge(&mut self, other: CompileReport) {
        self.objects.extend(other.objects);
        self.recompiled.extend(other.recompiled);
        self.reported.extend(other.reported);
    }
}

/// Never more workers than units, never fewer than one, and one core left
/// for the rest of the system.
pub fn worker_count(parallelism: usize, pending: usize) -> usize {
    parallelism.saturating_sub(1).min(pending).max(1)
}

struct UnitResult {
    source: PathBuf,
    object: PathBuf,
    recompiled: bool,
    reported: bool,
}

/// Compile all stale units in parallel.
///
/// Compiler diagnostics never stop the phase: they are printed and the
/// object path is still returned, so every error in the project shows up in
/// one run and the link step decides whether the build failed.
pub fn compile_units(
    units: &[CompileUnit],
    toolchain: &Toolchain,
    exec: &dyn Executor,
    parallelism: usize,
) -> Result<CompileReport> {
    if units.is_empty() {
        return Ok(CompileReport::default());
    }

    let workers = worker_count(parallelism, units.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("sun-compile-{}", i))
        .build()
        .context("Failed to start compile workers")?;

    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    let pb = ProgressBar::new(units.len() as u64);
    pb.set_style(style);
    pb.set_message("Compiling...");

    // Serializes printed lines only; the unit list and results are owned by rayon
    let output_lock = Mutex::new(());
    let say = |text: String| {
        let _guard = output_lock.lock().unwrap_or_else(|e| e.into_inner());
        pb.suspend(|| print!("{}", text));
    };

    let results: Vec<UnitResult> = pool.install(|| {
        units
            .par_iter()
            .map(|unit| {
                let stale = needs_recompile(&unit.source, &unit.object);
                let mut reported = false;
                if stale {
                    let name = unit.name();
                    say(format!("   {} {}\n", "⚙".blue(), name));
                    pb.set_message(format!("Compiling {}", name));

                    let mut msg = toolchain
                        .make_object(exec, &unit.source, &unit.object)
                        .unwrap_or_else(|e| format!("{:#}", e));
                    if !msg.is_empty() {
                        if !msg.ends_with('\n') {
                            msg.push('\n');
                        }
                        reported = true;
                        say(msg);
                    }
                }
                pb.inc(1);
                UnitResult {
                    source: unit.source.clone(),
                    object: unit.object.clone(),
                    recompiled: stale,
                    reported,
                }
            })
            .collect()
    });
    pb.finish_and_clear();

    let mut report = CompileReport::default();
    for r in results {
        if r.recompiled {
            report.recompiled.push(r.source.clone());
        }
        if r.reported {
            report.reported.push(r.source);
        }
        report.objects.push(r.object);
    }
    Ok(report)
}
