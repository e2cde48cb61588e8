use super::core::Builder;
use crate::config::Settings;
use crate::project::{INT_DIR, normalize};
use crate::toolchain::Executor;
use anyhow::{Context, Result};
use colored::*;
use notify::{Config, Event, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Rebuild the project in `dir` whenever something in it changes
pub fn watch(dir: &Path, name: Option<&str>, settings: &Settings, exec: &dyn Executor) -> Result<()> {
    // events carry absolute paths, so everything is compared against this
    let dir = &watch_root(dir)?;
    println!("{} Watching for changes in {}...", "👀".cyan(), dir.display());

    let (tx, rx) = channel();
    let config_notify = Config::default().with_poll_interval(Duration::from_secs(1));
    let mut watcher = notify::RecommendedWatcher::new(tx, config_notify)?;
    watcher.watch(dir, RecursiveMode::Recursive)?;

    // First run
    let mut ignored = rebuild(dir, name, settings, exec);

    while let Ok(event) = rx.recv() {
        let mut relevant = is_relevant(&event, dir, &ignored);
        // Debounce simple
        std::thread::sleep(Duration::from_millis(100));
        while let Ok(event) = rx.try_recv() {
            relevant |= is_relevant(&event, dir, &ignored);
        }
        if relevant {
            ignored = rebuild(dir, name, settings, exec);
        }
    }
    Ok(())
}

/// Build once and return the files the build itself writes
fn rebuild(dir: &Path, name: Option<&str>, settings: &Settings, exec: &dyn Executor) -> Vec<PathBuf> {
    print!("\x1B[2J\x1B[1;1H");
    println!("{} Rebuilding...", "🔄".yellow());

    let mut builder = Builder::new(settings, exec);
    let project = match builder.load(dir, name) {
        Ok(project) => project,
        Err(e) => {
            println!("{} Error: {:#}", "x".red(), e);
            return Vec::new();
        }
    };
    let output = project.output_file(&project.toolchain(settings));
    match builder.build(&project) {
        Ok(outcome) => println!("{} Built {}", "✓".green(), outcome.output.display()),
        Err(e) => println!("{} Error: {:#}", "x".red(), e),
    }
    vec![output, dir.join(super::compdb::COMPILE_COMMANDS)]
}

fn watch_root(dir: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(dir)
        .with_context(|| format!("Failed to resolve {}", dir.display()))?;
    Ok(normalize(&abs))
}

/// `dir` must come from [`watch_root`]
fn is_relevant(event: &notify::Result<Event>, dir: &Path, ignored: &[PathBuf]) -> bool {
    let Ok(event) = event else {
        return false;
    };
    let int_dir = dir.join(INT_DIR);
    event.paths.iter().map(|p| normalize(p)).any(|p| {
        !p.starts_with(&int_dir) && !ignored.contains(&p)
    })
}
