//! Doctor command handler
//!
//! Handles `sun doctor`.

use anyhow::Result;
use colored::*;
use std::process::Command;

use crate::config::Settings;

/// Whether `program --version` can be spawned at all
pub fn tool_available(program: &str) -> bool {
    Command::new(program).arg("--version").output().is_ok()
}

/// Run the `sun doctor` command to diagnose missing tools
pub fn run_doctor(settings: &Settings) -> Result<()> {
    println!("{} Running System Doctor...", "🚑".red());
    println!("-------------------------------");

    println!(
        "Checking OS... {} ({})",
        settings.platform.name().green(),
        std::env::consts::ARCH.cyan()
    );

    print!("Checking compiler '{}'... ", settings.default_compiler);
    if tool_available(&settings.default_compiler) {
        println!("{}", "Found".green());
    } else {
        println!("{}", "Not Found (Install LLVM/Clang)".red());
    }

    print!("Checking archiver '{}'... ", settings.archiver);
    if tool_available(&settings.archiver) {
        println!("{}", "Found".green());
    } else {
        println!("{}", "Not Found (static libraries will fail)".red());
    }

    if !settings.platform.is_windows() {
        print!("Checking lld... ");
        if tool_available("ld.lld") {
            println!("{}", "Found".green());
        } else {
            println!("{}", "Not Found (Install lld)".red());
        }
    }

    println!("Using {} parallel compile jobs", settings.parallelism());
    Ok(())
}
