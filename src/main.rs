//! # sun CLI Entry Point
//!
//! This is the main executable for the `sun` command-line tool.
//! It parses CLI arguments using clap and routes commands to the appropriate handlers.
//!
//! Running `sun` with no subcommand builds the project in the current directory.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::Path;

use sun::build;
use sun::commands;
use sun::config::Settings;
use sun::error::{ExitStatus, SunError};
use sun::project::Project;
use sun::toolchain::SystemExecutor;

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
    fn SetConsoleCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
        SetConsoleCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Parser)]
#[command(name = "sun")]
#[command(about = "A minimal C++ build tool", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project name, selects `<name>.sun` instead of `.sun`
    #[arg(short, long, global = true)]
    project: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project and its dependencies (default)
    Build,
    /// Build and run the executable
    Run {
        /// Arguments passed to the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Create a project file compiling every .cpp in this directory
    Create {
        /// static, dynamic or shared
        kind: Option<String>,
    },
    /// Append a setting to the project file (static, dynamic, shared, name <value>)
    Set {
        #[arg(required = true, num_args = 1..=2)]
        setting: Vec<String>,
    },
    /// Remove intermediate objects
    Clean {
        /// Also remove the linked artifact and compile_commands.json
        #[arg(long)]
        all: bool,
    },
    /// Rebuild whenever a file in the project changes
    Watch,
    /// Check that the compiler, archiver and linker are installed
    Doctor,
    /// Generate shell completions
    Completion { shell: Shell },
}

fn main() {
    enable_windows_utf8_console();

    // clap exits with 2 on usage errors, which is the link error code here
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(ExitStatus::BadArgument.code());
        }
    };
    let status = match run(&cli) {
        Ok(()) => ExitStatus::Ok,
        Err(e) => {
            report(&e);
            ExitStatus::from_error(&e)
        }
    };
    std::process::exit(status.code());
}

fn run(cli: &Cli) -> Result<()> {
    let dir = Path::new(".");
    let name = cli.project.as_deref();

    match &cli.command {
        None | Some(Commands::Build) => {
            let settings = Settings::load()?;
            commands::build::build(dir, name, &settings, &SystemExecutor).map(|_| ())
        }
        Some(Commands::Run { args }) => {
            let settings = Settings::load()?;
            commands::build::build_and_run(dir, name, args, &settings, &SystemExecutor)
        }
        Some(Commands::Create { kind }) => commands::project_file::create(dir, name, kind.as_deref()),
        Some(Commands::Set { setting }) => commands::project_file::set(dir, name, setting),
        Some(Commands::Clean { all }) => {
            let settings = Settings::load()?;
            let project = Project::load(dir, name, &settings.platform)?;
            build::clean(&project, &settings, *all).map(|_| ())
        }
        Some(Commands::Watch) => {
            let settings = Settings::load()?;
            build::watch(dir, name, &settings, &SystemExecutor)
        }
        Some(Commands::Doctor) => {
            let settings = Settings::load()?;
            commands::doctor::run_doctor(&settings)
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn report(err: &anyhow::Error) {
    // Link failures already printed the linker output and hints
    if let Some(SunError::LinkFailed { output, .. }) = err.downcast_ref::<SunError>() {
        println!("{} Failed to link {}", "x".red(), output.display());
        return;
    }
    println!("{} {:#}", "x".red(), err);
    if let Some(SunError::ProjectFileNotFound(_)) = err.downcast_ref::<SunError>() {
        println!(
            "{} Run 'sun create' to make one, or pass --project <name>",
            "💡".yellow()
        );
    }
}
