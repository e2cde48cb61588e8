//! # sun - Minimal C++ build tool
//!
//! sun builds C++ projects described by a small line-oriented project file
//! (`.sun`), following `require` directives recursively into other projects.
//!
//! ## Features
//!
//! - **Tiny Project Files**: `+*.cpp`, `name app`, `static` and you are done
//! - **Recursive Dependencies**: Static libraries are flattened into their dependents
//! - **Parallel Builds**: Work-stealing compilation using all CPU cores
//! - **Incremental**: Only sources newer than their objects are recompiled
//! - **Per-Configuration Objects**: Each toolchain setup gets its own `int/<hash>/`
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a project file compiling every .cpp in the directory
//! sun create
//!
//! # Build and run
//! sun run
//! ```
//!
//! ## Module Organization
//!
//! - [`project`] - Project file parsing (`.sun`)
//! - [`build`] - Dependency resolution, compile scheduling and linking
//! - [`toolchain`] - Compiler, linker and archiver invocation
//! - [`config`] - Host defaults and user configuration
//! - [`commands`] - CLI command handlers

/// Dependency resolution, parallel compilation and linking.
pub mod build;

/// CLI command handlers extracted from main.
pub mod commands;

/// Host defaults and `~/.sun/config.toml`.
pub mod config;

/// Error kinds and process exit statuses.
pub mod error;

/// Project file parsing (`.sun`).
pub mod project;

/// Compiler, linker and archiver invocation.
pub mod toolchain;
