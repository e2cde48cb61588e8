//! Toolchain driver.
//!
//! Turns a [`Toolchain`] description into compiler, linker and archiver
//! command lines and hands them to an [`Executor`]. The driver holds no
//! state between calls; every operation returns the combined diagnostic
//! text of the invoked process (empty means success).

pub mod exec;
pub mod types;

pub use exec::{Executor, SystemExecutor, run_artifact};
pub use types::{Arch, Os, Platform};

use anyhow::Result;
use std::path::Path;

/// Compiler program used when a project does not say otherwise
pub const DEFAULT_COMPILER: &str = "clang";

/// A fully configured compiler + archiver pair for one project build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub program: String,
    pub archiver: String,
    /// Language standard without the `-std=` prefix, e.g. `c++17`
    pub standard: String,
    pub rtti: bool,
    pub extra_args: Vec<String>,
    pub extra_linker_args: Vec<String>,
    pub platform: Platform,
}

impl Toolchain {
    pub fn is_emscripten(&self) -> bool {
        self.program == "em++"
    }

    /// Flags shared by every compiler invocation
    pub fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.platform.is_windows() {
            args.push("-D".to_string());
            args.push("_CRT_SECURE_NO_WARNINGS".to_string());
        } else {
            args.push("-pthread".to_string());
            args.push("-Wno-unused-command-line-argument".to_string());
        }
        args.push(get_std_flag(&self.standard));
        if !self.rtti {
            args.push("-fno-rtti".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Platform runtime libraries followed by the extra linker args
    pub fn linker_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        if self.platform.is_windows() {
            if !self.is_emscripten() {
                args.push("-luser32".into());
                args.push("-lgdi32".into());
            }
        } else {
            args.push("-fuse-ld=lld".into());
            args.push("-lstdc++".into());
            if !self.is_emscripten() {
                args.push("-lstdc++fs".into());
                args.push("-lresolv".into());
            }
            args.push("-lm".into());
            args.push("-ldl".into());
        }
        args.extend(self.extra_linker_args.iter().cloned());
        args
    }

    pub fn compile_args(&self, source: &Path, object: &Path) -> Vec<String> {
        let mut args = self.base_args();
        args.push("-x".into());
        args.push("c++".into());
        args.push("-o".into());
        args.push(path_arg(object));
        args.push("-c".into());
        args.push(path_arg(source));
        args
    }

    pub fn executable_args(&self, objects: &[impl AsRef<Path>], output: &Path) -> Vec<String> {
        let mut args = self.base_args();
        args.push("-o".into());
        args.push(path_arg(output));
        args.extend(objects.iter().map(|o| path_arg(o.as_ref())));
        args.extend(self.linker_args());
        args
    }

    /// Position-independent/visibility flags are not added here: they have
    /// to be present when each object is compiled, not at link time.
    pub fn dynamic_library_args(&self, objects: &[impl AsRef<Path>], output: &Path) -> Vec<String> {
        let mut args = self.base_args();
        args.push("--shared".into());
        args.push("-o".into());
        args.push(path_arg(output));
        args.extend(objects.iter().map(|o| path_arg(o.as_ref())));
        args.extend(self.linker_args());
        args
    }

    pub fn static_library_args(&self, objects: &[impl AsRef<Path>], output: &Path) -> Vec<String> {
        let mut args = vec!["rc".to_string(), path_arg(output)];
        args.extend(objects.iter().map(|o| path_arg(o.as_ref())));
        args
    }

    pub fn make_object(&self, exec: &dyn Executor, source: &Path, object: &Path) -> Result<String> {
        exec.execute(&self.program, &self.compile_args(source, object))
    }

    pub fn make_executable(
        &self,
        exec: &dyn Executor,
        objects: &[impl AsRef<Path>],
        output: &Path,
    ) -> Result<String> {
        exec.execute(&self.program, &self.executable_args(objects, output))
    }

    pub fn make_dynamic_library(
        &self,
        exec: &dyn Executor,
        objects: &[impl AsRef<Path>],
        output: &Path,
    ) -> Result<String> {
        let out = exec.execute(&self.program, &self.dynamic_library_args(objects, output))?;
        // lld-link announces the import library it wrote; that is not an error
        if self.platform.is_windows() && out.starts_with("   Creating library") {
            return Ok(String::new());
        }
        Ok(out)
    }

    /// The archiver is invoked directly; the compiler is not involved
    pub fn make_static_library(
        &self,
        exec: &dyn Executor,
        objects: &[impl AsRef<Path>],
        output: &Path,
    ) -> Result<String> {
        exec.execute(&self.archiver, &self.static_library_args(objects, output))
    }

    pub fn dynamic_library_extension(&self) -> &'static str {
        if self.is_emscripten() {
            ".js"
        } else {
            self.platform.dynamic_library_extension()
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Get the GCC/Clang-compatible standard flag for a language standard.
///
/// Project files usually give just the year (`cpp 20`), but full names
/// (`c++20`, `gnu++17`) and an explicit `-std=` prefix are accepted too.
pub fn get_std_flag(standard: &str) -> String {
    let normalized = standard.trim().to_lowercase();
    let clean = normalized.strip_prefix("-std=").unwrap_or(&normalized);

    match clean {
        "98" | "03" | "c++98" | "c++03" => "-std=c++03".to_string(),
        "11" | "0x" | "c++11" | "c++0x" => "-std=c++11".to_string(),
        "14" | "1y" | "c++14" | "c++1y" => "-std=c++14".to_string(),
        "17" | "1z" | "c++17" | "c++1z" => "-std=c++17".to_string(),
        "20" | "2a" | "c++20" | "c++2a" => "-std=c++20".to_string(),
        "23" | "2b" | "c++23" | "c++2b" => "-std=c++23".to_string(),
        "26" | "2c" | "c++26" | "c++2c" => "-std=c++26".to_string(),
        _ => format!("-std={}", clean),
    }
}
