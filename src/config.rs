//! Build settings.
//!
//! [`Settings`] is the explicit configuration value handed to every part of
//! the build: the active platform and the toolchain defaults. It starts from
//! host defaults and may be adjusted by `~/.sun/config.toml`.

use crate::toolchain::{DEFAULT_COMPILER, Platform};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Base name of the project file in a project directory
pub const PROJECT_FILE: &str = ".sun";

/// Optional user overrides (`~/.sun/config.toml`)
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub compiler: Option<String>,
    pub archiver: Option<String>,
    pub standard: Option<String>,
    pub rtti: Option<bool>,
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub platform: Platform,
    pub default_compiler: String,
    pub archiver: String,
    pub default_standard: String,
    pub rtti: bool,
    /// Upper bound for build parallelism; `None` asks the OS
    pub jobs: Option<usize>,
}

impl Settings {
    /// Defaults for a given platform
    pub fn for_platform(platform: Platform) -> Self {
        let (archiver, standard) = if platform.is_windows() {
            ("llvm-ar", "c++20")
        } else {
            ("ar", "c++17")
        };
        Self {
            platform,
            default_compiler: DEFAULT_COMPILER.to_string(),
            archiver: archiver.to_string(),
            default_standard: standard.to_string(),
            rtti: true,
            jobs: None,
        }
    }

    /// Host defaults merged with the user config file, if there is one
    pub fn load() -> Result<Self> {
        let mut settings = Self::for_platform(Platform::host());
        if let Some(path) = user_config_path()
            && path.exists()
        {
            let user = load_user_config(&path)?;
            settings.apply(user);
        }
        Ok(settings)
    }

    pub fn apply(&mut self, user: UserConfig) {
        if let Some(compiler) = user.compiler {
            self.default_compiler = compiler;
        }
        if let Some(archiver) = user.archiver {
            self.archiver = archiver;
        }
        if let Some(standard) = user.standard {
            self.default_standard = standard;
        }
        if let Some(rtti) = user.rtti {
            self.rtti = rtti;
        }
        if user.jobs.is_some() {
            self.jobs = user.jobs;
        }
    }

    /// Available hardware parallelism, or the configured job count
    pub fn parallelism(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sun").join("config.toml"))
}

/// `.sun`, or `<name>.sun` for a named project
pub fn project_file_name(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{}{}", name, PROJECT_FILE),
        None => PROJECT_FILE.to_string(),
    }
}
