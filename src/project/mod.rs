//! Project descriptor.
//!
//! A [`Project`] is one buildable unit: a directory, the project file in it,
//! the source set that file selects, its `require`d dependencies, the kind of
//! artifact it links to and its toolchain overrides. Projects are built fresh
//! for every build; nothing is cached between loads.
//!
//! ## Project file
//!
//! ```text
//! +*.cpp
//! -scratch.cpp
//! name engine
//! static
//! cpp 20
//! require ../soup include_dir=../soup/include
//! if not windows
//! linker_arg -lpthread
//! endif
//! ```

pub mod directive;

use crate::config::{Settings, project_file_name};
use crate::error::SunError;
use crate::toolchain::{DEFAULT_COMPILER, Platform, Toolchain};
use anyhow::{Context, Result};
use colored::*;
use directive::{Block, Directive, compile_wildcard, is_wildcard};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Name of the per-project intermediate directory
pub const INT_DIR: &str = "int";

/// Artifact shape of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkKind {
    #[default]
    Executable,
    StaticLibrary,
    DynamicLibrary,
}

impl LinkKind {
    pub fn is_library(self) -> bool {
        self != LinkKind::Executable
    }
}

/// A `require` edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub dir: PathBuf,
    /// Passed as `-I` to the depending project; defaults to `dir`
    pub include_dir: PathBuf,
}

/// Per-project toolchain settings from the project file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainOverride {
    pub program: Option<String>,
    pub standard: Option<String>,
    pub extra_args: Vec<String>,
    pub extra_linker_args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub dir: PathBuf,
    pub file: PathBuf,
    pub name: Option<String>,
    pub sources: BTreeSet<PathBuf>,
    pub dependencies: Vec<Dependency>,
    pub link_kind: LinkKind,
    pub toolchain: ToolchainOverride,
    /// Non-fatal problems found while parsing
    pub warnings: Vec<String>,
}

impl Project {
    /// Load `<dir>/.sun` (or `<dir>/<name>.sun`).
    ///
    /// The only failure is a missing or unreadable project file; bad lines
    /// end up in [`Project::warnings`].
    pub fn load(dir: &Path, name: Option<&str>, platform: &Platform) -> Result<Self> {
        let dir = std::path::absolute(dir)
            .with_context(|| format!("Failed to resolve {}", dir.display()))?;
        let dir = normalize(&dir);
        let file = dir.join(project_file_name(name));
        if !file.is_file() {
            return Err(SunError::ProjectFileNotFound(file).into());
        }
        let text = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        Ok(Self::parse(dir, file, &text, platform))
    }

    /// Build a project from project file text. `dir` must be absolute.
    pub fn parse(dir: PathBuf, file: PathBuf, text: &str, platform: &Platform) -> Self {
        let mut project = Project {
            dir,
            file,
            name: None,
            sources: BTreeSet::new(),
            dependencies: Vec::new(),
            link_kind: LinkKind::Executable,
            toolchain: ToolchainOverride::default(),
            warnings: Vec::new(),
        };

        let mut block = Block::Outside;
        // rejected `if`s inside the open block; their lines are skipped and
        // each one's `endif` closes only itself
        let mut rejected = 0usize;
        for raw in text.lines() {
            let Some(directive) = Directive::parse(raw) else {
                continue;
            };

            match directive {
                Directive::EndIf => {
                    if rejected > 0 {
                        rejected -= 1;
                        continue;
                    }
                    if !block.is_open() {
                        project.warn("endif called while if-block is not active".to_string());
                    }
                    block = Block::Outside;
                    continue;
                }
                Directive::If { condition, .. } if block.is_open() => {
                    project.warn(format!(
                        "Nested if-blocks are not supported, skipping \"if {}\" up to its endif",
                        condition
                    ));
                    rejected += 1;
                }
                _ if block.skipping() || rejected > 0 => continue,
                Directive::If { negated, condition } => {
                    let value = platform.condition(&condition).unwrap_or_else(|| {
                        project.warn(format!(
                            "Treating unknown condition \"{}\" as false",
                            condition
                        ));
                        false
                    });
                    block = if value ^ negated {
                        Block::Taken
                    } else {
                        Block::Skipped
                    };
                }
                other => project.apply(other, platform),
            }
        }

        if block.is_open() {
            project.warn("if-block is not closed with endif".to_string());
        }
        project
    }

    fn apply(&mut self, directive: Directive<'_>, platform: &Platform) {
        match directive {
            Directive::Add("") | Directive::Remove("") => {
                self.warn("Ignoring +/- line without a file pattern".to_string())
            }
            Directive::Add(pattern) => {
                for file in self.match_files(pattern) {
                    self.sources.insert(file);
                }
            }
            Directive::Remove(pattern) => {
                for file in self.match_files(pattern) {
                    self.sources.remove(&file);
                }
            }
            Directive::Name(value) => self.name = Some(value.to_string()),
            Directive::Require { path, include_dir } => {
                let dir = normalize(&self.dir.join(path));
                let include_dir = match include_dir {
                    Some(inc) => normalize(&self.dir.join(inc)),
                    None => dir.clone(),
                };
                self.dependencies.push(Dependency { dir, include_dir });
            }
            Directive::Standard(value) => {
                if self.toolchain.standard.is_some() {
                    self.warn("C++ version is specified multiple times".to_string());
                }
                self.toolchain.standard = Some(value.to_string());
            }
            Directive::Arg(value) => self.toolchain.extra_args.push(value.to_string()),
            Directive::LinkerArg(value) => {
                self.toolchain.extra_linker_args.push(value.to_string())
            }
            Directive::Compiler(value) => self.toolchain.program = Some(value.to_string()),
            Directive::Static => self.link_kind = LinkKind::StaticLibrary,
            Directive::Dynamic => {
                self.link_kind = LinkKind::DynamicLibrary;
                if !platform.is_windows() {
                    self.toolchain.extra_args.push("-fPIC".to_string());
                    self.toolchain.extra_args.push("-fvisibility=hidden".to_string());
                }
            }
            Directive::Unknown(line) => {
                self.warn(format!("Ignoring line with unknown data: {}", line))
            }
            // handled by the block state machine in `parse`
            Directive::If { .. } | Directive::EndIf => {}
        }
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Resolve a `+`/`-` pattern to absolute paths. Literal patterns are
    /// taken as-is; wildcard patterns scan the project directory (not
    /// recursively) for regular files.
    fn match_files(&mut self, pattern: &str) -> Vec<PathBuf> {
        if !is_wildcard(pattern) {
            return vec![normalize(&self.dir.join(pattern))];
        }

        let re = match compile_wildcard(pattern) {
            Ok(re) => re,
            Err(e) => {
                self.warn(format!("Invalid pattern \"{}\": {}", pattern, e));
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| re.is_match(&e.file_name().to_string_lossy()))
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    pub fn print_warnings(&self) {
        for warning in &self.warnings {
            println!(
                "{} {}: {}",
                "!".yellow(),
                self.file.display().to_string().dimmed(),
                warning
            );
        }
    }

    /// Explicit `name`, else the only source's stem (unless it is `main`),
    /// else the directory name, skipping a trailing `src` directory.
    pub fn name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if self.sources.len() == 1
            && let Some(stem) = self.sources.iter().next().and_then(|s| s.file_stem())
        {
            let stem = stem.to_string_lossy();
            if stem != "main" {
                return stem.to_string();
            }
        }
        let mut dir = self.dir.as_path();
        if dir.file_name().is_some_and(|n| n == "src")
            && let Some(parent) = dir.parent()
        {
            dir = parent;
        }
        dir.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "out".to_string())
    }

    pub fn toolchain(&self, settings: &Settings) -> Toolchain {
        Toolchain {
            program: self
                .toolchain
                .program
                .clone()
                .unwrap_or_else(|| settings.default_compiler.clone()),
            archiver: settings.archiver.clone(),
            standard: self
                .toolchain
                .standard
                .clone()
                .unwrap_or_else(|| settings.default_standard.clone()),
            rtti: settings.rtti,
            extra_args: self.toolchain.extra_args.clone(),
            extra_linker_args: self.toolchain.extra_linker_args.clone(),
            platform: settings.platform,
        }
    }

    /// Short key of everything that makes objects of this project
    /// incompatible with another configuration of the same sources
    pub fn fingerprint(&self, settings: &Settings) -> String {
        let mut hasher = Sha256::new();
        hasher.update(settings.platform.name().as_bytes());
        // the program that actually runs, whether it comes from the project
        // file or the user config
        let program = self
            .toolchain
            .program
            .as_deref()
            .unwrap_or(&settings.default_compiler);
        if program != DEFAULT_COMPILER {
            hasher.update([0u8]);
            hasher.update(program.as_bytes());
        }
        for arg in &self.toolchain.extra_args {
            hasher.update([0u8]);
            hasher.update(arg.as_bytes());
        }
        if !settings.rtti {
            hasher.update([0u8]);
            hasher.update(b"-fno-rtti");
        }
        hasher
            .finalize()
            .iter()
            .take(8)
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// `<dir>/int/<fingerprint>`
    pub fn intermediate_dir(&self, settings: &Settings) -> PathBuf {
        self.dir.join(INT_DIR).join(self.fingerprint(settings))
    }

    /// Path of the artifact this project links to
    pub fn output_file(&self, toolchain: &Toolchain) -> PathBuf {
        let platform = &toolchain.platform;
        let name = self.name();
        let file_name = match self.link_kind {
            LinkKind::Executable => format!("{}{}", name, platform.executable_extension()),
            LinkKind::StaticLibrary => {
                format!("{}{}", name, platform.static_library_extension())
            }
            LinkKind::DynamicLibrary => format!(
                "{}{}{}",
                platform.dynamic_library_prefix(),
                name,
                toolchain.dynamic_library_extension()
            ),
        };
        self.dir.join(file_name)
    }

    /// Import library written next to a Windows DLL
    pub fn import_library(&self) -> PathBuf {
        self.dir.join(format!("{}.lib", self.name()))
    }
}

/// Lexically resolve `.` and `..` so the same directory always has the same
/// path, whichever project `require`d it.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Write a fresh project file. Refuses to overwrite an existing one.
pub fn create_project_file(
    dir: &Path,
    name: Option<&str>,
    link_kind: Option<&str>,
) -> Result<PathBuf> {
    let path = dir.join(project_file_name(name));
    if path.exists() {
        return Err(SunError::ProjectFileExists(path).into());
    }

    let mut content = String::from("+*.cpp\n");
    if let Some(kind) = link_kind {
        match kind {
            "static" | "dynamic" | "shared" => {
                content.push_str(kind);
                content.push('\n');
            }
            other => {
                return Err(SunError::BadArgument(format!(
                    "Unknown project kind \"{}\", expected static, dynamic or shared",
                    other
                ))
                .into());
            }
        }
    }
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Append one configuration line to an existing project file
pub fn append_directive(dir: &Path, name: Option<&str>, line: &str) -> Result<PathBuf> {
    use std::io::Write;

    let path = dir.join(project_file_name(name));
    if !path.is_file() {
        return Err(SunError::ProjectFileNotFound(path).into());
    }
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    // keep the new directive on its own line
    let existing = fs::read_to_string(&path)?;
    if !existing.is_empty() && !existing.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{}", line).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
