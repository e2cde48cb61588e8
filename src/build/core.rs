use super::compdb;
use super::feedback::FeedbackAnalyzer;
use super::scheduler::{self, CompileReport, CompileUnit};
use crate::config::Settings;
use crate::error::SunError;
use crate::project::{LinkKind, Project};
use crate::toolchain::{Executor, Toolchain};
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a successful build
#[derive(Debug)]
pub struct BuildOutcome {
    pub output: PathBuf,
    pub link_kind: LinkKind,
    pub report: CompileReport,
    /// Linker args the project ended up with, dependencies included
    pub extra_linker_args: Vec<String>,
}

/// Drives a whole build: dependencies, compilation, link.
///
/// A `Builder` is cheap and holds no project state besides the stack of
/// directories currently being resolved, which is how `require` cycles are
/// caught.
pub struct Builder<'a> {
    settings: &'a Settings,
    exec: &'a dyn Executor,
    resolving: Vec<PathBuf>,
}

impl<'a> Builder<'a> {
    pub fn new(settings: &'a Settings, exec: &'a dyn Executor) -> Self {
        Self {
            settings,
            exec,
            resolving: Vec::new(),
        }
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// Load a project for the active platform and print its parse warnings
    pub fn load(&self, dir: &Path, name: Option<&str>) -> Result<Project> {
        let project = Project::load(dir, name, &self.settings.platform)?;
        project.print_warnings();
        Ok(project)
    }

    /// Resolve dependencies, compile and link `project`
    pub fn build(&mut self, project: &Project) -> Result<BuildOutcome> {
        let mut toolchain = project.toolchain(self.settings);
        let output = project.output_file(&toolchain);

        let report = self.compile(project, &mut toolchain)?;
        self.link(project, &toolchain, &report.objects, &output)?;

        Ok(BuildOutcome {
            output,
            link_kind: project.link_kind,
            report,
            extra_linker_args: toolchain.extra_linker_args,
        })
    }

    /// Resolve dependencies and compile `project` without linking it.
    ///
    /// The returned objects include those of flattened dependencies, and
    /// `toolchain` comes back with the include and linker arguments the
    /// dependencies require.
    pub fn compile(&mut self, project: &Project, toolchain: &mut Toolchain) -> Result<CompileReport> {
        self.enter(&project.dir)?;
        let result = self.compile_entered(project, toolchain);
        self.resolving.pop();
        result
    }

    fn compile_entered(
        &mut self,
        project: &Project,
        toolchain: &mut Toolchain,
    ) -> Result<CompileReport> {
        let mut report = self.resolve_dependencies(project, toolchain)?;

        let int_dir = project.intermediate_dir(self.settings);
        fs::create_dir_all(&int_dir)
            .with_context(|| format!("Failed to create {}", int_dir.display()))?;

        let units: Vec<CompileUnit> = project
            .sources
            .iter()
            .map(|source| CompileUnit::new(source, &int_dir))
            .collect();

        let own = scheduler::compile_units(
            &units,
            toolchain,
            self.exec,
            self.settings.parallelism(),
        )?;
        report.merge(own);

        if let Err(e) = compdb::write_compile_commands(&project.dir, &units, toolchain) {
            println!("{} Could not write compile_commands.json: {:#}", "!".yellow(), e);
        }

        Ok(report)
    }

    fn enter(&mut self, dir: &Path) -> Result<()> {
        if self.resolving.iter().any(|d| d == dir) {
            let mut chain = self.resolving.clone();
            chain.push(dir.to_path_buf());
            return Err(SunError::CyclicDependency(chain).into());
        }
        self.resolving.push(dir.to_path_buf());
        Ok(())
    }

    /// Link or archive. Any output from the linker fails the build.
    fn link(
        &self,
        project: &Project,
        toolchain: &Toolchain,
        objects: &[PathBuf],
        output: &Path,
    ) -> Result<()> {
        println!("   {} Linking {}...", "🔗".cyan(), project.name());
        let log = match project.link_kind {
            LinkKind::StaticLibrary => toolchain.make_static_library(self.exec, objects, output)?,
            LinkKind::DynamicLibrary => {
                toolchain.make_dynamic_library(self.exec, objects, output)?
            }
            LinkKind::Executable => toolchain.make_executable(self.exec, objects, output)?,
        };

        if !log.is_empty() {
            print!("{}", log);
            if !log.ends_with('\n') {
                println!();
            }
            if let Some(hint) = FeedbackAnalyzer::analyze(&log) {
                println!("{} {}", "💡".yellow(), hint);
            }
            return Err(SunError::LinkFailed {
                output: output.to_path_buf(),
                log,
            }
            .into());
        }
        Ok(())
    }
}
