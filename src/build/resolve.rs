//! Dependency resolution.
//!
//! Each `require` edge is loaded as a fresh [`Project`] and either flattened
//! into the current project (static library inside a static library) or
//! built as its own artifact and linked against. The walk is depth-first and
//! strictly sequential: one dependency is fully handled before the next.

use super::core::Builder;
use super::scheduler::CompileReport;
use crate::error::SunError;
use crate::project::{Dependency, LinkKind, Project};
use crate::toolchain::{Platform, Toolchain};
use anyhow::Result;
use colored::*;
use std::path::Path;

/// How a dependency enters the depending project's link step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPlan {
    /// Compile the dependency's sources and merge its objects into ours
    Flatten,
    /// Build the dependency's artifact, then link against it
    Separate,
}

impl LinkPlan {
    pub fn for_pair(current: LinkKind, dependency: LinkKind) -> Self {
        if current == LinkKind::StaticLibrary && dependency == LinkKind::StaticLibrary {
            LinkPlan::Flatten
        } else {
            LinkPlan::Separate
        }
    }
}

/// Linker arguments that make `current` link against a separately built
/// dependency whose artifact is `artifact`.
pub fn dependency_link_args(
    platform: &Platform,
    current: LinkKind,
    dep: &Dependency,
    dep_project: &Project,
    artifact: &Path,
) -> Vec<String> {
    match dep_project.link_kind {
        // an archive inside an archive is flattened instead
        LinkKind::StaticLibrary if current == LinkKind::StaticLibrary => Vec::new(),
        LinkKind::StaticLibrary => vec![artifact.to_string_lossy().to_string()],
        _ if platform.is_windows() => {
            vec![dep_project.import_library().to_string_lossy().to_string()]
        }
        _ => vec![
            format!("-L{}", dep.dir.display()),
            format!("-l{}", dep_project.name()),
        ],
    }
}

impl Builder<'_> {
    /// Handle every `require` of `project`, adjusting `toolchain` so the
    /// project compiles and links against its dependencies. Returns the
    /// objects of flattened dependencies.
    pub(super) fn resolve_dependencies(
        &mut self,
        project: &Project,
        toolchain: &mut Toolchain,
    ) -> Result<CompileReport> {
        let mut report = CompileReport::default();
        if project.dependencies.is_empty() {
            return Ok(report);
        }

        for dep in &project.dependencies {
            let dep_project = self.load_dependency(dep)?;
            let dep_name = dep_project.name();
            println!("{} Processing dependency: {}", ">>>".cyan(), dep_name.bold());

            if !dep_project.link_kind.is_library() {
                return Err(SunError::DependencyLinkKindMissing {
                    name: dep_name,
                    dir: dep.dir.clone(),
                }
                .into());
            }

            let dep_toolchain = dep_project.toolchain(self.settings());
            let artifact = dep_project.output_file(&dep_toolchain);
            // an archive's own link requirements follow it to whoever links it
            let mut inherited = Vec::new();
            match LinkPlan::for_pair(project.link_kind, dep_project.link_kind) {
                LinkPlan::Flatten => {
                    let mut dep_toolchain = dep_toolchain;
                    let dep_report = self.compile(&dep_project, &mut dep_toolchain)?;
                    report.merge(dep_report);
                    toolchain
                        .extra_linker_args
                        .extend(dep_toolchain.extra_linker_args);
                }
                LinkPlan::Separate => {
                    let outcome = self.build(&dep_project)?;
                    if dep_project.link_kind == LinkKind::StaticLibrary {
                        inherited = outcome.extra_linker_args;
                    }
                }
            }

            toolchain
                .extra_args
                .push(format!("-I{}", dep.include_dir.display()));
            toolchain.extra_linker_args.extend(dependency_link_args(
                &toolchain.platform,
                project.link_kind,
                dep,
                &dep_project,
                &artifact,
            ));
            toolchain.extra_linker_args.extend(inherited);
        }

        println!("{} Now compiling {}", ">>>".cyan(), project.name().bold());
        Ok(report)
    }

    fn load_dependency(&self, dep: &Dependency) -> Result<Project> {
        match self.load(&dep.dir, None) {
            Ok(project) => Ok(project),
            Err(e) => match e.downcast_ref::<SunError>() {
                Some(SunError::ProjectFileNotFound(_)) => {
                    Err(SunError::DependencyNotFound(dep.dir.clone()).into())
                }
                _ => Err(e),
            },
        }
    }
}
