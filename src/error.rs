//! Fatal build conditions and the exit codes they map to.

use std::fmt;
use std::path::PathBuf;

/// Process exit codes. Each one denotes a distinct fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Ok = 0,
    BadArgument = 1,
    LinkError = 2,
    BadDependency = 3,
    Exception = 4,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Classify an error bubbled up from a build. Anything that is not a
    /// known [`SunError`] counts as an unexpected exception.
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<SunError>() {
            Some(e) => e.exit_status(),
            None => ExitStatus::Exception,
        }
    }
}

/// Error type for project loading, dependency resolution and linking
#[derive(Debug)]
pub enum SunError {
    /// The requested project file does not exist
    ProjectFileNotFound(PathBuf),
    /// A `require`d directory has no loadable project file
    DependencyNotFound(PathBuf),
    /// A dependency declares neither `static` nor `dynamic`
    DependencyLinkKindMissing { name: String, dir: PathBuf },
    /// A `require` chain leads back to a project that is still being resolved
    CyclicDependency(Vec<PathBuf>),
    /// `create` would overwrite an existing project file
    ProjectFileExists(PathBuf),
    /// Bad command line input
    BadArgument(String),
    /// The linker or archiver printed diagnostics
    LinkFailed { output: PathBuf, log: String },
}

impl SunError {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            SunError::ProjectFileNotFound(_)
            | SunError::ProjectFileExists(_)
            | SunError::BadArgument(_) => ExitStatus::BadArgument,
            SunError::DependencyNotFound(_)
            | SunError::DependencyLinkKindMissing { .. }
            | SunError::CyclicDependency(_) => ExitStatus::BadDependency,
            SunError::LinkFailed { .. } => ExitStatus::LinkError,
        }
    }
}

impl fmt::Display for SunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SunError::ProjectFileNotFound(path) => {
                write!(f, "No project file at {}", path.display())
            }
            SunError::DependencyNotFound(dir) => {
                write!(f, "Failed to load dependency: {}", dir.display())
            }
            SunError::DependencyLinkKindMissing { name, dir } => write!(
                f,
                "Dependency '{}' ({}) does not specify 'static' or 'dynamic'",
                name,
                dir.display()
            ),
            SunError::CyclicDependency(chain) => {
                let chain: Vec<String> = chain.iter().map(|p| p.display().to_string()).collect();
                write!(f, "Cyclic dependency: {}", chain.join(" -> "))
            }
            SunError::ProjectFileExists(path) => write!(
                f,
                "{} already exists, not going to overwrite it",
                path.display()
            ),
            SunError::BadArgument(msg) => write!(f, "{}", msg),
            SunError::LinkFailed { output, .. } => {
                write!(f, "Linking {} failed", output.display())
            }
        }
    }
}

impl std::error::Error for SunError {}
