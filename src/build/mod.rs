mod clean;
mod compdb;
mod core;
mod feedback;
mod resolve;
mod scheduler;
mod staleness;
mod watcher;

pub use clean::clean;
pub use compdb::{COMPILE_COMMANDS, compile_commands};
pub use self::core::{BuildOutcome, Builder};
pub use feedback::FeedbackAnalyzer;
pub use resolve::{LinkPlan, dependency_link_args};
pub use scheduler::{CompileReport, CompileUnit, worker_count};
pub use staleness::needs_recompile;
pub use watcher::watch;
