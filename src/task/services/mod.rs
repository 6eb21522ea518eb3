//! Application services for the task lifecycle.

mod executor;
pub mod import;
pub mod index;
mod selection;

pub use executor::{Completion, ExecutorError, ExecutorResult, TaskExecutor};
pub use import::{
    ImportError, ImportRejection, ImportReport, IssueRecord, import_issues, parse_issues,
};
pub use index::{IndexError, TaskStats, render_index};
pub use selection::select_candidates;
