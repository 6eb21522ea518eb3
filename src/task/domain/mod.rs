//! Domain model for the task lifecycle.
//!
//! The task domain models records, their status state machine, the markdown
//! document they persist as, and the suitability classifier, while keeping
//! all infrastructure concerns outside of the domain boundary.

pub mod document;
mod error;
mod ids;
mod status;
pub mod suitability;
mod task;

pub use document::DocumentError;
pub use error::{ParsePriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use status::{Priority, TaskStatus};
pub use suitability::is_suitable;
pub use task::{
    DEFAULT_SECTION, NewTaskRecord, PersistedTaskRecord, ProgressEntry, SourceReference,
    TaskRecord,
};
