//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating task records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task component is empty after trimming.
    #[error("task component must not be empty")]
    EmptyComponent,

    /// The identifier is empty or contains characters unsafe for a file stem.
    #[error("invalid task identifier '{0}', expected [a-z0-9_-]+")]
    InvalidTaskId(String),

    /// The requested status change is not an edge of the state machine.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// A write attempted to change status without going through a move.
    #[error("task {task_id} status is {stored}, a write cannot change it to {requested}")]
    StatusChangedByWrite {
        /// Task identifier.
        task_id: TaskId,
        /// Status held by the store.
        stored: TaskStatus,
        /// Status carried by the rejected write.
        requested: TaskStatus,
    },

    /// A write removed or reordered existing progress-log entries.
    #[error("progress log of task {0} is append-only")]
    ProgressLogRewritten(TaskId),
}

/// Error returned while parsing task statuses from documents or arguments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);
