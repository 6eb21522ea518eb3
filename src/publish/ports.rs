//! Publisher port and its request/outcome types.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::command::CommandError;
use crate::task::domain::{TaskId, TaskStatus};

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Records a task transition in version control.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Stages, commits and pushes the current working tree for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when staging or committing fails. Push
    /// failures are reported through [`PublishOutcome::Committed`].
    async fn publish(&self, request: &PublishRequest) -> PublishResult<PublishOutcome>;
}

/// What is being published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Task whose transition is published.
    pub task_id: TaskId,
    /// Task title, quoted in the commit body.
    pub title: String,
    /// Status the task is moving to.
    pub target: TaskStatus,
}

impl PublishRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(task_id: TaskId, title: impl Into<String>, target: TaskStatus) -> Self {
        Self {
            task_id,
            title: title.into(),
            target,
        }
    }

    /// Commit message naming the task and its target status.
    #[must_use]
    pub fn commit_message(&self) -> String {
        format!(
            "Task {}: {}\n\n{}",
            self.target.queue_name(),
            self.task_id,
            self.title
        )
    }
}

/// Result of a publish attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A commit was created.
    Committed {
        /// Whether the push succeeded.
        pushed: bool,
        /// Push failure detail when `pushed` is `false`.
        push_warning: Option<String>,
    },
    /// Staging produced no changes, so nothing was committed.
    NothingToCommit,
    /// The working directory is not a git repository.
    Skipped,
}

impl PublishOutcome {
    /// Returns the push warning, if the commit could not be pushed.
    #[must_use]
    pub fn push_warning(&self) -> Option<&str> {
        match self {
            Self::Committed { push_warning, .. } => push_warning.as_deref(),
            Self::NothingToCommit | Self::Skipped => None,
        }
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed { pushed: true, .. } => f.write_str("committed and pushed"),
            Self::Committed { pushed: false, .. } => f.write_str("committed, push failed"),
            Self::NothingToCommit => f.write_str("nothing to commit"),
            Self::Skipped => f.write_str("skipped, not a git repository"),
        }
    }
}

/// Errors returned by publishers.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// `git add` failed.
    #[error("staging changes failed: {0}")]
    Stage(String),

    /// `git commit` failed.
    #[error("commit failed: {0}")]
    Commit(String),

    /// A git command could not run.
    #[error(transparent)]
    Command(#[from] CommandError),
}
