//! Port for the work performed on a task between begin and completion.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::deadline::Deadline;
use crate::task::domain::TaskRecord;

/// Errors reported by task work.
#[derive(Debug, Clone, Error)]
pub enum WorkError {
    /// The work could not be carried out.
    #[error("task work failed: {0}")]
    Failed(String),
}

/// Work carried out on an IN_PROGRESS task.
#[async_trait]
pub trait TaskWork: Send + Sync {
    /// Performs the work for `record`, finishing before `deadline` if it can.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError`] when the work fails; the session rolls the task
    /// back.
    async fn perform(&self, record: &TaskRecord, deadline: &Deadline) -> Result<(), WorkError>;
}

/// Work that only logs the task it was given.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWork;

#[async_trait]
impl TaskWork for SimulatedWork {
    async fn perform(&self, record: &TaskRecord, _deadline: &Deadline) -> Result<(), WorkError> {
        info!(task_id = %record.id(), title = record.title(), "simulated work");
        Ok(())
    }
}
