//! Single-task state transitions with rollback and publishing.

use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::publish::{PublishError, PublishOutcome, PublishRequest, Publisher};
use crate::task::{
    domain::{TaskId, TaskRecord, TaskStatus},
    ports::{FileEstimateError, FileEstimator, TaskStore, TaskStoreError},
};

/// Errors raised by [`TaskExecutor`] operations.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] TaskStoreError),

    /// Publishing failed; the task was left where it was.
    #[error("publishing task {task_id} failed: {source}")]
    PublishFailure {
        /// Task being completed.
        task_id: TaskId,
        /// Publisher failure.
        #[source]
        source: PublishError,
    },

    /// The task touched more files than allowed and was rolled back.
    #[error("task {task_id} modified {estimated} files, exceeding the budget of {max_files}")]
    FileBudgetExceeded {
        /// Offending task.
        task_id: TaskId,
        /// Estimated modified files.
        estimated: usize,
        /// Allowed maximum.
        max_files: usize,
    },

    /// The file estimator failed.
    #[error(transparent)]
    Estimate(#[from] FileEstimateError),
}

/// Result type for executor operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Outcome of a successful [`TaskExecutor::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The record after moving to COMPLETED.
    pub record: TaskRecord,
    /// Publish outcome, `None` when publishing is disabled.
    pub publish: Option<PublishOutcome>,
}

impl Completion {
    /// Push failure detail, if the commit could not be pushed.
    #[must_use]
    pub fn push_warning(&self) -> Option<&str> {
        self.publish.as_ref().and_then(PublishOutcome::push_warning)
    }
}

/// Performs one task's transitions through a [`TaskStore`].
pub struct TaskExecutor<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    estimator: Arc<dyn FileEstimator>,
    publisher: Option<Arc<dyn Publisher>>,
}

impl<S, C> Clone for TaskExecutor<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            estimator: Arc::clone(&self.estimator),
            publisher: self.publisher.clone(),
        }
    }
}

impl<S, C> TaskExecutor<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates an executor that does not publish.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>, estimator: Arc<dyn FileEstimator>) -> Self {
        Self {
            store,
            clock,
            estimator,
            publisher: None,
        }
    }

    /// Publishes every completion through `publisher`.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Moves a task from TODO to IN_PROGRESS.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Store`] when the task is not in TODO.
    #[instrument(skip_all, fields(task_id = %id))]
    pub async fn begin(&self, id: &TaskId) -> ExecutorResult<TaskRecord> {
        let record = self
            .store
            .move_task(id, TaskStatus::Todo, TaskStatus::InProgress)
            .await?;
        info!("task started");
        Ok(record)
    }

    /// Publishes the working tree, then moves the task to COMPLETED.
    ///
    /// The commit captures the task's work with its document still under
    /// IN_PROGRESS; the move to COMPLETED happens afterwards and is not part
    /// of that commit. A failed push is carried in the returned
    /// [`Completion`]; the transition still happens.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Store`] when the task is not IN_PROGRESS and
    /// [`ExecutorError::PublishFailure`] when staging or committing fails, in
    /// which case the task stays IN_PROGRESS.
    #[instrument(skip_all, fields(task_id = %id))]
    pub async fn complete(&self, id: &TaskId) -> ExecutorResult<Completion> {
        let current = self.store.read(id).await?;
        if current.status() != TaskStatus::InProgress {
            return Err(TaskStoreError::NotFound(id.clone()).into());
        }

        let publish = match &self.publisher {
            Some(publisher) => {
                let request =
                    PublishRequest::new(id.clone(), current.title(), TaskStatus::Completed);
                let outcome = publisher.publish(&request).await.map_err(|source| {
                    ExecutorError::PublishFailure {
                        task_id: id.clone(),
                        source,
                    }
                })?;
                if let Some(detail) = outcome.push_warning() {
                    warn!(detail, "push failed, completing anyway");
                }
                Some(outcome)
            }
            None => None,
        };

        let record = self
            .store
            .move_task(id, TaskStatus::InProgress, TaskStatus::Completed)
            .await?;
        info!("task completed");
        Ok(Completion { record, publish })
    }

    /// Moves a task from IN_PROGRESS back to TODO, logging `reason`.
    ///
    /// Never publishes.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Store`] when the task is not IN_PROGRESS or
    /// the reason cannot be persisted.
    #[instrument(skip_all, fields(task_id = %id))]
    pub async fn rollback(&self, id: &TaskId, reason: &str) -> ExecutorResult<TaskRecord> {
        let mut record = self
            .store
            .move_task(id, TaskStatus::InProgress, TaskStatus::Todo)
            .await?;
        record.record_progress(format!("Rolled back: {reason}"), &*self.clock);
        self.store.write(&record).await?;
        warn!(reason, "task rolled back");
        Ok(record)
    }

    /// Checks the task's estimated file count against `max_files`.
    ///
    /// Returns the estimate when within budget. Over budget the task is
    /// rolled back and never completed.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::FileBudgetExceeded`] after rolling back,
    /// [`ExecutorError::Estimate`] when estimation fails, and
    /// [`ExecutorError::Store`] for store failures.
    #[instrument(skip_all, fields(task_id = %id))]
    pub async fn execute_with_budget(
        &self,
        id: &TaskId,
        max_files: usize,
    ) -> ExecutorResult<usize> {
        let record = self.store.read(id).await?;
        let estimated = self.estimator.estimate(&record).await?;
        if estimated <= max_files {
            info!(estimated, max_files, "file budget respected");
            return Ok(estimated);
        }

        warn!(estimated, max_files, "file budget exceeded");
        self.rollback(
            id,
            &format!("file budget exceeded ({estimated} files, limit {max_files})"),
        )
        .await?;
        Err(ExecutorError::FileBudgetExceeded {
            task_id: id.clone(),
            estimated,
            max_files,
        })
    }
}
