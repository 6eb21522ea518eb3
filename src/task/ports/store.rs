//! Store port for task persistence and status queue membership.

use crate::task::domain::{DocumentError, TaskDomainError, TaskId, TaskRecord, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task persistence contract.
///
/// A store holds three queues, one per [`TaskStatus`]. Every record sits in
/// exactly one queue and [`TaskStore::move_task`] is the only operation that
/// changes which one.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Adds a new record to the queue matching its status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when any queue already holds
    /// a record with the same identifier.
    async fn insert(&self, record: &TaskRecord) -> TaskStoreResult<()>;

    /// Lists identifiers in one queue, in lexicographic order.
    async fn list(&self, status: TaskStatus) -> TaskStoreResult<Vec<TaskId>>;

    /// Reads a record from whichever queue holds it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when no queue holds the record.
    async fn read(&self, id: &TaskId) -> TaskStoreResult<TaskRecord>;

    /// Persists field changes to an existing record in place.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the record does not exist and
    /// [`TaskStoreError::Domain`] when the write would change status or
    /// rewrite the progress log.
    async fn write(&self, record: &TaskRecord) -> TaskStoreResult<()>;

    /// Relocates a record from `from` to `to`, logging the change.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::InvalidTransition`] when the state machine
    /// forbids `from -> to` (checked first), and [`TaskStoreError::NotFound`]
    /// when the record is not in the `from` queue. Either way the record is
    /// left unchanged.
    async fn move_task(
        &self,
        id: &TaskId,
        from: TaskStatus,
        to: TaskStatus,
    ) -> TaskStoreResult<TaskRecord>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A record with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The record was not found where it was expected.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The state machine has no `from -> to` edge.
    #[error("invalid transition for task {id}: {from} -> {to}")]
    InvalidTransition {
        /// Task identifier.
        id: TaskId,
        /// Requested source status.
        from: TaskStatus,
        /// Requested target status.
        to: TaskStatus,
    },

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// A stored document could not be parsed.
    #[error("task document {location} is malformed: {source}")]
    MalformedDocument {
        /// Path or key of the offending document.
        location: String,
        /// Parse failure.
        #[source]
        source: DocumentError,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Rejects `from -> to` before any store state is touched.
///
/// # Errors
///
/// Returns [`TaskStoreError::InvalidTransition`] when the edge does not exist.
pub fn ensure_transition(id: &TaskId, from: TaskStatus, to: TaskStatus) -> TaskStoreResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(TaskStoreError::InvalidTransition {
            id: id.clone(),
            from,
            to,
        })
    }
}
