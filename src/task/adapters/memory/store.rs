//! In-memory task store for tests and dry runs.

use async_trait::async_trait;
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{TaskId, TaskRecord, TaskStatus},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, ensure_transition},
};

/// Thread-safe in-memory task store.
///
/// Queue membership is the record's own status, so the two can never
/// disagree. Listing order is the lexicographic order of identifiers.
#[derive(Debug, Clone)]
pub struct InMemoryTaskStore<C: Clock + Send + Sync> {
    records: Arc<RwLock<BTreeMap<TaskId, TaskRecord>>>,
    clock: C,
}

impl<C: Clock + Send + Sync> InMemoryTaskStore<C> {
    /// Creates an empty store using `clock` for progress-log timestamps.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
            clock,
        }
    }

    /// Returns the number of stored records across all queues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of every stored record, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the lock is poisoned.
    pub fn snapshot(&self) -> TaskStoreResult<Vec<TaskRecord>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records.values().cloned().collect())
    }
}

fn lock_error<T>(err: std::sync::PoisonError<T>) -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl<C: Clock + Send + Sync> TaskStore for InMemoryTaskStore<C> {
    async fn insert(&self, record: &TaskRecord) -> TaskStoreResult<()> {
        let mut records = self.records.write().map_err(lock_error)?;
        if records.contains_key(record.id()) {
            return Err(TaskStoreError::DuplicateTask(record.id().clone()));
        }
        records.insert(record.id().clone(), record.clone());
        Ok(())
    }

    async fn list(&self, status: TaskStatus) -> TaskStoreResult<Vec<TaskId>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records
            .values()
            .filter(|record| record.status() == status)
            .map(|record| record.id().clone())
            .collect())
    }

    async fn read(&self, id: &TaskId) -> TaskStoreResult<TaskRecord> {
        let records = self.records.read().map_err(lock_error)?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| TaskStoreError::NotFound(id.clone()))
    }

    async fn write(&self, record: &TaskRecord) -> TaskStoreResult<()> {
        let mut records = self.records.write().map_err(lock_error)?;
        let stored = records
            .get_mut(record.id())
            .ok_or_else(|| TaskStoreError::NotFound(record.id().clone()))?;
        stored.ensure_valid_update(record)?;
        *stored = record.clone();
        Ok(())
    }

    async fn move_task(
        &self,
        id: &TaskId,
        from: TaskStatus,
        to: TaskStatus,
    ) -> TaskStoreResult<TaskRecord> {
        ensure_transition(id, from, to)?;
        let mut records = self.records.write().map_err(lock_error)?;
        let stored = records
            .get_mut(id)
            .filter(|record| record.status() == from)
            .ok_or_else(|| TaskStoreError::NotFound(id.clone()))?;
        let mut moved = stored.clone();
        moved.transition_to(to, &self.clock)?;
        *stored = moved.clone();
        Ok(moved)
    }
}
