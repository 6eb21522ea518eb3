//! Session test harness.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::deadline::Deadline;
use crate::publish::Publisher;
use crate::session::{SessionOrchestrator, TaskWork, WorkError};
use crate::task::{
    adapters::memory::{FixedFileEstimate, InMemoryTaskStore},
    domain::{NewTaskRecord, TaskId, TaskRecord, TaskStatus},
    ports::TaskStore,
    services::TaskExecutor,
};
use crate::test_support::ManualClock;
use crate::validation::ScriptedValidationGate;

pub(super) type Store = InMemoryTaskStore<ManualClock>;
pub(super) type Orchestrator = SessionOrchestrator<Store, ManualClock>;

/// Work that records each task, optionally failing or consuming clock time.
#[derive(Debug, Default)]
pub(super) struct RecordingWork {
    clock: Option<ManualClock>,
    elapsed_per_task: Duration,
    failing: BTreeSet<TaskId>,
    performed: Mutex<Vec<TaskId>>,
}

impl RecordingWork {
    pub(super) fn consuming(clock: ManualClock, elapsed_per_task: Duration) -> Self {
        Self {
            clock: Some(clock),
            elapsed_per_task,
            ..Self::default()
        }
    }

    pub(super) fn failing_on(id: &TaskId) -> Self {
        Self {
            failing: BTreeSet::from([id.clone()]),
            ..Self::default()
        }
    }

    pub(super) fn performed(&self) -> Vec<TaskId> {
        self.performed.lock().expect("work lock").clone()
    }
}

#[async_trait]
impl TaskWork for RecordingWork {
    async fn perform(&self, record: &TaskRecord, _deadline: &Deadline) -> Result<(), WorkError> {
        self.performed
            .lock()
            .expect("work lock")
            .push(record.id().clone());
        if let Some(clock) = &self.clock {
            clock.advance(self.elapsed_per_task);
        }
        if self.failing.contains(record.id()) {
            return Err(WorkError::Failed("generator crashed".to_owned()));
        }
        Ok(())
    }
}

/// Work that, on its first call, completes `target` directly in the store,
/// as if another actor finished it before the session reached it.
pub(super) struct ClaimingWork {
    store: Arc<Store>,
    target: Mutex<Option<TaskId>>,
}

impl ClaimingWork {
    pub(super) fn new(store: Arc<Store>, target: TaskId) -> Self {
        Self {
            store,
            target: Mutex::new(Some(target)),
        }
    }
}

#[async_trait]
impl TaskWork for ClaimingWork {
    async fn perform(&self, _record: &TaskRecord, _deadline: &Deadline) -> Result<(), WorkError> {
        let target = self.target.lock().expect("target lock").take();
        if let Some(id) = target {
            self.store
                .move_task(&id, TaskStatus::Todo, TaskStatus::InProgress)
                .await
                .expect("claim target");
            self.store
                .move_task(&id, TaskStatus::InProgress, TaskStatus::Completed)
                .await
                .expect("finish target");
        }
        Ok(())
    }
}

pub(super) struct Harness {
    pub clock: ManualClock,
    pub store: Arc<Store>,
    pub gate: ScriptedValidationGate,
    pub ids: Vec<TaskId>,
}

impl Harness {
    /// Seeds one suitable TODO task per title, in the given order.
    pub(super) async fn with_tasks(titles: &[&str]) -> Self {
        let clock = ManualClock::new();
        let store = Arc::new(InMemoryTaskStore::new(clock.clone()));
        let mut ids = Vec::with_capacity(titles.len());
        for title in titles {
            let record = TaskRecord::new(
                NewTaskRecord::new("core", *title).with_body("Add a unit test for this path"),
                &clock,
            )
            .expect("valid record");
            store.insert(&record).await.expect("insert should succeed");
            ids.push(record.id().clone());
        }
        Self {
            clock,
            store,
            gate: ScriptedValidationGate::passing(),
            ids,
        }
    }

    pub(super) fn id(&self, index: usize) -> TaskId {
        self.ids.get(index).cloned().expect("seeded task index")
    }

    pub(super) fn executor(&self, estimate: usize) -> TaskExecutor<Store, ManualClock> {
        TaskExecutor::new(
            Arc::clone(&self.store),
            Arc::new(self.clock.clone()),
            Arc::new(FixedFileEstimate(estimate)),
        )
    }

    pub(super) fn orchestrator(&self, work: Arc<dyn TaskWork>) -> Orchestrator {
        self.orchestrator_with(self.executor(1), work)
    }

    pub(super) fn publishing(
        &self,
        publisher: Arc<dyn Publisher>,
        work: Arc<dyn TaskWork>,
    ) -> Orchestrator {
        self.orchestrator_with(self.executor(1).with_publisher(publisher), work)
    }

    pub(super) fn orchestrator_with(
        &self,
        executor: TaskExecutor<Store, ManualClock>,
        work: Arc<dyn TaskWork>,
    ) -> Orchestrator {
        SessionOrchestrator::new(
            executor,
            Arc::new(self.gate.clone()),
            work,
            Arc::new(self.clock.clone()),
        )
    }

    pub(super) async fn status(&self, index: usize) -> TaskStatus {
        self.store
            .read(&self.id(index))
            .await
            .expect("seeded task should exist")
            .status()
    }

    pub(super) async fn queue(&self, status: TaskStatus) -> Vec<TaskId> {
        self.store.list(status).await.expect("list should succeed")
    }
}
