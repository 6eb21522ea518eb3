//! Shared world state for session BDD scenarios.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use rstest::fixture;
use taskgate::deadline::Deadline;
use taskgate::session::{SessionResult, TaskWork, WorkError};
use taskgate::task::{adapters::memory::InMemoryTaskStore, domain::TaskRecord};
use taskgate::validation::ScriptedValidationGate;

/// Clock that only moves when scenario work advances it.
#[derive(Debug, Clone)]
pub struct ScenarioClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ScenarioClock {
    fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Utc::now())),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).expect("duration fits a time delta");
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }
}

impl Clock for ScenarioClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Work that consumes a fixed amount of scenario time per task.
pub struct TimedWork {
    pub clock: ScenarioClock,
    pub per_task: Duration,
}

#[async_trait]
impl TaskWork for TimedWork {
    async fn perform(&self, _record: &TaskRecord, _deadline: &Deadline) -> Result<(), WorkError> {
        self.clock.advance(self.per_task);
        Ok(())
    }
}

/// Scenario world for session behaviour tests.
pub struct SessionWorld {
    pub clock: ScenarioClock,
    pub store: Arc<InMemoryTaskStore<ScenarioClock>>,
    pub gate: ScriptedValidationGate,
    pub files_per_task: usize,
    pub work_per_task: Duration,
    pub result: Option<SessionResult>,
}

impl SessionWorld {
    /// Creates a world with an empty store and a passing gate.
    #[must_use]
    pub fn new() -> Self {
        let clock = ScenarioClock::new();
        Self {
            store: Arc::new(InMemoryTaskStore::new(clock.clone())),
            clock,
            gate: ScriptedValidationGate::passing(),
            files_per_task: 1,
            work_per_task: Duration::ZERO,
            result: None,
        }
    }

    /// Returns the last session result.
    ///
    /// # Errors
    ///
    /// Returns an error when no session has run yet.
    pub fn result(&self) -> Result<&SessionResult, eyre::Report> {
        self.result
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no session has run in this scenario"))
    }
}

impl Default for SessionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SessionWorld {
    SessionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
