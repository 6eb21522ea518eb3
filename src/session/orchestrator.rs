//! The bounded session loop.

use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{Instant, error::Elapsed};
use tracing::{info, instrument, warn};

use super::{
    FailureKind, SessionOptions, SessionOutcome, SessionResult, StageResult, TaskFailure,
    TaskWork, ValidationStage,
};
use crate::deadline::Deadline;
use crate::task::{
    domain::{TaskId, TaskRecord, TaskStatus},
    ports::{TaskStore, TaskStoreError},
    services::{ExecutorError, TaskExecutor, select_candidates},
};
use crate::validation::{ValidationGate, ValidationResult};

const TIMEOUT_MESSAGE: &str = "session timeout elapsed";

/// Errors that end a session abnormally.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// TODO tasks could not be listed or read.
    #[error("candidate selection failed: {0}")]
    Selection(#[from] TaskStoreError),
}

/// What happened to one candidate.
enum TaskRun {
    Completed { files: usize, warning: Option<String> },
    BeginFailed(TaskFailure),
    Failed(TaskFailure),
}

/// Runs sessions against one store, gate and work implementation.
pub struct SessionOrchestrator<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    executor: TaskExecutor<S, C>,
    gate: Arc<dyn ValidationGate>,
    work: Arc<dyn TaskWork>,
    clock: Arc<C>,
}

/// Awaits `future`, giving up once `deadline` passes.
async fn bounded<F: Future>(deadline: &Deadline, future: F) -> Result<F::Output, Elapsed> {
    match deadline.remaining() {
        Some(left) => tokio::time::timeout(left, future).await,
        None => Ok(future.await),
    }
}

impl<S, C> SessionOrchestrator<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(
        executor: TaskExecutor<S, C>,
        gate: Arc<dyn ValidationGate>,
        work: Arc<dyn TaskWork>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            executor,
            gate,
            work,
            clock,
        }
    }

    /// Runs one bounded session.
    ///
    /// Task failures, validation failures and timeouts are reported in the
    /// [`SessionResult`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Selection`] when TODO tasks cannot be listed
    /// or read during candidate selection.
    #[instrument(skip_all, fields(
        max_tasks = options.max_tasks,
        timeout_secs = options.timeout.as_secs(),
        dry_run = options.dry_run
    ))]
    pub async fn run(&self, options: &SessionOptions) -> Result<SessionResult, SessionError> {
        let started = Instant::now();
        let clock: Arc<dyn Clock + Send + Sync> = self.clock.clone();
        let deadline = Deadline::after(clock, options.timeout);
        let mut result = self.run_within(options, &deadline).await?;
        result.duration = started.elapsed();
        info!(
            outcome = %result.outcome,
            attempted = result.tasks_attempted,
            completed = result.tasks_completed,
            failed = result.tasks_failed,
            "session finished"
        );
        Ok(result)
    }

    async fn run_within(
        &self,
        options: &SessionOptions,
        deadline: &Deadline,
    ) -> Result<SessionResult, SessionError> {
        let mut result = SessionResult::new(SessionOutcome::Completed);
        if options.skip_validation {
            warn!("validation skipped");
        } else {
            let Some(preflight) = self.validate(options, deadline).await else {
                return Ok(timed_out(result));
            };
            let passed = preflight.success;
            let errors = preflight.errors.clone();
            result.validations.push(StageResult {
                stage: ValidationStage::Preflight,
                result: preflight,
            });
            if !passed {
                warn!(errors = errors.len(), "pre-flight validation failed");
                result.outcome = SessionOutcome::PreflightFailed;
                result.errors = errors;
                return Ok(result);
            }
        }
        self.run_candidates(options, deadline, result).await
    }

    async fn run_candidates(
        &self,
        options: &SessionOptions,
        deadline: &Deadline,
        mut result: SessionResult,
    ) -> Result<SessionResult, SessionError> {
        if deadline.is_expired() {
            return Ok(timed_out(result));
        }
        let store = self.executor.store();
        let selection = bounded(
            deadline,
            select_candidates(
                store.as_ref(),
                options.component_filter.as_deref(),
                options.max_tasks,
            ),
        )
        .await;
        let Ok(selected) = selection else {
            return Ok(timed_out(result));
        };
        let candidates = selected?;
        info!(candidates = candidates.len(), "selected candidates");

        if candidates.is_empty() {
            result.outcome = SessionOutcome::NoCandidates;
            return Ok(result);
        }
        if options.dry_run {
            result.outcome = SessionOutcome::DryRun;
            result.tasks_attempted = candidates.len();
            result.tasks_completed = candidates.len();
            result.completed = candidates;
            return Ok(result);
        }

        for id in candidates {
            if deadline.is_expired() {
                return Ok(timed_out(result));
            }
            result.tasks_attempted += 1;
            match self.run_task(&id, options, deadline, &mut result).await {
                TaskRun::Completed { files, warning } => {
                    result.tasks_completed += 1;
                    result.total_files_modified += files;
                    result.warnings.extend(warning);
                    result.completed.push(id);
                }
                TaskRun::BeginFailed(failure) => {
                    warn!(task_id = %id, error = %failure.message, "could not begin task");
                    result.record_failure(failure);
                }
                TaskRun::Failed(failure) => {
                    warn!(task_id = %id, kind = %failure.kind, "task failed, halting session");
                    result.outcome = if failure.kind == FailureKind::SessionTimeout {
                        SessionOutcome::TimedOut
                    } else {
                        SessionOutcome::Halted
                    };
                    result.record_failure(failure);
                    break;
                }
            }
        }
        Ok(result)
    }

    /// Runs the gate, `None` when the deadline cut it short.
    async fn validate(
        &self,
        options: &SessionOptions,
        deadline: &Deadline,
    ) -> Option<ValidationResult> {
        if deadline.is_expired() {
            return None;
        }
        bounded(deadline, self.gate.run(options.strict_validation, deadline))
            .await
            .ok()
    }

    #[instrument(skip_all, fields(task_id = %id))]
    async fn run_task(
        &self,
        id: &TaskId,
        options: &SessionOptions,
        deadline: &Deadline,
        result: &mut SessionResult,
    ) -> TaskRun {
        let record = match bounded(deadline, self.executor.begin(id)).await {
            Ok(Ok(record)) => record,
            Ok(Err(err)) => {
                return TaskRun::BeginFailed(TaskFailure {
                    task_id: id.clone(),
                    kind: FailureKind::BeginFailed,
                    message: err.to_string(),
                    rolled_back: false,
                });
            }
            Err(_) => return TaskRun::Failed(self.timeout_abort(id).await),
        };

        if let Err(failure) = self.perform_work(&record, deadline).await {
            return TaskRun::Failed(failure);
        }

        let budget = self.executor.execute_with_budget(id, options.max_files);
        let files = match bounded(deadline, budget).await {
            Ok(Ok(files)) => files,
            Ok(Err(err @ ExecutorError::FileBudgetExceeded { .. })) => {
                return TaskRun::Failed(TaskFailure {
                    task_id: id.clone(),
                    kind: FailureKind::FileBudgetExceeded,
                    message: err.to_string(),
                    rolled_back: true,
                });
            }
            Ok(Err(err)) => {
                let message = err.to_string();
                return TaskRun::Failed(self.abort(id, FailureKind::Unexpected, &message).await);
            }
            Err(_) => return TaskRun::Failed(self.timeout_abort(id).await),
        };

        if !options.skip_validation {
            let Some(verdict) = self.validate(options, deadline).await else {
                return TaskRun::Failed(self.timeout_abort(id).await);
            };
            let passed = verdict.success;
            let message = if verdict.errors.is_empty() {
                "warnings reported in strict mode".to_owned()
            } else {
                verdict.errors.join("; ")
            };
            result.validations.push(StageResult {
                stage: ValidationStage::PostTask(id.clone()),
                result: verdict,
            });
            if !passed {
                let failure = self.abort(id, FailureKind::ValidationFailed, &message).await;
                return TaskRun::Failed(failure);
            }
        }

        if deadline.is_expired() {
            return TaskRun::Failed(self.timeout_abort(id).await);
        }
        match bounded(deadline, self.executor.complete(id)).await {
            Ok(Ok(completion)) => TaskRun::Completed {
                files,
                warning: completion
                    .push_warning()
                    .map(|detail| format!("{id}: push failed: {detail}")),
            },
            Ok(Err(err)) => {
                let kind = if matches!(err, ExecutorError::PublishFailure { .. }) {
                    FailureKind::PublishFailure
                } else {
                    FailureKind::Unexpected
                };
                TaskRun::Failed(self.abort(id, kind, &err.to_string()).await)
            }
            Err(_) => TaskRun::Failed(self.timeout_abort(id).await),
        }
    }

    /// Performs the task's work between two deadline checks.
    async fn perform_work(
        &self,
        record: &TaskRecord,
        deadline: &Deadline,
    ) -> Result<(), TaskFailure> {
        let id = record.id();
        if deadline.is_expired() {
            return Err(self.timeout_abort(id).await);
        }
        match bounded(deadline, self.work.perform(record, deadline)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                return Err(self.abort(id, FailureKind::WorkFailed, &err.to_string()).await);
            }
            Err(_) => return Err(self.timeout_abort(id).await),
        }
        if deadline.is_expired() {
            return Err(self.timeout_abort(id).await);
        }
        Ok(())
    }

    async fn timeout_abort(&self, id: &TaskId) -> TaskFailure {
        self.abort(id, FailureKind::SessionTimeout, TIMEOUT_MESSAGE).await
    }

    /// Best-effort rollback of an IN_PROGRESS task after a failure.
    async fn abort(&self, id: &TaskId, kind: FailureKind, message: &str) -> TaskFailure {
        let rolled_back = match self.executor.store().read(id).await {
            Ok(record) if record.status() == TaskStatus::InProgress => {
                match self.executor.rollback(id, &format!("{kind}: {message}")).await {
                    Ok(_) => true,
                    Err(err) => {
                        warn!(task_id = %id, error = %err, "rollback failed");
                        false
                    }
                }
            }
            Ok(record) => record.status() == TaskStatus::Todo,
            Err(err) => {
                warn!(task_id = %id, error = %err, "could not inspect task for rollback");
                false
            }
        };
        TaskFailure {
            task_id: id.clone(),
            kind,
            message: message.to_owned(),
            rolled_back,
        }
    }
}

fn timed_out(mut result: SessionResult) -> SessionResult {
    warn!("session deadline reached");
    result.outcome = SessionOutcome::TimedOut;
    result.errors.push(TIMEOUT_MESSAGE.to_owned());
    result
}
