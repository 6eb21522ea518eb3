//! Session results.

use std::fmt;
use std::time::Duration;

use crate::task::domain::TaskId;
use crate::validation::ValidationResult;

/// When a gate run happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationStage {
    /// Before any candidate was selected.
    Preflight,
    /// After the work on a task.
    PostTask(TaskId),
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preflight => f.write_str("pre-flight"),
            Self::PostTask(id) => write!(f, "post-task {id}"),
        }
    }
}

/// A gate verdict tagged with its stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    /// When the gate ran.
    pub stage: ValidationStage,
    /// The gate's verdict.
    pub result: ValidationResult,
}

/// Why a task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The TODO to IN_PROGRESS move failed.
    BeginFailed,
    /// The task's work reported an error.
    WorkFailed,
    /// The task modified more files than allowed.
    FileBudgetExceeded,
    /// Post-task validation failed.
    ValidationFailed,
    /// Committing the completed task failed.
    PublishFailure,
    /// The session deadline elapsed while the task was in progress.
    SessionTimeout,
    /// Any other store or estimator error.
    Unexpected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeginFailed => "begin failed",
            Self::WorkFailed => "work failed",
            Self::FileBudgetExceeded => "file budget exceeded",
            Self::ValidationFailed => "post-task validation failed",
            Self::PublishFailure => "publish failed",
            Self::SessionTimeout => "session timed out",
            Self::Unexpected => "unexpected error",
        })
    }
}

/// One failed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Failed task.
    pub task_id: TaskId,
    /// Failure category.
    pub kind: FailureKind,
    /// Detail.
    pub message: String,
    /// Whether the task is back in TODO.
    pub rolled_back: bool,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.task_id, self.kind, self.message)
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every selected candidate was processed.
    Completed,
    /// No TODO task passed the filters.
    NoCandidates,
    /// Pre-flight validation failed; nothing was attempted.
    PreflightFailed,
    /// A task failure stopped the session.
    Halted,
    /// The session deadline elapsed.
    TimedOut,
    /// Candidates were reported without being run.
    DryRun,
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Completed => "completed",
            Self::NoCandidates => "no suitable tasks found",
            Self::PreflightFailed => "pre-flight validation failed",
            Self::Halted => "halted after task failure",
            Self::TimedOut => "timed out",
            Self::DryRun => "dry run",
        })
    }
}

/// Aggregated report of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    /// How the session ended.
    pub outcome: SessionOutcome,
    /// Candidates the session started on (or reported, in a dry run).
    pub tasks_attempted: usize,
    /// Tasks moved to COMPLETED (or reported, in a dry run).
    pub tasks_completed: usize,
    /// Tasks that failed.
    pub tasks_failed: usize,
    /// Sum of file estimates of completed tasks.
    pub total_files_modified: usize,
    /// Pre-flight gate errors and per-task errors, in order.
    pub errors: Vec<String>,
    /// Non-fatal warnings such as failed pushes.
    pub warnings: Vec<String>,
    /// Typed task failures, in order.
    pub failures: Vec<TaskFailure>,
    /// Gate verdicts, in order.
    pub validations: Vec<StageResult>,
    /// Identifiers of completed (or dry-run reported) tasks.
    pub completed: Vec<TaskId>,
    /// Wall-clock duration of the session.
    pub duration: Duration,
}

impl SessionResult {
    pub(super) const fn new(outcome: SessionOutcome) -> Self {
        Self {
            outcome,
            tasks_attempted: 0,
            tasks_completed: 0,
            tasks_failed: 0,
            total_files_modified: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            failures: Vec::new(),
            validations: Vec::new(),
            completed: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub(super) fn record_failure(&mut self, failure: TaskFailure) {
        self.tasks_failed += 1;
        self.errors.push(failure.to_string());
        self.failures.push(failure);
    }

    /// Returns `true` when a session timeout was reported.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.outcome == SessionOutcome::TimedOut
    }
}
