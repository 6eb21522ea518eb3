//! Per-check outcomes and the aggregated validation verdict.

use std::fmt;
use std::time::Duration;

use super::CheckKind;

/// Why a single check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckFailure {
    /// The check exceeded its timeout.
    Timeout,
    /// The check command could not be executed.
    ExecutionFailed,
    /// The check ran and reported problems.
    FoundIssues,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeout => "timed out",
            Self::ExecutionFailed => "could not be executed",
            Self::FoundIssues => "found issues",
        })
    }
}

/// Result of one check, after strict-mode adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Check name from the gate configuration.
    pub name: String,
    /// Check category.
    pub kind: CheckKind,
    /// Failure reason, `None` when the check passed.
    pub failure: Option<CheckFailure>,
    /// Errors, each prefixed with the check name.
    pub errors: Vec<String>,
    /// Warnings, each prefixed with the check name.
    pub warnings: Vec<String>,
    /// Time spent running the check.
    pub duration: Duration,
}

impl CheckOutcome {
    /// Returns `true` when the check passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Aggregated verdict of one gate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// `false` if any error was reported, or any warning in strict mode.
    pub success: bool,
    /// Errors from every check, in check order.
    pub errors: Vec<String>,
    /// Warnings from every check, in check order.
    pub warnings: Vec<String>,
    /// Number of checks that ran.
    pub checks_run: usize,
    /// Total time spent running checks.
    pub duration: Duration,
    /// Whether warnings were promoted to failures.
    pub strict: bool,
    /// Individual check outcomes, in check order.
    pub checks: Vec<CheckOutcome>,
}

impl ValidationResult {
    /// Folds check outcomes into a verdict.
    #[must_use]
    pub fn from_checks(checks: Vec<CheckOutcome>, strict: bool, duration: Duration) -> Self {
        let errors: Vec<String> = checks
            .iter()
            .flat_map(|check| check.errors.iter().cloned())
            .collect();
        let warnings: Vec<String> = checks
            .iter()
            .flat_map(|check| check.warnings.iter().cloned())
            .collect();
        let success = errors.is_empty()
            && !(strict && !warnings.is_empty())
            && checks.iter().all(CheckOutcome::passed);
        Self {
            success,
            errors,
            warnings,
            checks_run: checks.len(),
            duration,
            strict,
            checks,
        }
    }

    /// A passing result with no checks.
    #[must_use]
    pub fn passing() -> Self {
        Self::from_checks(Vec::new(), false, Duration::ZERO)
    }

    /// A failing result carrying `errors`, for fakes and summaries.
    #[must_use]
    pub fn failing<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let errors: Vec<String> = errors.into_iter().map(Into::into).collect();
        Self {
            success: false,
            errors,
            warnings: Vec::new(),
            checks_run: 0,
            duration: Duration::ZERO,
            strict: false,
            checks: Vec::new(),
        }
    }

    /// Returns the first failed check, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&CheckOutcome> {
        self.checks.iter().find(|check| !check.passed())
    }
}
