//! Validation gate running each check as an external command.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use super::{
    CheckDefinition, CheckFailure, CheckOutcome, GateConfig, ValidationGate, ValidationResult,
    diagnostics,
};
use crate::command::{CommandError, CommandRunner, CommandSpec};
use crate::deadline::Deadline;

/// Gate executing the checks of a [`GateConfig`] through a [`CommandRunner`].
#[derive(Clone)]
pub struct CommandValidationGate {
    runner: Arc<dyn CommandRunner>,
    config: GateConfig,
    workdir: Option<Utf8PathBuf>,
}

impl CommandValidationGate {
    /// Creates a gate running `config`'s checks in the current directory.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, config: GateConfig) -> Self {
        Self {
            runner,
            config,
            workdir: None,
        }
    }

    /// Runs checks in `workdir`.
    #[must_use]
    pub fn in_dir(mut self, workdir: impl Into<Utf8PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// Returns the configured checks.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    async fn run_check(
        &self,
        check: &CheckDefinition,
        strict: bool,
        deadline: &Deadline,
    ) -> CheckOutcome {
        let started = Instant::now();
        let mut outcome = CheckOutcome {
            name: check.name.clone(),
            kind: check.kind,
            failure: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            duration: std::time::Duration::ZERO,
        };

        if deadline.is_expired() {
            outcome.failure = Some(CheckFailure::Timeout);
            outcome
                .errors
                .push(format!("{}: session deadline reached before check ran", check.name));
            return outcome;
        }

        let mut spec = CommandSpec::new(&check.program, deadline.clamp(check.timeout()))
            .with_args(check.args.iter().cloned());
        if let Some(workdir) = &self.workdir {
            spec = spec.in_dir(workdir.clone());
        }

        match self.runner.run(&spec).await {
            Err(CommandError::TimedOut { timeout, .. }) => {
                outcome.failure = Some(CheckFailure::Timeout);
                outcome.errors.push(format!(
                    "{}: timed out after {}s",
                    check.name,
                    timeout.as_secs()
                ));
            }
            Err(err @ CommandError::Spawn { .. }) => {
                outcome.failure = Some(CheckFailure::ExecutionFailed);
                outcome.errors.push(format!("{}: {err}", check.name));
            }
            Ok(output) => {
                let found = diagnostics::parse(output.lines());
                let prefix = |line: String| format!("{}: {line}", check.name);
                outcome.errors = found.errors.into_iter().map(prefix).collect();
                let warnings: Vec<String> = found.warnings.into_iter().map(prefix).collect();
                if strict {
                    outcome.errors.extend(warnings);
                } else {
                    outcome.warnings = warnings;
                }
                if !output.success() && outcome.errors.is_empty() {
                    outcome.errors.push(match output.exit_code {
                        Some(code) => format!("{}: exited with status {code}", check.name),
                        None => format!("{}: terminated by signal", check.name),
                    });
                }
                if !outcome.errors.is_empty() {
                    outcome.failure = Some(CheckFailure::FoundIssues);
                }
            }
        }
        outcome.duration = started.elapsed();
        outcome
    }
}

impl std::fmt::Debug for CommandValidationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandValidationGate")
            .field("config", &self.config)
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ValidationGate for CommandValidationGate {
    #[instrument(skip_all, fields(strict = strict, checks = self.config.checks.len()))]
    async fn run(&self, strict: bool, deadline: &Deadline) -> ValidationResult {
        let started = Instant::now();
        let mut checks = Vec::with_capacity(self.config.checks.len());
        for check in &self.config.checks {
            let outcome = self.run_check(check, strict, deadline).await;
            match outcome.failure {
                None => info!(
                    check = %outcome.name,
                    warnings = outcome.warnings.len(),
                    "check passed"
                ),
                Some(failure) => warn!(
                    check = %outcome.name,
                    reason = %failure,
                    errors = outcome.errors.len(),
                    "check failed"
                ),
            }
            checks.push(outcome);
        }
        let result = ValidationResult::from_checks(checks, strict, started.elapsed());
        info!(
            success = result.success,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validation finished"
        );
        result
    }
}
