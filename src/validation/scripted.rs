//! Scripted validation gate for tests and dry runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{ValidationGate, ValidationResult};
use crate::deadline::Deadline;

/// Gate replaying queued results in order; the last result repeats.
///
/// With nothing queued every run passes. Each call's `strict` flag is
/// recorded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedValidationGate {
    state: Arc<Mutex<ScriptedState>>,
}

#[derive(Debug, Default)]
struct ScriptedState {
    results: VecDeque<ValidationResult>,
    calls: Vec<bool>,
}

impl ScriptedValidationGate {
    /// Creates a gate that always passes.
    #[must_use]
    pub fn passing() -> Self {
        Self::default()
    }

    /// Queues `result` as the next verdict.
    #[must_use]
    pub fn then(self, result: ValidationResult) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.results.push_back(result);
        }
        self
    }

    /// Queues a failing verdict with `errors`.
    #[must_use]
    pub fn then_fail<I, S>(self, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.then(ValidationResult::failing(errors))
    }

    /// Queues a passing verdict.
    #[must_use]
    pub fn then_pass(self) -> Self {
        self.then(ValidationResult::passing())
    }

    /// Returns how many times the gate ran.
    #[must_use]
    pub fn runs(&self) -> usize {
        self.state.lock().map(|state| state.calls.len()).unwrap_or(0)
    }

    /// Returns the `strict` flag of each run, in order.
    #[must_use]
    pub fn strict_flags(&self) -> Vec<bool> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ValidationGate for ScriptedValidationGate {
    async fn run(&self, strict: bool, _deadline: &Deadline) -> ValidationResult {
        let Ok(mut state) = self.state.lock() else {
            return ValidationResult::failing(["scripted gate state poisoned"]);
        };
        state.calls.push(strict);
        let next = if state.results.len() > 1 {
            state.results.pop_front()
        } else {
            state.results.front().cloned()
        };
        next.unwrap_or_else(ValidationResult::passing)
    }
}
