//! Validation gate port.

use async_trait::async_trait;

use super::ValidationResult;
use crate::deadline::Deadline;

/// Runs the configured checks and reports a single verdict.
///
/// Check failures are part of the result, never an `Err`: a gate always
/// produces a [`ValidationResult`].
#[async_trait]
pub trait ValidationGate: Send + Sync {
    /// Runs every check in order, bounding each by `deadline`.
    async fn run(&self, strict: bool, deadline: &Deadline) -> ValidationResult;
}
