//! Bounded execution sessions.
//!
//! A session runs the pre-flight gate, selects suitable TODO tasks, and
//! drives each one through begin, work, file budget, post-task gate and
//! completion. The first task failure halts the session, and no task is left
//! IN_PROGRESS when it returns.

mod options;
mod orchestrator;
mod result;
mod work;

pub use options::SessionOptions;
pub use orchestrator::{SessionError, SessionOrchestrator};
pub use result::{
    FailureKind, SessionOutcome, SessionResult, StageResult, TaskFailure, ValidationStage,
};
pub use work::{SimulatedWork, TaskWork, WorkError};

#[cfg(test)]
mod tests;
