//! External command execution.
//!
//! Validation checks, the git publisher and the git-backed file estimator all
//! shell out through the narrow [`ports::CommandRunner`] capability so tests
//! can substitute a scripted runner instead of spawning processes.

pub mod adapters;
pub mod ports;

pub use ports::{CommandError, CommandOutput, CommandResult, CommandRunner, CommandSpec};
pub use adapters::{ProcessCommandRunner, ScriptedCommandRunner, ScriptedResponse};

#[cfg(test)]
mod tests;
