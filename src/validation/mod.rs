//! Validation gate: ordered external checks aggregated into one verdict.
//!
//! A gate runs every configured check (build, lint, documentation, format)
//! without short-circuiting and folds the per-check outcomes into a
//! [`ValidationResult`]. In strict mode a check's warnings count as errors.

mod command_gate;
pub mod config;
pub mod diagnostics;
mod gate;
mod result;
mod scripted;

pub use command_gate::CommandValidationGate;
pub use config::{CheckDefinition, CheckKind, ConfigError, GateConfig};
pub use gate::ValidationGate;
pub use result::{CheckFailure, CheckOutcome, ValidationResult};
pub use scripted::ScriptedValidationGate;

#[cfg(test)]
mod tests;
