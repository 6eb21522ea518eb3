//! Publishing of task transitions to version control.
//!
//! Completing a task stages the working tree, commits it with a message
//! naming the task and its new status, and pushes. A failed push is reported
//! as a warning on an otherwise successful publish; a failed commit is an
//! error.

pub mod adapters;
pub mod ports;

pub use adapters::GitPublisher;
pub use ports::{PublishError, PublishOutcome, PublishRequest, PublishResult, Publisher};

#[cfg(test)]
mod tests;
