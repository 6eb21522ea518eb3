//! Taskgate: bounded, validation-gated task lifecycle orchestration.
//!
//! Work items live as markdown records in three status queues (TODO,
//! IN_PROGRESS, COMPLETED). A session picks tasks that are safe for
//! unattended execution, gates every transition behind external checks,
//! and bounds itself by task count, file budget and wall-clock deadline,
//! rolling a task back to TODO on any failure.
//!
//! # Architecture
//!
//! Taskgate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure task records, state machine and document format
//! - **Ports**: Trait interfaces for storage, commands, publishing and checks
//! - **Adapters**: Markdown and in-memory stores, process runners, git
//!
//! # Modules
//!
//! - [`task`]: Records, stores, suitability filter and the task executor
//! - [`validation`]: Validation gate and check configuration
//! - [`session`]: The bounded session orchestrator
//! - [`publish`]: Commit and push of completed tasks
//! - [`command`]: External command execution

pub mod command;
pub mod deadline;
pub mod logging;
pub mod publish;
pub mod session;
pub mod task;
pub mod validation;

#[cfg(test)]
mod test_support;
