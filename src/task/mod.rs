//! Task records and their lifecycle.
//!
//! Records move through TODO, IN_PROGRESS and COMPLETED queues. Only
//! `TaskStore::move_task` changes a record's queue, and only along the
//! edges of the status state machine. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Executor, selection, import and index services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
