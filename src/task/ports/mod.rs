//! Port contracts for the task lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod estimator;
pub mod store;

pub use estimator::{FileEstimateError, FileEstimateResult, FileEstimator};
pub use store::{TaskStore, TaskStoreError, TaskStoreResult, ensure_transition};
