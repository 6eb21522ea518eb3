//! In-memory adapters for task lifecycle tests and dry runs.

mod estimator;
mod store;

pub use estimator::FixedFileEstimate;
pub use store::InMemoryTaskStore;
