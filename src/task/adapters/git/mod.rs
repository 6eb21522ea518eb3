//! Git-backed task adapters.

mod estimator;

pub use estimator::GitChangedFiles;
