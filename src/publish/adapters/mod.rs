//! Publisher adapters.

mod git;

pub use git::GitPublisher;
