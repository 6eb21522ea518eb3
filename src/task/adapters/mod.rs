//! Adapter implementations for task ports.

pub mod git;
pub mod markdown;
pub mod memory;
