//! Unit tests for publishing.
