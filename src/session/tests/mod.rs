//! Unit tests for sessions.

mod support;
