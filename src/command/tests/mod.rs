//! Unit tests for command runners.

mod scripted_runner_tests;
