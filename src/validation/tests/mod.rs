//! Unit tests for the validation gate.

mod diagnostics_tests;
