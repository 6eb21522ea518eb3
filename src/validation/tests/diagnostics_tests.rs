//! Unit tests for diagnostic line extraction.

use crate::validation::diagnostics::{Diagnostics, parse};
use rstest::rstest;

#[rstest]
#[case("error: expected `;`", 1, 0)]
#[case("error[E0308]: mismatched types", 1, 0)]
#[case("warning: unused variable: `x`", 0, 1)]
#[case("warning[clippy::needless_return]: unneeded `return`", 0, 1)]
#[case("   error: indented diagnostics count", 1, 0)]
#[case("warning: `taskgate` (lib) generated 3 warnings", 0, 0)]
#[case("error: could not compile `taskgate` due to 2 previous errors", 0, 0)]
#[case("error: aborting due to 2 previous errors", 0, 0)]
#[case("warning: 2 warnings emitted", 0, 0)]
#[case("errors: not a diagnostic", 0, 0)]
#[case("note: error: nested", 0, 0)]
#[case("error[E0308 unterminated code", 0, 0)]
fn classifies_single_lines(#[case] line: &str, #[case] errors: usize, #[case] warnings: usize) {
    let found = parse([line]);
    assert_eq!(found.errors.len(), errors, "errors for {line:?}");
    assert_eq!(found.warnings.len(), warnings, "warnings for {line:?}");
}

#[rstest]
fn keeps_output_order_and_trims() {
    let output = "  Compiling taskgate v0.1.0\n\
                  warning: first\n\
                  error: second\n\
                  warning: third\n\
                  error: could not compile `taskgate`\n";

    let found = parse(output.lines());

    assert_eq!(
        found,
        Diagnostics {
            errors: vec!["error: second".to_owned()],
            warnings: vec!["warning: first".to_owned(), "warning: third".to_owned()],
        }
    );
}
