//! Extraction of error and warning lines from check output.

/// Diagnostics found in a check's combined output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// `error:` lines, in output order.
    pub errors: Vec<String>,
    /// `warning:` lines, in output order.
    pub warnings: Vec<String>,
}

/// Severity a diagnostic line starts with.
#[derive(Clone, Copy)]
enum Severity {
    Error,
    Warning,
}

/// Collects `error: ...`, `error[E0001]: ...`, `warning: ...` and
/// `warning[..]: ...` lines. Tool summaries such as "generated 3 warnings"
/// or "could not compile" are not diagnostics and are skipped.
#[must_use]
pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();
    for line in lines {
        let trimmed = line.trim();
        let Some(severity) = classify(trimmed) else {
            continue;
        };
        if is_summary(trimmed) {
            continue;
        }
        match severity {
            Severity::Error => diagnostics.errors.push(trimmed.to_owned()),
            Severity::Warning => diagnostics.warnings.push(trimmed.to_owned()),
        }
    }
    diagnostics
}

fn classify(line: &str) -> Option<Severity> {
    [("error", Severity::Error), ("warning", Severity::Warning)]
        .into_iter()
        .find_map(|(prefix, severity)| {
            let after_prefix = line.strip_prefix(prefix)?;
            let after_code = match after_prefix.strip_prefix('[') {
                Some(code) => code.split_once(']')?.1,
                None => after_prefix,
            };
            after_code.starts_with(':').then_some(severity)
        })
}

fn is_summary(line: &str) -> bool {
    const SUMMARIES: [&str; 4] = [
        "could not compile",
        "aborting due to",
        "build failed",
        "warnings emitted",
    ];
    (line.contains(" generated ") && line.contains(" warning"))
        || SUMMARIES.iter().any(|summary| line.contains(summary))
}
