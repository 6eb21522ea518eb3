//! Keyword classifier deciding whether a task may run unattended.

/// Keywords marking work that is safe to automate.
pub const SUITABLE_KEYWORDS: [&str; 9] = [
    "unit test",
    "documentation",
    "comment",
    "format",
    "style",
    "lint",
    "typo",
    "readme",
    "example",
];

/// Keywords marking work that needs a human. These always win.
pub const RISKY_KEYWORDS: [&str; 8] = [
    "security",
    "authentication",
    "network protocol",
    "data migration",
    "breaking change",
    "api change",
    "database",
    "critical",
];

/// Returns whether `text` describes work suitable for unattended execution.
///
/// Matching is case-insensitive and by substring. Any risky keyword rejects
/// the text regardless of suitable keywords; text matching neither set is
/// rejected.
#[must_use]
pub fn is_suitable(text: &str) -> bool {
    let haystack = text.to_lowercase();
    if RISKY_KEYWORDS
        .iter()
        .any(|keyword| haystack.contains(keyword))
    {
        return false;
    }
    SUITABLE_KEYWORDS
        .iter()
        .any(|keyword| haystack.contains(keyword))
}
