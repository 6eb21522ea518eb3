//! Identifier types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum characters kept from the component slug.
const COMPONENT_SLUG_LEN: usize = 20;
/// Maximum characters kept from the title slug.
const TITLE_SLUG_LEN: usize = 30;

/// Stable task identifier, also used as the storage key and file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Derives the identifier for a task from its component and title.
    ///
    /// Both parts are slugged and truncated before being joined with `-`, so
    /// the same component and title always produce the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskId`] when neither part contains
    /// any ASCII word characters.
    pub fn derive(component: &str, title: &str) -> Result<Self, TaskDomainError> {
        let component_slug = truncate_slug(&slugify(component), COMPONENT_SLUG_LEN);
        let title_slug = truncate_slug(&slugify(title), TITLE_SLUG_LEN);
        let joined = match (component_slug.is_empty(), title_slug.is_empty()) {
            (false, false) => format!("{component_slug}-{title_slug}"),
            (true, _) => title_slug,
            (false, true) => component_slug,
        };
        Self::parse(joined)
    }

    /// Validates an existing identifier, e.g. a file stem read from storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskId`] when the value is empty or
    /// contains characters outside `[a-z0-9_-]`.
    pub fn parse(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let is_valid = !raw.is_empty()
            && raw
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_');
        if !is_valid {
            return Err(TaskDomainError::InvalidTaskId(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskId {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TaskId> for String {
    fn from(value: TaskId) -> Self {
        value.0
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases ASCII word characters, turns whitespace and hyphen runs into a
/// single `-`, and drops everything else.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;
    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        }
    }
    slug
}

fn truncate_slug(slug: &str, max_chars: usize) -> String {
    let truncated: String = slug.chars().take(max_chars).collect();
    truncated.trim_end_matches('-').to_owned()
}
