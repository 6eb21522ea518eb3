//! Task record aggregate root and related lifecycle types.

use super::{Priority, TaskDomainError, TaskId, TaskStatus};
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Section used when the converter did not provide one.
pub const DEFAULT_SECTION: &str = "General";

/// Where a task was originally extracted from. Provenance only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    /// Originating file, relative to the repository root.
    pub file: String,
    /// One-based line number within `file`, when known.
    pub line: Option<u32>,
}

impl SourceReference {
    /// Creates a source reference.
    #[must_use]
    pub fn new(file: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// Single timestamped entry of a task's progress log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Free-form entry text.
    pub text: String,
}

impl ProgressEntry {
    /// Creates a progress entry.
    ///
    /// Multi-line text is folded onto one line, joining the non-blank lines
    /// with `"; "`.
    #[must_use]
    pub fn new(recorded_at: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            recorded_at,
            text: single_line(&text.into()),
        }
    }
}

/// Folds `text` onto one line. A progress entry is exactly one list item.
pub(super) fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Request payload for creating a new TODO task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskRecord {
    title: String,
    component: String,
    section: Option<String>,
    priority: Priority,
    source: Option<SourceReference>,
    body: String,
}

impl NewTaskRecord {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(component: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            component: component.into(),
            section: None,
            priority: Priority::default(),
            source: None,
            body: String::new(),
        }
    }

    /// Sets the checklist section the task came from.
    #[must_use]
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Sets the task priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the provenance reference.
    #[must_use]
    pub fn with_source(mut self, source: SourceReference) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the free-form body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Parameter object for reconstructing a persisted task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskRecord {
    /// Persisted identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted component.
    pub component: String,
    /// Persisted checklist section.
    pub section: String,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted provenance, if any.
    pub source: Option<SourceReference>,
    /// Persisted progress log, oldest first.
    pub progress_log: Vec<ProgressEntry>,
    /// Persisted free-form body.
    pub body: String,
}

/// Task record aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskId,
    title: String,
    component: String,
    section: String,
    priority: Priority,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    source: Option<SourceReference>,
    progress_log: Vec<ProgressEntry>,
    body: String,
}

impl TaskRecord {
    /// Creates a new TODO record and logs its creation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] or
    /// [`TaskDomainError::EmptyComponent`] when a required field is blank, and
    /// [`TaskDomainError::InvalidTaskId`] when no identifier can be derived.
    pub fn new(request: NewTaskRecord, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = request.title.trim().to_owned();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let component = request.component.trim().to_owned();
        if component.is_empty() {
            return Err(TaskDomainError::EmptyComponent);
        }
        let id = TaskId::derive(&component, &title)?;
        let section = request
            .section
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SECTION.to_owned());
        let created_at = now(clock);

        Ok(Self {
            id,
            title,
            component,
            section,
            priority: request.priority,
            status: TaskStatus::Todo,
            created_at,
            source: request.source,
            progress_log: vec![ProgressEntry::new(created_at, "Task created")],
            body: request.body.trim().to_owned(),
        })
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskRecord) -> Self {
        Self {
            id: data.id,
            title: data.title,
            component: data.component,
            section: data.section,
            priority: data.priority,
            status: data.status,
            created_at: data.created_at,
            source: data.source,
            progress_log: data.progress_log,
            body: data.body,
        }
    }

    /// Decomposes the record into its persisted fields.
    #[must_use]
    pub fn into_persisted(self) -> PersistedTaskRecord {
        PersistedTaskRecord {
            id: self.id,
            title: self.title,
            component: self.component,
            section: self.section,
            priority: self.priority,
            status: self.status,
            created_at: self.created_at,
            source: self.source,
            progress_log: self.progress_log,
            body: self.body,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the component the task belongs to.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Returns the checklist section.
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Returns the task priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the provenance reference, if any.
    #[must_use]
    pub const fn source(&self) -> Option<&SourceReference> {
        self.source.as_ref()
    }

    /// Returns the progress log, oldest entry first.
    #[must_use]
    pub fn progress_log(&self) -> &[ProgressEntry] {
        &self.progress_log
    }

    /// Returns the free-form body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replaces the free-form body. Surrounding whitespace is not kept.
    pub fn set_body(&mut self, body: &str) {
        body.trim().clone_into(&mut self.body);
    }

    /// Moves the record to `target` and logs the change.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the state
    /// machine has no such edge; the record is left untouched.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusTransition {
                task_id: self.id.clone(),
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.record_progress(
            format!("Status changed to {}", target.queue_name()),
            clock,
        );
        Ok(())
    }

    /// Appends an entry to the progress log.
    pub fn record_progress(&mut self, text: impl Into<String>, clock: &impl Clock) {
        self.progress_log.push(ProgressEntry::new(now(clock), text));
    }

    /// Text the suitability filter classifies: title and body.
    #[must_use]
    pub fn suitability_text(&self) -> String {
        format!("{}\n{}", self.title, self.body)
    }

    /// Case-insensitive substring match of `filter` against the component or
    /// the body.
    #[must_use]
    pub fn matches_filter(&self, filter: &str) -> bool {
        let needle = filter.trim().to_lowercase();
        needle.is_empty()
            || self.component.to_lowercase().contains(&needle)
            || self.body.to_lowercase().contains(&needle)
    }

    /// Checks that `next` is a legal in-place update of this stored record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::StatusChangedByWrite`] when `next` carries a
    /// different status, or [`TaskDomainError::ProgressLogRewritten`] when the
    /// stored log is not a prefix of `next`'s log.
    pub fn ensure_valid_update(&self, next: &Self) -> Result<(), TaskDomainError> {
        if next.status != self.status {
            return Err(TaskDomainError::StatusChangedByWrite {
                task_id: self.id.clone(),
                stored: self.status,
                requested: next.status,
            });
        }
        if !next.progress_log.starts_with(&self.progress_log) {
            return Err(TaskDomainError::ProgressLogRewritten(self.id.clone()));
        }
        Ok(())
    }
}

/// Current time at the one-second precision task documents persist.
fn now(clock: &impl Clock) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(0)
}
