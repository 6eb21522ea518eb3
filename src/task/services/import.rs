//! Creation of TODO records from exported issue JSON.

use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::task::{
    domain::{NewTaskRecord, Priority, SourceReference, TaskId, TaskRecord},
    ports::TaskStore,
};

const DEFAULT_COMPONENT: &str = "Unknown";
const DESCRIPTION_HEADING: &str = "### Description";
const MISSING_DESCRIPTION: &str = "No description available";

/// One issue as exported by the checklist converter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueRecord {
    /// Issue title, possibly decorated with an emoji and `[Tag]` prefix.
    pub title: String,
    /// Owning component.
    #[serde(default)]
    pub component: Option<String>,
    /// Checklist section.
    #[serde(default)]
    pub section: Option<String>,
    /// `high`, `medium` or `low`.
    #[serde(default)]
    pub priority: Option<String>,
    /// Issue body; its `### Description` section becomes the task description.
    #[serde(default)]
    pub body: String,
    /// Checklist file the issue was extracted from.
    #[serde(default)]
    pub source_file: Option<String>,
    /// Line within `source_file`.
    #[serde(default)]
    pub source_line: Option<u32>,
}

impl IssueRecord {
    /// Builds the task creation request for this issue.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the priority is not recognised.
    pub fn to_request(&self) -> Result<NewTaskRecord, String> {
        let component = self
            .component
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(DEFAULT_COMPONENT);
        let description = extract_description(&self.body);
        let mut request = NewTaskRecord::new(component, clean_title(&self.title)).with_body(
            format!(
                "## Description\n\n{}",
                description.as_deref().unwrap_or(MISSING_DESCRIPTION)
            ),
        );
        if let Some(section) = &self.section {
            request = request.with_section(section.clone());
        }
        if let Some(raw) = &self.priority {
            let priority = Priority::try_from(raw.as_str()).map_err(|err| err.to_string())?;
            request = request.with_priority(priority);
        }
        if let Some(file) = self.source_file.as_deref().filter(|file| !file.is_empty()) {
            request = request.with_source(SourceReference::new(file, self.source_line));
        }
        Ok(request)
    }
}

/// Errors raised before any record is created.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    /// The input is not a JSON array of issues.
    #[error("invalid issue JSON: {0}")]
    Parse(Arc<serde_json::Error>),
}

/// An issue that did not become a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRejection {
    /// Issue title as given.
    pub title: String,
    /// Why the issue was skipped.
    pub reason: String,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Identifiers of created tasks, in input order.
    pub created: Vec<TaskId>,
    /// Skipped issues, in input order.
    pub rejected: Vec<ImportRejection>,
}

/// Parses a JSON array of issues.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] when `json` is not an array of issues.
pub fn parse_issues(json: &str) -> Result<Vec<IssueRecord>, ImportError> {
    serde_json::from_str(json).map_err(|err| ImportError::Parse(Arc::new(err)))
}

/// Creates a TODO record per issue. Invalid and duplicate issues are
/// reported and skipped without aborting the import.
pub async fn import_issues<S, C>(store: &S, clock: &C, issues: &[IssueRecord]) -> ImportReport
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    let mut report = ImportReport::default();
    for issue in issues {
        let created = match issue.to_request() {
            Ok(request) => match TaskRecord::new(request, clock) {
                Ok(record) => store
                    .insert(&record)
                    .await
                    .map(|()| record.id().clone())
                    .map_err(|err| err.to_string()),
                Err(err) => Err(err.to_string()),
            },
            Err(reason) => Err(reason),
        };
        match created {
            Ok(id) => {
                info!(task_id = %id, "imported task");
                report.created.push(id);
            }
            Err(reason) => {
                warn!(title = %issue.title, reason = %reason, "skipped issue");
                report.rejected.push(ImportRejection {
                    title: issue.title.clone(),
                    reason,
                });
            }
        }
    }
    report
}

/// Strips a leading decoration such as `"🔧 [Network] "` from a title.
///
/// Only non-word characters may precede the bracketed tag; otherwise the
/// title is returned trimmed but unchanged.
#[must_use]
pub fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(open) = trimmed.find('[') else {
        return trimmed.to_owned();
    };
    let decoration = trimmed.get(..open).unwrap_or_default();
    if decoration
        .chars()
        .any(|ch| ch.is_alphanumeric() || ch == '_')
    {
        return trimmed.to_owned();
    }
    trimmed
        .get(open..)
        .and_then(|rest| rest.split_once(']'))
        .map_or_else(|| trimmed.to_owned(), |(_, title)| title.trim().to_owned())
}

/// Returns the non-blank lines of the body's `### Description` section.
#[must_use]
pub fn extract_description(body: &str) -> Option<String> {
    let mut lines = body.lines();
    lines.find(|line| line.starts_with(DESCRIPTION_HEADING))?;
    let description: Vec<&str> = lines
        .take_while(|line| !line.starts_with("###"))
        .filter(|line| !line.trim().is_empty())
        .collect();
    let joined = description.join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
