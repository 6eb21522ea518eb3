//! Markdown document format for task records.
//!
//! A document starts with the title heading, followed by a `Task Information`
//! block of labelled fields, the free-form body, and finally the progress log.
//! Parsing is tolerant of the two trailing spaces used as markdown line breaks
//! after metadata fields, of `IN PROGRESS` as a status spelling, and of
//! date-only progress entries.

use super::{
    DEFAULT_SECTION, PersistedTaskRecord, Priority, ProgressEntry, SourceReference, TaskId,
    TaskRecord, TaskStatus, task::single_line,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Timestamp layout used in metadata and progress entries.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const INFO_HEADING: &str = "## Task Information";
const PROGRESS_HEADING: &str = "## Progress Log";
const TIMESTAMP_LEN: usize = 19;
const DATE_LEN: usize = 10;

/// Errors raised while parsing a task document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The document has no `# title` heading.
    #[error("document has no title heading")]
    MissingTitle,

    /// A required metadata field is absent.
    #[error("document is missing the {0} field")]
    MissingField(&'static str),

    /// A metadata field could not be parsed.
    #[error("invalid {field} value '{value}'")]
    InvalidField {
        /// Field label.
        field: &'static str,
        /// Raw value.
        value: String,
    },

    /// A progress-log line could not be parsed.
    #[error("invalid progress log entry '{0}'")]
    InvalidProgressEntry(String),
}

/// Renders a record as a markdown document.
#[must_use]
pub fn render(record: &TaskRecord) -> String {
    let mut lines = vec![
        format!("# {}", record.title()),
        String::new(),
        INFO_HEADING.to_owned(),
        String::new(),
        format!("**Task ID**: `{}`  ", record.id()),
        format!("**Component**: {}  ", record.component()),
        format!("**Section**: {}  ", record.section()),
        format!("**Priority**: {}  ", record.priority()),
        format!("**Status**: {}  ", record.status()),
        format!(
            "**Created**: {}  ",
            record.created_at().format(TIMESTAMP_FORMAT)
        ),
    ];
    if let Some(source) = record.source() {
        lines.push(match source.line {
            Some(line) => format!("**Source**: `{}` (line {line})  ", source.file),
            None => format!("**Source**: `{}`  ", source.file),
        });
    }
    lines.push(String::new());

    if !record.body().is_empty() {
        lines.push(record.body().to_owned());
        lines.push(String::new());
    }

    lines.push(PROGRESS_HEADING.to_owned());
    lines.push(String::new());
    lines.extend(record.progress_log().iter().map(|entry| {
        format!(
            "- {}: {}",
            entry.recorded_at.format(TIMESTAMP_FORMAT),
            single_line(&entry.text)
        )
    }));

    let mut document = lines.join("\n");
    document.push('\n');
    document
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Region {
    Preamble,
    Info,
    Body,
    Progress,
}

#[derive(Default)]
struct Fields {
    task_id: Option<String>,
    component: Option<String>,
    section: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    created: Option<String>,
    source: Option<String>,
}

impl Fields {
    fn assign(&mut self, label: &str, value: String) {
        let slot = match label {
            "Task ID" => &mut self.task_id,
            "Component" => &mut self.component,
            "Section" => &mut self.section,
            "Priority" => &mut self.priority,
            "Status" => &mut self.status,
            "Created" => &mut self.created,
            "Source" => &mut self.source,
            _ => return,
        };
        *slot = Some(value);
    }
}

/// Parses a markdown document back into a record.
///
/// # Errors
///
/// Returns [`DocumentError`] when the title, a required field (`Task ID`,
/// `Component`, `Status`, `Created`), or a progress entry is missing or
/// malformed.
pub fn parse(text: &str) -> Result<TaskRecord, DocumentError> {
    let mut region = Region::Preamble;
    let mut title = None;
    let mut fields = Fields::default();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut progress_log = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.starts_with("## ") {
            region = match trimmed {
                INFO_HEADING => Region::Info,
                PROGRESS_HEADING => Region::Progress,
                _ => Region::Body,
            };
            if region == Region::Body {
                body_lines.push(trimmed);
            }
            continue;
        }

        match region {
            Region::Preamble => {
                if let Some(heading) = trimmed.strip_prefix("# ")
                    && title.is_none()
                {
                    title = Some(heading.trim().to_owned());
                }
            }
            Region::Info => {
                if let Some((label, value)) = split_field(trimmed) {
                    fields.assign(label, value.to_owned());
                } else if !trimmed.is_empty() {
                    region = Region::Body;
                    body_lines.push(trimmed);
                }
            }
            Region::Body => body_lines.push(trimmed),
            Region::Progress => {
                if let Some(entry) = parse_progress_line(trimmed)? {
                    progress_log.push(entry);
                }
            }
        }
    }

    let title = title
        .filter(|value| !value.is_empty())
        .ok_or(DocumentError::MissingTitle)?;
    let raw_id = strip_backticks(&fields.task_id.ok_or(DocumentError::MissingField("Task ID"))?);
    let id = TaskId::parse(raw_id.clone()).map_err(|_| DocumentError::InvalidField {
        field: "Task ID",
        value: raw_id,
    })?;
    let component = fields
        .component
        .ok_or(DocumentError::MissingField("Component"))?;
    let raw_status = fields.status.ok_or(DocumentError::MissingField("Status"))?;
    let status =
        TaskStatus::try_from(raw_status.as_str()).map_err(|_| DocumentError::InvalidField {
            field: "Status",
            value: raw_status.clone(),
        })?;
    let raw_created = fields.created.ok_or(DocumentError::MissingField("Created"))?;
    let created_at = parse_timestamp(&raw_created).ok_or_else(|| DocumentError::InvalidField {
        field: "Created",
        value: raw_created.clone(),
    })?;
    let priority = match fields.priority {
        Some(raw) => Priority::try_from(raw.as_str()).map_err(|_| DocumentError::InvalidField {
            field: "Priority",
            value: raw.clone(),
        })?,
        None => Priority::default(),
    };
    let source = fields.source.as_deref().and_then(parse_source);

    Ok(TaskRecord::from_persisted(PersistedTaskRecord {
        id,
        title,
        component,
        section: fields
            .section
            .unwrap_or_else(|| DEFAULT_SECTION.to_owned()),
        priority,
        status,
        created_at,
        source,
        progress_log,
        body: body_lines.join("\n").trim().to_owned(),
    }))
}

/// Splits `**Label**: value` into its label and trimmed value.
fn split_field(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix("**")?;
    let (label, value) = rest.split_once("**:")?;
    Some((label.trim(), value.trim()))
}

fn strip_backticks(value: &str) -> String {
    value.trim().trim_matches('`').trim().to_owned()
}

/// Parses "`file` (line N)"; an empty file name yields no reference.
fn parse_source(value: &str) -> Option<SourceReference> {
    let (file_part, rest) = match value.find(" (line ") {
        Some(index) => value.split_at(index),
        None => (value, ""),
    };
    let file = strip_backticks(file_part);
    if file.is_empty() {
        return None;
    }
    let line = rest
        .trim()
        .strip_prefix("(line ")
        .and_then(|tail| tail.strip_suffix(')'))
        .and_then(|digits| digits.trim().parse().ok());
    Some(SourceReference::new(file, line))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parses `- <timestamp>: <text>`. Blank lines and HTML comments yield `None`.
fn parse_progress_line(line: &str) -> Result<Option<ProgressEntry>, DocumentError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("<!--") {
        return Ok(None);
    }
    let invalid = || DocumentError::InvalidProgressEntry(trimmed.to_owned());
    let item = trimmed.strip_prefix("- ").ok_or_else(invalid)?;

    for stamp_len in [TIMESTAMP_LEN, DATE_LEN] {
        let (Some(stamp), Some(rest)) = (item.get(..stamp_len), item.get(stamp_len..)) else {
            continue;
        };
        let Some(recorded_at) = parse_timestamp(stamp) else {
            continue;
        };
        if let Some(text) = rest.strip_prefix(':') {
            return Ok(Some(ProgressEntry::new(recorded_at, text.trim())));
        }
    }
    Err(invalid())
}
