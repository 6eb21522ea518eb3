//! Queue statistics and the generated tasks README.

use chrono::{DateTime, Utc};
use minijinja::{Environment, context};
use serde::Serialize;
use thiserror::Error;

use crate::task::{
    domain::{TaskStatus, document::TIMESTAMP_FORMAT},
    ports::{TaskStore, TaskStoreError},
};

const INDEX_TEMPLATE: &str = include_str!("templates/index.md");

/// Number of records per queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Records in TODO.
    pub todo: usize,
    /// Records in IN_PROGRESS.
    pub in_progress: usize,
    /// Records in COMPLETED.
    pub completed: usize,
}

impl TaskStats {
    /// Counts the records in each queue.
    ///
    /// # Errors
    ///
    /// Returns the store error when a queue cannot be listed.
    pub async fn collect<S: TaskStore + ?Sized>(store: &S) -> Result<Self, TaskStoreError> {
        Ok(Self {
            todo: store.list(TaskStatus::Todo).await?.len(),
            in_progress: store.list(TaskStatus::InProgress).await?.len(),
            completed: store.list(TaskStatus::Completed).await?.len(),
        })
    }

    /// Records across all queues.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.todo + self.in_progress + self.completed
    }

    /// Share of completed records, in percent rounded to one decimal.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "task counts are small and the result is display-only"
    )]
    pub fn completion_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let percent = self.completed as f64 * 100.0 / total as f64;
        (percent * 10.0).round() / 10.0
    }
}

/// Errors raised while building the index.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// A queue could not be listed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
    /// The index template failed to render.
    #[error("failed to render task index: {0}")]
    Template(String),
}

#[derive(Serialize)]
struct IndexEntry {
    id: String,
    title: String,
}

#[derive(Serialize)]
struct QueueSection {
    label: &'static str,
    directory: &'static str,
    tasks: Vec<IndexEntry>,
}

const fn queue_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "TODO",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Completed => "Completed",
    }
}

/// Renders the tasks README with statistics and per-queue links.
///
/// Records that cannot be read are listed by identifier.
///
/// # Errors
///
/// Returns [`IndexError`] when a queue cannot be listed or the template
/// fails to render.
pub async fn render_index<S: TaskStore + ?Sized>(
    store: &S,
    generated_at: DateTime<Utc>,
) -> Result<String, IndexError> {
    let mut queues = Vec::with_capacity(TaskStatus::ALL.len());
    let mut stats = TaskStats::default();
    for status in TaskStatus::ALL {
        let ids = store.list(status).await?;
        match status {
            TaskStatus::Todo => stats.todo = ids.len(),
            TaskStatus::InProgress => stats.in_progress = ids.len(),
            TaskStatus::Completed => stats.completed = ids.len(),
        }
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            let title = store
                .read(&id)
                .await
                .map_or_else(|_| id.to_string(), |record| record.title().to_owned());
            tasks.push(IndexEntry {
                id: id.into(),
                title,
            });
        }
        queues.push(QueueSection {
            label: queue_label(status),
            directory: status.queue_name(),
            tasks,
        });
    }

    Environment::new()
        .render_str(
            INDEX_TEMPLATE,
            context! {
                generated_at => generated_at.format(TIMESTAMP_FORMAT).to_string(),
                stats => context! {
                    total => stats.total(),
                    todo => stats.todo,
                    in_progress => stats.in_progress,
                    completed => stats.completed,
                    completion_percent => stats.completion_percent(),
                },
                queues => queues,
            },
        )
        .map_err(|err| IndexError::Template(err.to_string()))
}
