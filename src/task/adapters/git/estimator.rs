//! File estimator counting paths changed in a git working tree.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::command::{CommandRunner, CommandSpec};
use crate::task::{
    domain::TaskRecord,
    ports::{FileEstimateError, FileEstimateResult, FileEstimator},
};

const GIT_STATUS_TIMEOUT: Duration = Duration::from_secs(30);

/// Counts uncommitted paths reported by `git status --porcelain`.
///
/// Paths under any ignored prefix (typically the tasks directory, whose
/// documents change on every transition) are not counted. Renames count
/// once, by destination.
#[derive(Clone)]
pub struct GitChangedFiles {
    runner: Arc<dyn CommandRunner>,
    workdir: Utf8PathBuf,
    ignored_prefixes: Vec<String>,
}

impl GitChangedFiles {
    /// Creates an estimator inspecting the repository at `workdir`.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, workdir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
            ignored_prefixes: Vec::new(),
        }
    }

    /// Excludes paths starting with `prefix` from the count.
    #[must_use]
    pub fn ignoring(mut self, prefix: impl Into<String>) -> Self {
        self.ignored_prefixes.push(prefix.into());
        self
    }

    fn is_ignored(&self, path: &str) -> bool {
        self.ignored_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

impl std::fmt::Debug for GitChangedFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitChangedFiles")
            .field("workdir", &self.workdir)
            .field("ignored_prefixes", &self.ignored_prefixes)
            .finish_non_exhaustive()
    }
}

/// Extracts the path from one porcelain v1 status line.
fn porcelain_path(line: &str) -> Option<&str> {
    let entry = line.get(3..)?.trim();
    let destination = entry.rsplit_once(" -> ").map_or(entry, |(_, to)| to);
    let path = destination.trim_matches('"');
    (!path.is_empty()).then_some(path)
}

#[async_trait]
impl FileEstimator for GitChangedFiles {
    async fn estimate(&self, record: &TaskRecord) -> FileEstimateResult<usize> {
        let spec = CommandSpec::new("git", GIT_STATUS_TIMEOUT)
            .with_args(["status", "--porcelain=v1", "-uall"])
            .in_dir(self.workdir.clone());
        let output = self
            .runner
            .run(&spec)
            .await
            .map_err(FileEstimateError::failed)?;
        if !output.success() {
            return Err(FileEstimateError::failed(io::Error::other(format!(
                "git status exited with {:?}: {}",
                output.exit_code,
                output.stderr.trim()
            ))));
        }

        let paths: BTreeSet<&str> = output
            .stdout
            .lines()
            .filter_map(porcelain_path)
            .filter(|path| !self.is_ignored(path))
            .collect();
        debug!(task_id = %record.id(), changed = paths.len(), "estimated changed files");
        Ok(paths.len())
    }
}
