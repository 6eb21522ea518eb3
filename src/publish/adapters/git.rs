//! Publisher that commits and pushes with the `git` CLI.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::command::{CommandOutput, CommandRunner, CommandSpec};
use crate::publish::ports::{PublishError, PublishOutcome, PublishRequest, PublishResult, Publisher};

const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Publishes by running `git add`, `git commit` and `git push` in `workdir`.
#[derive(Clone)]
pub struct GitPublisher {
    runner: Arc<dyn CommandRunner>,
    workdir: Utf8PathBuf,
    timeout: Duration,
}

impl GitPublisher {
    /// Creates a publisher for the repository at `workdir`.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, workdir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
            timeout: DEFAULT_GIT_TIMEOUT,
        }
    }

    /// Sets the per-command timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn git<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> CommandSpec {
        CommandSpec::new("git", self.timeout)
            .with_args(args)
            .in_dir(self.workdir.clone())
    }

    async fn run_git<'a>(
        &self,
        args: impl IntoIterator<Item = &'a str> + Send,
    ) -> PublishResult<CommandOutput> {
        let spec = self.git(args);
        debug!(command = %spec, "running git");
        Ok(self.runner.run(&spec).await?)
    }
}

impl std::fmt::Debug for GitPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitPublisher")
            .field("workdir", &self.workdir)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn failure_detail(output: &CommandOutput) -> String {
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        format!("exit code {:?}", output.exit_code)
    } else {
        stderr.to_owned()
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    #[instrument(skip_all, fields(task_id = %request.task_id, target = %request.target))]
    async fn publish(&self, request: &PublishRequest) -> PublishResult<PublishOutcome> {
        let probe = self.run_git(["rev-parse", "--is-inside-work-tree"]).await?;
        if !probe.success() {
            warn!("not a git repository, skipping publish");
            return Ok(PublishOutcome::Skipped);
        }

        let staged = self.run_git(["add", "-A"]).await?;
        if !staged.success() {
            return Err(PublishError::Stage(failure_detail(&staged)));
        }

        let diff = self.run_git(["diff", "--cached", "--name-only"]).await?;
        if diff.stdout.trim().is_empty() {
            info!("no staged changes, nothing to commit");
            return Ok(PublishOutcome::NothingToCommit);
        }

        let message = request.commit_message();
        let commit = self.run_git(["commit", "-m", message.as_str()]).await?;
        if !commit.success() {
            return Err(PublishError::Commit(failure_detail(&commit)));
        }
        info!("committed task transition");

        let push_warning = match self.run_git(["push"]).await {
            Ok(output) if output.success() => None,
            Ok(output) => Some(failure_detail(&output)),
            Err(err) => Some(err.to_string()),
        };
        if let Some(detail) = &push_warning {
            warn!(detail = %detail, "push failed, commit kept locally");
        } else {
            info!("pushed task transition");
        }
        Ok(PublishOutcome::Committed {
            pushed: push_warning.is_none(),
            push_warning,
        })
    }
}
