//! Command runner port.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// Runs external commands with a timeout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `spec` to completion or until its timeout fires.
    ///
    /// A non-zero exit status is not an error; callers interpret
    /// [`CommandOutput::exit_code`] themselves.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::TimedOut`] when the timeout elapses (the child
    /// is killed) and [`CommandError::Spawn`] when the process cannot start.
    async fn run(&self, spec: &CommandSpec) -> CommandResult<CommandOutput>;
}

/// A single command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path.
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
    /// Working directory; the current directory when `None`.
    pub workdir: Option<Utf8PathBuf>,
    /// Wall-clock limit for the whole invocation.
    pub timeout: Duration,
}

impl CommandSpec {
    /// Creates a spec with no arguments, run in the current directory.
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            workdir: None,
            timeout,
        }
    }

    /// Appends arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn in_dir(mut self, workdir: impl Into<Utf8PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// Replaces the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the program and arguments joined by spaces.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl CommandOutput {
    /// Creates output for a process that exited with `exit_code`.
    #[must_use]
    pub fn exited(exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
            ..Self::default()
        }
    }

    /// Sets captured standard output.
    #[must_use]
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Sets captured standard error.
    #[must_use]
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Returns `true` when the process exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Iterates over stdout lines followed by stderr lines.
    #[must_use]
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().chain(self.stderr.lines())
    }
}

/// Errors raised when a command cannot run to completion.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The command did not finish within its timeout.
    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    TimedOut {
        /// Command line.
        command: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The process could not be started or awaited.
    #[error("`{command}` could not be executed: {source}")]
    Spawn {
        /// Command line.
        command: String,
        /// Underlying I/O failure.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl CommandError {
    /// Wraps a spawn failure for `spec`.
    #[must_use]
    pub fn spawn(spec: &CommandSpec, source: std::io::Error) -> Self {
        Self::Spawn {
            command: spec.command_line(),
            source: Arc::new(source),
        }
    }
}
