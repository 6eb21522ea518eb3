//! Child-process command runner backed by `tokio::process`.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::command::ports::{CommandError, CommandOutput, CommandResult, CommandRunner, CommandSpec};

/// Default cap on captured bytes per stream.
const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1024 * 1024;

/// Runs commands as child processes.
///
/// The child is killed when its timeout elapses. Each output stream is
/// truncated to the configured byte limit before decoding.
#[derive(Debug, Clone, Copy)]
pub struct ProcessCommandRunner {
    output_limit_bytes: usize,
}

impl ProcessCommandRunner {
    /// Creates a runner with the default 1 MiB per-stream output limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }

    /// Creates a runner with a custom per-stream output limit.
    #[must_use]
    pub const fn with_output_limit(output_limit_bytes: usize) -> Self {
        Self { output_limit_bytes }
    }

    fn decode(&self, mut bytes: Vec<u8>) -> String {
        if bytes.len() > self.output_limit_bytes {
            warn!(
                captured = bytes.len(),
                limit = self.output_limit_bytes,
                "command output truncated"
            );
            bytes.truncate(self.output_limit_bytes);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Default for ProcessCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    #[instrument(skip_all, fields(command = %spec, timeout_secs = spec.timeout.as_secs()))]
    async fn run(&self, spec: &CommandSpec) -> CommandResult<CommandOutput> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(workdir) = &spec.workdir {
            command.current_dir(workdir.as_std_path());
        }

        debug!("spawning child process");
        let child = command
            .spawn()
            .map_err(|err| CommandError::spawn(spec, err))?;

        // Dropping the timed-out future drops the child, which kills it.
        let output = match tokio::time::timeout(spec.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|err| CommandError::spawn(spec, err))?,
            Err(_) => {
                warn!("command timed out, killing");
                return Err(CommandError::TimedOut {
                    command: spec.command_line(),
                    timeout: spec.timeout,
                });
            }
        };

        debug!(exit_code = ?output.status.code(), "command finished");
        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: self.decode(output.stdout),
            stderr: self.decode(output.stderr),
        })
    }
}
