//! Scripted command runner for tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::command::ports::{CommandError, CommandOutput, CommandResult, CommandRunner, CommandSpec};

/// Canned reply for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedResponse {
    /// The command ran and produced this output.
    Output(CommandOutput),
    /// The command exceeded its timeout.
    TimedOut,
    /// The command could not be spawned.
    SpawnFailure(String),
}

/// Command runner replaying canned responses without spawning processes.
///
/// Responses are keyed by the full command line. Queued responses are
/// consumed in order and the last one repeats. Unscripted commands fail to
/// spawn with a "not found" error. Every invocation is recorded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommandRunner {
    state: Arc<Mutex<ScriptState>>,
}

#[derive(Debug, Default)]
struct ScriptState {
    responses: HashMap<String, VecDeque<ScriptedResponse>>,
    invocations: Vec<CommandSpec>,
}

impl ScriptedCommandRunner {
    /// Creates a runner with no scripted commands.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` for the command line `command_line`.
    #[must_use]
    pub fn on(self, command_line: &str, response: ScriptedResponse) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state
                .responses
                .entry(command_line.to_owned())
                .or_default()
                .push_back(response);
        }
        self
    }

    /// Queues a successful exit with the given stdout.
    #[must_use]
    pub fn succeeds(self, command_line: &str, stdout: &str) -> Self {
        self.on(
            command_line,
            ScriptedResponse::Output(CommandOutput::exited(0).with_stdout(stdout)),
        )
    }

    /// Queues a failing exit with the given stderr.
    #[must_use]
    pub fn fails(self, command_line: &str, exit_code: i32, stderr: &str) -> Self {
        self.on(
            command_line,
            ScriptedResponse::Output(CommandOutput::exited(exit_code).with_stderr(stderr)),
        )
    }

    /// Returns every command line run so far, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| {
                state
                    .invocations
                    .iter()
                    .map(CommandSpec::command_line)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the timeouts passed with each invocation, in order.
    #[must_use]
    pub fn timeouts(&self) -> Vec<Duration> {
        self.state
            .lock()
            .map(|state| state.invocations.iter().map(|spec| spec.timeout).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for ScriptedCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> CommandResult<CommandOutput> {
        let response = {
            let mut state = self.state.lock().map_err(|err| {
                CommandError::spawn(spec, std::io::Error::other(err.to_string()))
            })?;
            state.invocations.push(spec.clone());
            state
                .responses
                .get_mut(&spec.command_line())
                .and_then(|queue| {
                    if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    }
                })
        };

        match response {
            Some(ScriptedResponse::Output(output)) => Ok(output),
            Some(ScriptedResponse::TimedOut) => Err(CommandError::TimedOut {
                command: spec.command_line(),
                timeout: spec.timeout,
            }),
            Some(ScriptedResponse::SpawnFailure(reason)) => Err(CommandError::spawn(
                spec,
                std::io::Error::other(reason),
            )),
            None => Err(CommandError::spawn(
                spec,
                std::io::Error::new(std::io::ErrorKind::NotFound, "command not scripted"),
            )),
        }
    }
}
