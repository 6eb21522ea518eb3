//! Unit tests for the scripted runner used by adapter tests.

use std::time::Duration;

use crate::command::{
    CommandError, CommandRunner, CommandSpec, ScriptedCommandRunner, ScriptedResponse,
};
use eyre::ensure;
use rstest::rstest;

fn git(args: &[&str]) -> CommandSpec {
    CommandSpec::new("git", Duration::from_secs(30)).with_args(args.iter().copied())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn queued_responses_are_consumed_and_the_last_repeats() -> eyre::Result<()> {
    let runner = ScriptedCommandRunner::new()
        .fails("git push", 1, "rejected")
        .succeeds("git push", "ok");
    let spec = git(&["push"]);

    let first = runner.run(&spec).await?;
    let second = runner.run(&spec).await?;
    let third = runner.run(&spec).await?;

    ensure!(!first.success());
    ensure!(second.success() && third.success());
    ensure!(runner.invocations() == ["git push", "git push", "git push"]);
    ensure!(runner.timeouts() == [Duration::from_secs(30); 3]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scripted_failures_map_to_command_errors() -> eyre::Result<()> {
    let runner = ScriptedCommandRunner::new()
        .on("git fetch", ScriptedResponse::TimedOut)
        .on("git gc", ScriptedResponse::SpawnFailure("permission denied".to_owned()));

    ensure!(matches!(
        runner.run(&git(&["fetch"])).await,
        Err(CommandError::TimedOut { .. })
    ));
    ensure!(matches!(
        runner.run(&git(&["gc"])).await,
        Err(CommandError::Spawn { .. })
    ));
    ensure!(matches!(
        runner.run(&git(&["status"])).await,
        Err(CommandError::Spawn { .. })
    ));
    Ok(())
}
