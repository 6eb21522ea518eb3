//! Then steps for session BDD scenarios.

use super::world::{SessionWorld, run_async};
use rstest_bdd_macros::then;
use taskgate::task::{domain::TaskStatus, ports::TaskStore};

fn queue_len(world: &SessionWorld, status: TaskStatus) -> Result<usize, eyre::Report> {
    Ok(run_async(world.store.list(status))?.len())
}

#[then("{count:usize} tasks were attempted")]
fn tasks_attempted(world: &SessionWorld, count: usize) -> Result<(), eyre::Report> {
    let attempted = world.result()?.tasks_attempted;
    eyre::ensure!(attempted == count, "expected {count} attempts, got {attempted}");
    Ok(())
}

#[then("{count:usize} tasks failed")]
fn tasks_failed(world: &SessionWorld, count: usize) -> Result<(), eyre::Report> {
    let failed = world.result()?.tasks_failed;
    eyre::ensure!(failed == count, "expected {count} failures, got {failed}");
    Ok(())
}

#[then("{count:usize} tasks are completed")]
fn tasks_completed(world: &SessionWorld, count: usize) -> Result<(), eyre::Report> {
    let completed = queue_len(world, TaskStatus::Completed)?;
    eyre::ensure!(
        completed == count && world.result()?.tasks_completed == count,
        "expected {count} completed tasks, found {completed}"
    );
    Ok(())
}

#[then("{count:usize} tasks remain in TODO")]
fn tasks_remain(world: &SessionWorld, count: usize) -> Result<(), eyre::Report> {
    let todo = queue_len(world, TaskStatus::Todo)?;
    eyre::ensure!(todo == count, "expected {count} TODO tasks, found {todo}");
    Ok(())
}

#[then("no task is in progress")]
fn nothing_in_progress(world: &SessionWorld) -> Result<(), eyre::Report> {
    let in_progress = queue_len(world, TaskStatus::InProgress)?;
    eyre::ensure!(in_progress == 0, "{in_progress} tasks left in progress");
    Ok(())
}

#[then(r#"the session reports "{text}""#)]
fn session_reports(world: &SessionWorld, text: String) -> Result<(), eyre::Report> {
    let errors = &world.result()?.errors;
    eyre::ensure!(
        errors.iter().any(|error| error.contains(&text)),
        "no error mentions {text:?}: {errors:?}"
    );
    Ok(())
}

#[then("the session timed out")]
fn session_timed_out(world: &SessionWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(world.result()?.timed_out(), "session did not time out");
    Ok(())
}
