//! When steps for session BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use super::world::{SessionWorld, TimedWork, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskgate::session::{SessionOptions, SessionOrchestrator};
use taskgate::task::{adapters::memory::FixedFileEstimate, services::TaskExecutor};

fn run_session(world: &mut SessionWorld, options: &SessionOptions) -> Result<(), eyre::Report> {
    let executor = TaskExecutor::new(
        Arc::clone(&world.store),
        Arc::new(world.clock.clone()),
        Arc::new(FixedFileEstimate(world.files_per_task)),
    );
    let work = TimedWork {
        clock: world.clock.clone(),
        per_task: world.work_per_task,
    };
    let orchestrator = SessionOrchestrator::new(
        executor,
        Arc::new(world.gate.clone()),
        Arc::new(work),
        Arc::new(world.clock.clone()),
    );
    let result = run_async(orchestrator.run(options)).wrap_err("run scenario session")?;
    world.result = Some(result);
    Ok(())
}

#[when("a session runs with a limit of {max_tasks:usize} tasks")]
fn session_runs(world: &mut SessionWorld, max_tasks: usize) -> Result<(), eyre::Report> {
    run_session(world, &SessionOptions::default().with_max_tasks(max_tasks))
}

#[when("a session runs with a limit of {max_tasks:usize} tasks and a budget of {max_files:usize} files")]
fn session_runs_with_budget(
    world: &mut SessionWorld,
    max_tasks: usize,
    max_files: usize,
) -> Result<(), eyre::Report> {
    run_session(
        world,
        &SessionOptions::default()
            .with_max_tasks(max_tasks)
            .with_max_files(max_files),
    )
}

#[when("a session runs with a limit of {max_tasks:usize} tasks and a timeout of {seconds:u64} seconds")]
fn session_runs_with_timeout(
    world: &mut SessionWorld,
    max_tasks: usize,
    seconds: u64,
) -> Result<(), eyre::Report> {
    run_session(
        world,
        &SessionOptions::default()
            .with_max_tasks(max_tasks)
            .with_timeout(Duration::from_secs(seconds)),
    )
}
