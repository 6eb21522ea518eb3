//! Given steps for session BDD scenarios.

use std::time::Duration;

use super::world::{SessionWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskgate::task::{
    domain::{NewTaskRecord, TaskRecord},
    ports::TaskStore,
};

#[given("{count:usize} suitable TODO tasks")]
fn suitable_tasks(world: &mut SessionWorld, count: usize) -> Result<(), eyre::Report> {
    for index in 0..count {
        let record = TaskRecord::new(
            NewTaskRecord::new("core", format!("Add unit test {index:02}"))
                .with_body("## Description\n\nAdd a unit test for the parser."),
            &world.clock,
        )?;
        run_async(world.store.insert(&record)).wrap_err("seed scenario task")?;
    }
    Ok(())
}

#[given(r#"pre-flight validation reports "{error}""#)]
fn preflight_fails(world: &mut SessionWorld, error: String) {
    world.gate = world.gate.clone().then_fail([error]);
}

#[given(r#"post-task validation reports "{error}""#)]
fn post_task_fails(world: &mut SessionWorld, error: String) {
    world.gate = world.gate.clone().then_pass().then_fail([error]);
}

#[given("every task modifies {files:usize} files")]
fn task_modifies_files(world: &mut SessionWorld, files: usize) {
    world.files_per_task = files;
}

#[given("each task takes {seconds:u64} seconds of work")]
fn task_takes_time(world: &mut SessionWorld, seconds: u64) {
    world.work_per_task = Duration::from_secs(seconds);
}
