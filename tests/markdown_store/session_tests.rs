//! Full sessions over a markdown tasks directory.

use std::sync::Arc;

use super::helpers::{TempStore, suitable_record, temp_store};
use async_trait::async_trait;
use eyre::ensure;
use mockable::DefaultClock;
use rstest::rstest;
use taskgate::publish::{PublishError, PublishOutcome, PublishRequest, PublishResult, Publisher};
use taskgate::session::{
    FailureKind, SessionOptions, SessionOrchestrator, SessionOutcome, SimulatedWork,
};
use taskgate::task::{
    adapters::{markdown::MarkdownTaskStore, memory::FixedFileEstimate},
    domain::TaskStatus,
    ports::TaskStore,
    services::TaskExecutor,
};
use taskgate::validation::ScriptedValidationGate;

type Session = SessionOrchestrator<MarkdownTaskStore<DefaultClock>, DefaultClock>;

/// Publisher whose commit always fails with git's multi-line complaint.
struct RejectingPublisher;

#[async_trait]
impl Publisher for RejectingPublisher {
    async fn publish(&self, _request: &PublishRequest) -> PublishResult<PublishOutcome> {
        Err(PublishError::Commit(
            "Author identity unknown\n\n*** Please tell me who you are.".to_owned(),
        ))
    }
}

fn executor(
    store: MarkdownTaskStore<DefaultClock>,
    estimate: usize,
) -> TaskExecutor<MarkdownTaskStore<DefaultClock>, DefaultClock> {
    TaskExecutor::new(
        Arc::new(store),
        Arc::new(DefaultClock),
        Arc::new(FixedFileEstimate(estimate)),
    )
}

fn orchestrator(
    store: MarkdownTaskStore<DefaultClock>,
    gate: ScriptedValidationGate,
    estimate: usize,
) -> Session {
    session_with(executor(store, estimate), gate)
}

fn session_with(
    executor: TaskExecutor<MarkdownTaskStore<DefaultClock>, DefaultClock>,
    gate: ScriptedValidationGate,
) -> Session {
    SessionOrchestrator::new(
        executor,
        Arc::new(gate),
        Arc::new(SimulatedWork),
        Arc::new(DefaultClock),
    )
}

async fn seed(temp_store: &TempStore) -> eyre::Result<()> {
    for title in ["Add a test", "Add b test", "Add c test"] {
        temp_store
            .store
            .insert(&suitable_record("core", title))
            .await?;
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_tasks_land_in_the_completed_directory(
    temp_store: TempStore,
) -> eyre::Result<()> {
    seed(&temp_store).await?;
    let TempStore { dir, root, store } = temp_store;
    let session = orchestrator(store, ScriptedValidationGate::passing(), 2);

    let result = session
        .run(&SessionOptions::default().with_max_tasks(2))
        .await?;

    ensure!(result.outcome == SessionOutcome::Completed);
    ensure!(result.tasks_completed == 2);
    ensure!(result.total_files_modified == 4);
    ensure!(root.join("completed/core-add-a-test.md").is_file());
    ensure!(root.join("completed/core-add-b-test.md").is_file());
    ensure!(root.join("todo/core-add-c-test.md").is_file());
    drop(dir);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_validation_returns_the_document_to_todo(temp_store: TempStore) -> eyre::Result<()> {
    seed(&temp_store).await?;
    let TempStore { dir, root, store } = temp_store;
    let gate = ScriptedValidationGate::passing()
        .then_pass()
        .then_fail(["build: error: mismatched types"]);
    let session = orchestrator(store, gate, 1);

    let result = session
        .run(&SessionOptions::default().with_max_tasks(3))
        .await?;

    ensure!(result.outcome == SessionOutcome::Halted);
    ensure!(result.tasks_attempted == 1);
    let text = std::fs::read_to_string(root.join("todo/core-add-a-test.md"))?;
    ensure!(text.contains("Rolled back: post-task validation failed"));
    ensure!(!root.join("in-progress/core-add-a-test.md").exists());
    let reopened = MarkdownTaskStore::open(&root, DefaultClock)?;
    ensure!(reopened.list(TaskStatus::InProgress).await?.is_empty());
    ensure!(reopened.list(TaskStatus::Todo).await?.len() == 3);
    drop(dir);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn multi_line_commit_failure_keeps_the_document_readable(
    temp_store: TempStore,
) -> eyre::Result<()> {
    let record = suitable_record("core", "Add a test");
    temp_store.store.insert(&record).await?;
    let TempStore { dir, root, store } = temp_store;
    let publishing = executor(store, 1).with_publisher(Arc::new(RejectingPublisher));
    let session = session_with(publishing, ScriptedValidationGate::passing());

    let first = session.run(&SessionOptions::default()).await?;

    let failure = first
        .failures
        .first()
        .ok_or_else(|| eyre::eyre!("expected a failure"))?;
    ensure!(failure.kind == FailureKind::PublishFailure);
    ensure!(failure.rolled_back);
    let text = std::fs::read_to_string(root.join("todo/core-add-a-test.md"))?;
    ensure!(!text.contains("\n\n***"), "reason leaked extra lines:\n{text}");
    let reopened = MarkdownTaskStore::open(&root, DefaultClock)?;
    let stored = reopened.read(record.id()).await?;
    ensure!(stored.status() == TaskStatus::Todo);
    ensure!(stored.progress_log().last().is_some_and(|entry| {
        entry.text.ends_with("Author identity unknown; *** Please tell me who you are.")
    }));

    let second = session.run(&SessionOptions::default()).await?;

    ensure!(second.tasks_attempted == 1);
    ensure!(
        second.failures.first().map(|failure| failure.kind) == Some(FailureKind::PublishFailure)
    );
    drop(dir);
    Ok(())
}
