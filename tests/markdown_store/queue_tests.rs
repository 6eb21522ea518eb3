//! Queue membership through the markdown store.

use super::helpers::{TempStore, suitable_record, temp_store};
use chrono::{TimeZone, Utc};
use eyre::ensure;
use rstest::rstest;
use taskgate::task::{
    domain::TaskStatus,
    ports::{TaskStore, TaskStoreError},
    services::render_index,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_relocates_the_document(temp_store: TempStore) -> eyre::Result<()> {
    let record = suitable_record("core", "Add lexer test");
    temp_store.store.insert(&record).await?;

    let moved = temp_store
        .store
        .move_task(record.id(), TaskStatus::Todo, TaskStatus::InProgress)
        .await?;

    ensure!(moved.status() == TaskStatus::InProgress);
    ensure!(!temp_store.exists("todo/core-add-lexer-test.md"));
    let text = temp_store.read_file("in-progress/core-add-lexer-test.md")?;
    ensure!(text.contains("**Status**: IN_PROGRESS"));
    ensure!(text.contains(": Status changed to in-progress"));
    ensure!(temp_store.store.list(TaskStatus::Todo).await?.is_empty());
    ensure!(temp_store.store.list(TaskStatus::InProgress).await? == [record.id().clone()]);
    Ok(())
}

#[rstest]
#[case(TaskStatus::Todo, TaskStatus::Completed)]
#[case(TaskStatus::Completed, TaskStatus::Todo)]
#[case(TaskStatus::Todo, TaskStatus::Todo)]
#[tokio::test(flavor = "multi_thread")]
async fn illegal_moves_leave_the_document_alone(
    temp_store: TempStore,
    #[case] from: TaskStatus,
    #[case] to: TaskStatus,
) -> eyre::Result<()> {
    let record = suitable_record("core", "Add lexer test");
    temp_store.store.insert(&record).await?;
    let before = temp_store.read_file("todo/core-add-lexer-test.md")?;

    let result = temp_store.store.move_task(record.id(), from, to).await;

    ensure!(matches!(result, Err(TaskStoreError::InvalidTransition { .. })));
    ensure!(temp_store.read_file("todo/core-add-lexer-test.md")? == before);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_from_the_wrong_queue_is_not_found(temp_store: TempStore) -> eyre::Result<()> {
    let record = suitable_record("core", "Add lexer test");
    temp_store.store.insert(&record).await?;

    let result = temp_store
        .store
        .move_task(record.id(), TaskStatus::InProgress, TaskStatus::Completed)
        .await;

    ensure!(matches!(result, Err(TaskStoreError::NotFound(_))));
    ensure!(temp_store.exists("todo/core-add-lexer-test.md"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_insert_is_rejected_across_queues(temp_store: TempStore) -> eyre::Result<()> {
    let record = suitable_record("core", "Add lexer test");
    temp_store.store.insert(&record).await?;
    temp_store
        .store
        .move_task(record.id(), TaskStatus::Todo, TaskStatus::InProgress)
        .await?;

    let result = temp_store.store.insert(&record).await;

    ensure!(matches!(result, Err(TaskStoreError::DuplicateTask(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_skips_foreign_files(temp_store: TempStore) -> eyre::Result<()> {
    for title in ["Add b test", "Add a test"] {
        temp_store
            .store
            .insert(&suitable_record("core", title))
            .await?;
    }
    temp_store.write_file("todo/notes.txt", "scratch")?;
    temp_store.write_file("todo/Not A Task.md", "# ignored")?;

    let listed: Vec<String> = temp_store
        .store
        .list(TaskStatus::Todo)
        .await?
        .into_iter()
        .map(String::from)
        .collect();

    ensure!(listed == ["core-add-a-test", "core-add-b-test"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn readme_index_is_written_at_the_root(temp_store: TempStore) -> eyre::Result<()> {
    temp_store
        .store
        .insert(&suitable_record("core", "Add lexer test"))
        .await?;
    let generated_at = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .ok_or_else(|| eyre::eyre!("invalid timestamp"))?;

    let readme = render_index(&temp_store.store, generated_at).await?;
    temp_store.store.write_readme(&readme)?;

    let written = temp_store.read_file("README.md")?;
    ensure!(written.contains("- [Add lexer test](./todo/core-add-lexer-test.md)"));
    ensure!(temp_store.store.list(TaskStatus::Todo).await?.len() == 1);
    Ok(())
}
