//! Document round trips through the markdown store.

use super::helpers::{TempStore, suitable_record, temp_store};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::rstest;
use taskgate::task::{
    domain::{NewTaskRecord, Priority, SourceReference, TaskId, TaskRecord, TaskStatus},
    ports::{TaskStore, TaskStoreError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inserted_record_reads_back_unchanged(temp_store: TempStore) -> eyre::Result<()> {
    let record = TaskRecord::new(
        NewTaskRecord::new("Parser", "Document the tokenizer")
            .with_section("Docs")
            .with_priority(Priority::Low)
            .with_source(SourceReference::new("docs/checklist.md", Some(42)))
            .with_body("## Description\n\nExplain each token kind.\n\n## Notes\n\n- keep it short"),
        &DefaultClock,
    )?;

    temp_store.store.insert(&record).await?;
    let read = temp_store.store.read(record.id()).await?;

    ensure!(read == record, "round trip changed the record: {read:?}");
    ensure!(temp_store.exists("todo/parser-document-the-tokenizer.md"));
    Ok(())
}

const HAND_WRITTEN: &str = "# Fix typo in README\n\
\n\
## Task Information\n\
\n\
**Task ID**: `docs-fix-typo-in-readme`  \n\
**Component**: docs  \n\
**Priority**: high  \n\
**Status**: IN PROGRESS  \n\
**Created**: 2024-03-01  \n\
\n\
The word \"recieve\" appears twice.\n\
\n\
## Progress Log\n\
\n\
<!-- appended by tooling -->\n\
- 2024-03-01: Task created\n";

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn directory_wins_over_status_field(temp_store: TempStore) -> eyre::Result<()> {
    temp_store.write_file("todo/docs-fix-typo-in-readme.md", HAND_WRITTEN)?;
    let id = TaskId::parse("docs-fix-typo-in-readme")?;

    let record = temp_store.store.read(&id).await?;

    ensure!(record.status() == TaskStatus::Todo);
    ensure!(record.priority() == Priority::High);
    ensure!(record.section() == "General");
    ensure!(record.body() == "The word \"recieve\" appears twice.");
    ensure!(record.progress_log().len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_document_is_reported_with_its_path(temp_store: TempStore) -> eyre::Result<()> {
    temp_store.write_file("todo/core-broken.md", "no heading here\n")?;
    let id = TaskId::parse("core-broken")?;

    let result = temp_store.store.read(&id).await;

    let Err(TaskStoreError::MalformedDocument { location, .. }) = &result else {
        eyre::bail!("expected a malformed document error, got {result:?}");
    };
    ensure!(location.ends_with("todo/core-broken.md"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn document_under_wrong_name_is_rejected(temp_store: TempStore) -> eyre::Result<()> {
    temp_store.write_file("todo/docs-renamed.md", HAND_WRITTEN)?;
    let id = TaskId::parse("docs-renamed")?;

    ensure!(matches!(
        temp_store.store.read(&id).await,
        Err(TaskStoreError::MalformedDocument { .. })
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn write_persists_body_and_appended_progress(temp_store: TempStore) -> eyre::Result<()> {
    let mut record = suitable_record("core", "Add parser test");
    temp_store.store.insert(&record).await?;

    record.set_body("## Description\n\nCover the empty input case.");
    record.record_progress("Picked up for review", &DefaultClock);
    temp_store.store.write(&record).await?;

    let read = temp_store.store.read(record.id()).await?;
    ensure!(read == record);
    let text = temp_store.read_file("todo/core-add-parser-test.md")?;
    ensure!(text.contains(": Picked up for review\n"));
    Ok(())
}
