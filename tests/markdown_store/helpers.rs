//! Shared helpers for markdown store integration tests.

use camino::{Utf8Path, Utf8PathBuf};
use mockable::DefaultClock;
use rstest::fixture;
use taskgate::task::{
    adapters::markdown::MarkdownTaskStore,
    domain::{NewTaskRecord, TaskRecord},
};
use tempfile::TempDir;

/// A store rooted in a temporary directory that lives as long as the value.
pub struct TempStore {
    /// Keeps the directory alive.
    pub dir: TempDir,
    /// Tasks directory path.
    pub root: Utf8PathBuf,
    /// Store under test.
    pub store: MarkdownTaskStore<DefaultClock>,
}

impl TempStore {
    /// Reads a file relative to the tasks directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, relative: &str) -> std::io::Result<String> {
        std::fs::read_to_string(self.root.join(relative))
    }

    /// Writes a file relative to the tasks directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_file(&self, relative: &str, contents: &str) -> std::io::Result<()> {
        std::fs::write(self.root.join(relative), contents)
    }

    /// Returns whether a file exists relative to the tasks directory.
    #[must_use]
    pub fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).is_file()
    }
}

/// Provides a fresh store in a new temporary directory.
#[fixture]
pub fn temp_store() -> TempStore {
    let dir = tempfile::tempdir().expect("temporary directory");
    let root = Utf8Path::from_path(dir.path())
        .expect("UTF-8 temporary path")
        .join("tasks");
    let store = MarkdownTaskStore::open(&root, DefaultClock).expect("store opens");
    TempStore { dir, root, store }
}

/// Builds a TODO record with a suitable body.
#[must_use]
pub fn suitable_record(component: &str, title: &str) -> TaskRecord {
    TaskRecord::new(
        NewTaskRecord::new(component, title).with_body("## Description\n\nAdd a unit test."),
        &DefaultClock,
    )
    .expect("valid record")
}
