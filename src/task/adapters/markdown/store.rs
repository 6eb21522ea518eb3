//! Task store keeping one markdown document per record in status directories.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::Clock;
use std::io;
use tracing::{debug, info, warn};

use crate::task::{
    domain::{TaskId, TaskRecord, TaskStatus, document},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, ensure_transition},
};

const DOCUMENT_EXTENSION: &str = "md";
const INDEX_FILE: &str = "README.md";

/// Markdown-backed task store rooted at a tasks directory.
///
/// Each status owns a subdirectory (`todo`, `in-progress`, `completed`) and
/// each record is a `<id>.md` document. The directory a document sits in is
/// authoritative: a `Status` field that disagrees with it is corrected on
/// read.
#[derive(Debug)]
pub struct MarkdownTaskStore<C: Clock + Send + Sync> {
    root: Dir,
    root_path: Utf8PathBuf,
    clock: C,
}

impl<C: Clock + Send + Sync> MarkdownTaskStore<C> {
    /// Opens the store at `root`, creating it and its status directories.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the directories cannot be
    /// created or opened.
    pub fn open(root: &Utf8Path, clock: C) -> TaskStoreResult<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(TaskStoreError::persistence)?;
        let dir =
            Dir::open_ambient_dir(root, ambient_authority()).map_err(TaskStoreError::persistence)?;
        for status in TaskStatus::ALL {
            dir.create_dir_all(status.queue_name())
                .map_err(TaskStoreError::persistence)?;
        }
        Ok(Self {
            root: dir,
            root_path: root.to_owned(),
            clock,
        })
    }

    /// Returns the directory the store was opened at.
    #[must_use]
    pub fn root_path(&self) -> &Utf8Path {
        &self.root_path
    }

    /// Replaces `README.md` at the store root, e.g. with a rendered index.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the file cannot be written.
    pub fn write_readme(&self, contents: &str) -> TaskStoreResult<()> {
        self.root
            .write(INDEX_FILE, contents)
            .map_err(TaskStoreError::persistence)
    }

    fn document_path(id: &TaskId, status: TaskStatus) -> Utf8PathBuf {
        Utf8Path::new(status.queue_name()).join(format!("{id}.{DOCUMENT_EXTENSION}"))
    }

    fn locate(&self, id: &TaskId) -> Option<TaskStatus> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| self.root.is_file(Self::document_path(id, *status)))
    }

    fn load(&self, id: &TaskId, status: TaskStatus) -> TaskStoreResult<TaskRecord> {
        let path = Self::document_path(id, status);
        let text = self.root.read_to_string(&path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                TaskStoreError::NotFound(id.clone())
            } else {
                TaskStoreError::persistence(err)
            }
        })?;
        let malformed = |source| TaskStoreError::MalformedDocument {
            location: self.root_path.join(&path).into_string(),
            source,
        };
        let mut persisted = document::parse(&text).map_err(malformed)?.into_persisted();
        if &persisted.id != id {
            return Err(malformed(document::DocumentError::InvalidField {
                field: "Task ID",
                value: persisted.id.into(),
            }));
        }
        if persisted.status != status {
            warn!(
                task_id = %id,
                recorded = %persisted.status,
                directory = status.queue_name(),
                "status field disagrees with directory, using directory"
            );
            persisted.status = status;
        }
        Ok(TaskRecord::from_persisted(persisted))
    }

    fn save(&self, record: &TaskRecord, status: TaskStatus) -> TaskStoreResult<()> {
        self.root
            .write(Self::document_path(record.id(), status), document::render(record))
            .map_err(TaskStoreError::persistence)
    }

    fn list_sync(&self, status: TaskStatus) -> TaskStoreResult<Vec<TaskId>> {
        let entries = self
            .root
            .read_dir(status.queue_name())
            .map_err(TaskStoreError::persistence)?;
        let mut ids = Vec::new();
        for entry_result in entries {
            let entry = entry_result.map_err(TaskStoreError::persistence)?;
            let name = entry.file_name().map_err(TaskStoreError::persistence)?;
            let Some(stem) = name.strip_suffix(".md") else {
                continue;
            };
            match TaskId::parse(stem) {
                Ok(id) => ids.push(id),
                Err(err) => debug!(file = %name, error = %err, "skipping unrecognised file"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> TaskStore for MarkdownTaskStore<C> {
    async fn insert(&self, record: &TaskRecord) -> TaskStoreResult<()> {
        if self.locate(record.id()).is_some() {
            return Err(TaskStoreError::DuplicateTask(record.id().clone()));
        }
        self.save(record, record.status())?;
        debug!(task_id = %record.id(), status = %record.status(), "inserted task document");
        Ok(())
    }

    async fn list(&self, status: TaskStatus) -> TaskStoreResult<Vec<TaskId>> {
        self.list_sync(status)
    }

    async fn read(&self, id: &TaskId) -> TaskStoreResult<TaskRecord> {
        let status = self
            .locate(id)
            .ok_or_else(|| TaskStoreError::NotFound(id.clone()))?;
        self.load(id, status)
    }

    async fn write(&self, record: &TaskRecord) -> TaskStoreResult<()> {
        let status = self
            .locate(record.id())
            .ok_or_else(|| TaskStoreError::NotFound(record.id().clone()))?;
        let stored = self.load(record.id(), status)?;
        stored.ensure_valid_update(record)?;
        self.save(record, status)
    }

    async fn move_task(
        &self,
        id: &TaskId,
        from: TaskStatus,
        to: TaskStatus,
    ) -> TaskStoreResult<TaskRecord> {
        ensure_transition(id, from, to)?;
        let source = Self::document_path(id, from);
        if !self.root.is_file(&source) {
            return Err(TaskStoreError::NotFound(id.clone()));
        }
        let target = Self::document_path(id, to);
        if self.root.is_file(&target) {
            return Err(TaskStoreError::DuplicateTask(id.clone()));
        }

        let mut record = self.load(id, from)?;
        record.transition_to(to, &self.clock)?;
        self.save(&record, from)?;
        self.root
            .rename(&source, &self.root, &target)
            .map_err(TaskStoreError::persistence)?;
        info!(task_id = %id, from = %from, to = %to, "moved task document");
        Ok(record)
    }
}
