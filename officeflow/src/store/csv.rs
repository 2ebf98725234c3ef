//! Flat-file task store.
//!
//! The revision of a CSV store is the content hash of the file bytes, so any
//! writer (this process, another process, a person with a spreadsheet) that
//! changes the file invalidates earlier snapshots.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use officeflow_model::codec::{decode_table, encode_table};
use officeflow_model::task::Task;

use super::{Revision, Snapshot, StoreError, TaskStore, atomic_write, read_optional, today};

/// Task table persisted as a CSV file.
pub struct CsvTaskStore {
    path: PathBuf,
    /// Serializes load-repair and compare-and-swap within this process.
    lock: Mutex<()>,
}

impl CsvTaskStore {
    /// Creates a store backed by `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn current_revision(&self) -> Result<Revision, StoreError> {
        Ok(read_optional(&self.path)?.map_or(Revision::EMPTY, |text| {
            Revision::of_bytes(text.as_bytes())
        }))
    }

    fn write(&self, tasks: &[Task]) -> Result<Revision, StoreError> {
        let text = encode_table(tasks);
        atomic_write(&self.path, text.as_bytes())?;
        tracing::debug!(path = %self.path.display(), rows = tasks.len(), "task file written");
        Ok(Revision::of_bytes(text.as_bytes()))
    }
}

impl TaskStore for CsvTaskStore {
    /// Loads the table, writing it straight back if the schema needed repair
    /// so that ids assigned during the repair stay stable across loads.
    fn load(&self) -> Result<Snapshot, StoreError> {
        let _guard = self.lock.lock();
        let Some(text) = read_optional(&self.path)? else {
            tracing::debug!(path = %self.path.display(), "task file absent, starting empty");
            return Ok(Snapshot::empty());
        };

        let decoded = decode_table(&text, today())?;
        if !decoded.was_repaired() {
            return Ok(Snapshot {
                tasks: decoded.tasks,
                revision: Revision::of_bytes(text.as_bytes()),
            });
        }

        tracing::warn!(
            path = %self.path.display(),
            backfilled_deadlines = decoded.backfilled_deadlines,
            assigned_ids = decoded.assigned_ids,
            dropped_rows = decoded.dropped_rows,
            "task file schema repaired on load"
        );
        let revision = self.write(&decoded.tasks)?;
        Ok(Snapshot {
            tasks: decoded.tasks,
            revision,
        })
    }

    fn save(&self, tasks: &[Task]) -> Result<Revision, StoreError> {
        let _guard = self.lock.lock();
        self.write(tasks)
    }

    fn save_if(&self, expected: Revision, tasks: &[Task]) -> Result<Revision, StoreError> {
        let _guard = self.lock.lock();
        let found = self.current_revision()?;
        if found != expected {
            tracing::warn!(
                path = %self.path.display(),
                %expected,
                %found,
                "task file changed underneath, refusing to overwrite"
            );
            return Err(StoreError::Conflict { expected, found });
        }
        self.write(tasks)
    }
}
