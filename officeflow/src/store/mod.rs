//! Durable storage for the task table.
//!
//! [`TaskStore`] is the load/save contract every backend honors. Two live in
//! this crate: [`CsvTaskStore`] (the flat file) and [`InMemoryTaskStore`]
//! (tests and throwaway sessions). A remote spreadsheet adapter implements the
//! same trait outside the crate.
//!
//! Every save replaces the whole table. [`TaskStore::save_if`] adds a
//! compare-and-swap on the [`Revision`] the caller loaded, so an interleaved
//! write by someone else surfaces as [`StoreError::Conflict`] instead of being
//! silently overwritten.

pub mod csv;
pub mod memory;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use officeflow_model::codec::CodecError;
use officeflow_model::task::Task;
use sha2::{Digest, Sha256};

pub use csv::CsvTaskStore;
pub use memory::InMemoryTaskStore;

/// Errors that can occur while loading or saving persisted state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The task file could not be decoded.
    #[error("malformed task file: {0}")]
    Codec(#[from] CodecError),

    /// The chat log could not be encoded or decoded.
    #[error("malformed chat log: {0}")]
    Json(#[from] serde_json::Error),

    /// The persisted state changed since the caller loaded it.
    #[error("stale revision: expected {expected}, store is at {found}")]
    Conflict {
        /// Revision the caller based its edit on.
        expected: Revision,
        /// Revision actually persisted.
        found: Revision,
    },
}

/// Opaque token identifying one persisted state of the task table.
///
/// File stores use the SHA-256 digest of the persisted bytes; in-memory
/// stores use a write counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Revision([u8; 32]);

impl Revision {
    /// Revision of a store that has never been written.
    pub const EMPTY: Self = Self([0; 32]);

    /// Creates a revision from a write counter.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        let counter = raw.to_be_bytes();
        let mut bytes = [0; 32];
        let mut i = 0;
        while i < counter.len() {
            bytes[24 + i] = counter[i];
            i += 1;
        }
        Self(bytes)
    }

    /// Content revision of a persisted byte string.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut digest = [0; 32];
        digest.copy_from_slice(&Sha256::digest(bytes));
        Self(digest)
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// The task table as loaded, plus the revision it was loaded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Every persisted row, in storage order.
    pub tasks: Vec<Task>,
    /// Revision to pass back to [`TaskStore::save_if`].
    pub revision: Revision,
}

impl Snapshot {
    /// An empty table at [`Revision::EMPTY`].
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            tasks: Vec::new(),
            revision: Revision::EMPTY,
        }
    }
}

/// Load/save contract for the task table.
pub trait TaskStore: Send + Sync {
    /// Reads the whole table.
    ///
    /// A store that was never written yields an empty table, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be read or
    /// decoded.
    fn load(&self) -> Result<Snapshot, StoreError>;

    /// Replaces the whole table unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails. A failed write leaves the
    /// previous table in place.
    fn save(&self, tasks: &[Task]) -> Result<Revision, StoreError>;

    /// Replaces the whole table if the store is still at `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if another write landed since
    /// `expected` was loaded, or any other [`StoreError`] if the write fails.
    fn save_if(&self, expected: Revision, tasks: &[Task]) -> Result<Revision, StoreError>;
}

impl<T: TaskStore + ?Sized> TaskStore for &T {
    fn load(&self) -> Result<Snapshot, StoreError> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> Result<Revision, StoreError> {
        (**self).save(tasks)
    }

    fn save_if(&self, expected: Revision, tasks: &[Task]) -> Result<Revision, StoreError> {
        (**self).save_if(expected, tasks)
    }
}

/// Today's date in the local timezone.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Reads a file, mapping "not found" to `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Replaces `path` with `contents` through a sibling temp file and a rename,
/// so readers never observe a half-written file.
pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    std::fs::write(&temp, contents).map_err(io_err)?;
    std::fs::rename(&temp, path).map_err(io_err)
}
