//! Chat log persistence.
//!
//! Defines the [`ChatStore`] trait plus two implementations: the durable
//! [`JsonChatStore`] and the process-local [`InMemoryChatStore`], which is
//! the caching-only mode selected by `persistence = "ephemeral"`.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use officeflow_model::message::ChatMessage;

use crate::store::{StoreError, atomic_write, read_optional};

/// Load/save contract for the chat log.
pub trait ChatStore: Send + Sync {
    /// Reads the whole log in chronological order. A store that was never
    /// written yields an empty log.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the log cannot be read or decoded.
    fn load(&self) -> Result<Vec<ChatMessage>, StoreError>;

    /// Replaces the whole log.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    fn save(&self, messages: &[ChatMessage]) -> Result<(), StoreError>;

    /// Returns `true` if saved messages survive a restart.
    fn is_durable(&self) -> bool;
}

/// Chat log persisted as a pretty-printed JSON array.
pub struct JsonChatStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonChatStore {
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
}

impl ChatStore for JsonChatStore {
    fn load(&self) -> Result<Vec<ChatMessage>, StoreError> {
        let _guard = self.lock.lock();
        match read_optional(&self.path)? {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, messages: &[ChatMessage]) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let json = serde_json::to_string_pretty(messages)?;
        atomic_write(&self.path, json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), messages = messages.len(), "chat log written");
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }
}

/// In-memory chat log for testing and ephemeral sessions.
#[derive(Default)]
pub struct InMemoryChatStore {
    messages: Mutex<Vec<ChatMessage>>,
}

impl InMemoryChatStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatStore for InMemoryChatStore {
    fn load(&self) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.messages.lock().clone())
    }

    fn save(&self, messages: &[ChatMessage]) -> Result<(), StoreError> {
        *self.messages.lock() = messages.to_vec();
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}

impl<T: ChatStore + ?Sized> ChatStore for Box<T> {
    fn load(&self) -> Result<Vec<ChatMessage>, StoreError> {
        (**self).load()
    }

    fn save(&self, messages: &[ChatMessage]) -> Result<(), StoreError> {
        (**self).save(messages)
    }

    fn is_durable(&self) -> bool {
        (**self).is_durable()
    }
}
