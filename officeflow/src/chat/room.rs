//! The chat room: [`ChatLog`] semantics over a [`ChatStore`].
//!
//! Every operation loads the log, applies the change, and saves before
//! returning, all under one lock, so a successful call is already persisted
//! (for a durable store) and two calls from the same process never
//! interleave.

use std::fmt::Write as _;

use parking_lot::Mutex;

use officeflow_model::message::{ChatMessage, MessageId, Reaction};

use super::history::ChatStore;
use super::{ChatError, ChatLog};

/// Default `strftime` pattern for message timestamps.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

/// A persisted chat log.
pub struct ChatRoom<S> {
    store: S,
    time_format: String,
    lock: Mutex<()>,
}

impl<S: ChatStore> ChatRoom<S> {
    /// Creates a room over `store` using [`DEFAULT_TIME_FORMAT`].
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            lock: Mutex::new(()),
        }
    }

    /// Sets the `strftime` pattern used to stamp new messages.
    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Returns `true` if messages survive a restart.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.store.is_durable()
    }

    /// Loads the current log.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Store`] if the log cannot be loaded.
    pub fn log(&self) -> Result<ChatLog, ChatError> {
        Ok(ChatLog::from_messages(self.store.load()?))
    }

    /// Messages newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Store`] if the log cannot be loaded.
    pub fn latest_first(&self) -> Result<Vec<ChatMessage>, ChatError> {
        Ok(self.log()?.latest_first().cloned().collect())
    }

    /// Id of the message at display `position` (0 = newest).
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Store`] if the log cannot be loaded.
    pub fn id_at(&self, position: usize) -> Result<Option<MessageId>, ChatError> {
        Ok(self.log()?.id_at(position))
    }

    /// Posts a message stamped with the current local time. Returns `None`
    /// without touching storage if the author or text is blank.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Store`] if loading or saving fails.
    pub fn send(&self, author: &str, text: &str) -> Result<Option<ChatMessage>, ChatError> {
        if author.trim().is_empty() || text.trim().is_empty() {
            return Ok(None);
        }
        let time = self.now();
        self.mutate(|log| {
            Ok(log
                .send(author, text, &time)
                .and_then(|id| log.get(&id).cloned()))
        })
    }

    /// Adds one reaction and returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] for an unknown id, or
    /// [`ChatError::Store`] if loading or saving fails.
    pub fn react(&self, id: &MessageId, reaction: Reaction) -> Result<u32, ChatError> {
        self.mutate(|log| log.react(id, reaction))
    }

    /// Replaces a message's text. Author only.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`], [`ChatError::NotAuthor`], or
    /// [`ChatError::Store`].
    pub fn edit(&self, id: &MessageId, editor: &str, text: &str) -> Result<(), ChatError> {
        self.mutate(|log| log.edit(id, editor, text))
    }

    /// Removes a message. Author only.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`], [`ChatError::NotAuthor`], or
    /// [`ChatError::Store`].
    pub fn delete(&self, id: &MessageId, editor: &str) -> Result<ChatMessage, ChatError> {
        self.mutate(|log| log.delete(id, editor))
    }

    fn mutate<R>(
        &self,
        apply: impl FnOnce(&mut ChatLog) -> Result<R, ChatError>,
    ) -> Result<R, ChatError> {
        let _guard = self.lock.lock();
        let mut log = self.log()?;
        let before = log.len();
        let result = apply(&mut log)?;
        self.store.save(log.messages())?;
        tracing::debug!(
            messages_before = before,
            messages_after = log.len(),
            durable = self.store.is_durable(),
            "chat log updated"
        );
        Ok(result)
    }

    fn now(&self) -> String {
        let now = chrono::Local::now();
        let mut out = String::new();
        if write!(out, "{}", now.format(&self.time_format)).is_err() {
            tracing::warn!(format = %self.time_format, "invalid chat time format, using default");
            return now.format(DEFAULT_TIME_FORMAT).to_string();
        }
        out
    }
}
