//! Team chat: an ordered message log with per-author edit rights and
//! reaction counters.
//!
//! [`ChatLog`] is the pure state machine. [`ChatRoom`] pairs it with a
//! [`ChatStore`] and persists after every mutation.
//!
//! Every operation addresses a message by [`MessageId`]. Front ends that
//! show the log as a list translate a click to an id with
//! [`ChatLog::id_at`] at the moment of the click, so a concurrent send or
//! delete can never redirect the action to a different message.

pub mod history;
pub mod room;

use officeflow_model::message::{ChatMessage, MessageId, Reaction, UnknownReaction};

use crate::store::StoreError;

pub use history::{ChatStore, InMemoryChatStore, JsonChatStore};
pub use room::ChatRoom;

/// Errors that can occur during chat operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// No message has the given id.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// Someone other than the author tried to change a message.
    #[error("{editor} is not the author of message {id}")]
    NotAuthor {
        /// Message that was targeted.
        id: MessageId,
        /// Who attempted the change.
        editor: String,
    },

    /// The reaction is not in the configured set.
    #[error(transparent)]
    UnknownReaction(#[from] UnknownReaction),

    /// Loading or saving the log failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Chronologically ordered chat messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Wraps messages that are already in chronological order.
    #[must_use]
    pub const fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Messages in chronological order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Consumes the log, returning its messages in chronological order.
    #[must_use]
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a message from `author` stamped with `time`.
    ///
    /// Returns `None` and leaves the log untouched if the author or text is
    /// blank.
    pub fn send(&mut self, author: &str, text: &str, time: &str) -> Option<MessageId> {
        let author = author.trim();
        if author.is_empty() || text.trim().is_empty() {
            return None;
        }
        let message = ChatMessage::new(author, text, time);
        let id = message.id.clone();
        self.messages.push(message);
        Some(id)
    }

    /// Adds one `reaction` to a message and returns the new count.
    ///
    /// Anyone may react, any number of times.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] for an unknown id.
    pub fn react(&mut self, id: &MessageId, reaction: Reaction) -> Result<u32, ChatError> {
        Ok(self.find_mut(id)?.reactions.increment(reaction))
    }

    /// Replaces the text of a message. Only the author may edit; the new
    /// text is stored verbatim, empty included. `editor` is trimmed the way
    /// [`send`](Self::send) trims the author.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] for an unknown id, or
    /// [`ChatError::NotAuthor`] if `editor` did not write the message.
    pub fn edit(&mut self, id: &MessageId, editor: &str, text: &str) -> Result<(), ChatError> {
        let message = self.find_mut(id)?;
        if !message.is_authored_by(editor.trim()) {
            return Err(ChatError::NotAuthor {
                id: id.clone(),
                editor: editor.to_string(),
            });
        }
        text.clone_into(&mut message.text);
        Ok(())
    }

    /// Removes a message. Only the author (compared trimmed) may delete.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] for an unknown id, or
    /// [`ChatError::NotAuthor`] if `editor` did not write the message.
    pub fn delete(&mut self, id: &MessageId, editor: &str) -> Result<ChatMessage, ChatError> {
        let index = self.position(id)?;
        if !self.messages[index].is_authored_by(editor.trim()) {
            return Err(ChatError::NotAuthor {
                id: id.clone(),
                editor: editor.to_string(),
            });
        }
        Ok(self.messages.remove(index))
    }

    /// Looks a message up by id.
    #[must_use]
    pub fn get(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == *id)
    }

    /// Messages newest first, the order they are displayed in.
    pub fn latest_first(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().rev()
    }

    /// Id of the message at display `position` (0 = newest).
    #[must_use]
    pub fn id_at(&self, position: usize) -> Option<MessageId> {
        self.latest_first().nth(position).map(|m| m.id.clone())
    }

    fn position(&self, id: &MessageId) -> Result<usize, ChatError> {
        self.messages
            .iter()
            .position(|m| m.id == *id)
            .ok_or_else(|| ChatError::MessageNotFound(id.clone()))
    }

    fn find_mut(&mut self, id: &MessageId) -> Result<&mut ChatMessage, ChatError> {
        let index = self.position(id)?;
        Ok(&mut self.messages[index])
    }
}
