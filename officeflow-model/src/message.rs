//! Chat message types for the `OfficeFlow` team chat.
//!
//! Messages are addressed by a stable [`MessageId`]. Every message carries a
//! counter for each emoji in the fixed [`Reaction`] set; the counters are
//! serialized as a glyph-keyed map and normalized back to the full set on
//! load.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a message, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new time-ordered message identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `MessageId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Input that names no emoji in the reaction set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reaction: {0:?}")]
pub struct UnknownReaction(pub String);

/// The configured emoji set a message can be reacted to with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reaction {
    /// 👍
    ThumbsUp,
    /// 🔥
    Fire,
    /// 😂
    Laugh,
    /// ✅
    Check,
}

impl Reaction {
    /// Every reaction, in display order.
    pub const ALL: [Self; 4] = [Self::ThumbsUp, Self::Fire, Self::Laugh, Self::Check];

    /// The emoji itself. Also the key used in the persisted log.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::ThumbsUp => "👍",
            Self::Fire => "🔥",
            Self::Laugh => "😂",
            Self::Check => "✅",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::ThumbsUp => 0,
            Self::Fire => 1,
            Self::Laugh => 2,
            Self::Check => 3,
        }
    }
}

impl std::fmt::Display for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glyph())
    }
}

impl FromStr for Reaction {
    type Err = UnknownReaction;

    /// Accepts the glyph or a short name (`thumbsup`, `fire`, `laugh`, `check`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(found) = Self::ALL.into_iter().find(|r| r.glyph() == trimmed) {
            return Ok(found);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "thumbsup" | "+1" | "like" => Ok(Self::ThumbsUp),
            "fire" => Ok(Self::Fire),
            "laugh" | "joy" => Ok(Self::Laugh),
            "check" | "done" => Ok(Self::Check),
            _ => Err(UnknownReaction(s.to_string())),
        }
    }
}

/// Reaction counters for one message, one per [`Reaction`].
///
/// The full key set is always present; counters only go up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct Reactions([u32; 4]);

impl Reactions {
    /// All counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self([0; 4])
    }

    /// Current count for one emoji.
    #[must_use]
    pub const fn get(&self, reaction: Reaction) -> u32 {
        self.0[reaction.index()]
    }

    /// Adds one to the counter and returns the new value.
    pub fn increment(&mut self, reaction: Reaction) -> u32 {
        let slot = &mut self.0[reaction.index()];
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Iterates `(emoji, count)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Reaction, u32)> + '_ {
        Reaction::ALL.into_iter().map(|r| (r, self.get(r)))
    }

    /// Sum of all counters.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&n| u64::from(n)).sum()
    }
}

impl From<BTreeMap<String, u32>> for Reactions {
    /// Unknown keys are dropped, missing keys count as zero.
    fn from(map: BTreeMap<String, u32>) -> Self {
        let mut reactions = Self::new();
        for (key, count) in map {
            if let Ok(reaction) = key.parse::<Reaction>() {
                reactions.0[reaction.index()] = count;
            }
        }
        reactions
    }
}

impl From<Reactions> for BTreeMap<String, u32> {
    fn from(reactions: Reactions) -> Self {
        reactions
            .iter()
            .map(|(r, n)| (r.glyph().to_string(), n))
            .collect()
    }
}

/// One chat message as stored in the chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable identifier assigned at send.
    pub id: MessageId,
    /// Author name.
    pub user: String,
    /// Message body.
    pub text: String,
    /// Time of day the message was sent, already formatted for display.
    pub time: String,
    /// Reaction counters.
    #[serde(default)]
    pub reactions: Reactions,
}

impl ChatMessage {
    /// Creates a message with a fresh id and zeroed reactions.
    #[must_use]
    pub fn new(user: impl Into<String>, text: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            user: user.into(),
            text: text.into(),
            time: time.into(),
            reactions: Reactions::new(),
        }
    }

    /// Returns `true` if `name` wrote this message.
    #[must_use]
    pub fn is_authored_by(&self, name: &str) -> bool {
        self.user == name
    }
}
