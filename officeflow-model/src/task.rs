//! Task record types for the `OfficeFlow` board.
//!
//! A task row carries a stable [`TaskId`] plus the five columns shown in the
//! table. Status and priority render as glyph labels (`🔴 Pending`) in the
//! task file and in exports, and parse back from either the glyph label, the
//! bare label, or the legacy Russian label.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date format used when writing deadlines to the task file.
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Day-first date format used for display and exports.
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
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

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A status or priority label that matched none of the known spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind} label: {value:?}")]
pub struct ParseLabelError {
    /// Which enum was being parsed (`status` or `priority`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Strips a leading glyph (and any variation selector) from a label and
/// lowercases the rest.
fn normalize_label(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim()
        .to_lowercase()
}

/// Workflow state of a task.
///
/// `Done` is terminal: done tasks form the archive, everything else is
/// active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    Pending,
    /// Being worked on.
    InProgress,
    /// Finished and archived.
    Done,
}

impl TaskStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Done];

    /// Plain label without the glyph.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Done => "Done",
        }
    }

    /// Status glyph shown before the label.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Pending => "🔴",
            Self::InProgress => "🟡",
            Self::Done => "🟢",
        }
    }

    /// Returns `true` for every status except [`TaskStatus::Done`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Done)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.glyph(), self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "pending" | "ожидает" => Ok(Self::Pending),
            "in progress" | "in-progress" | "in_progress" | "inprogress" | "в работе" => {
                Ok(Self::InProgress)
            }
            "done" | "готово" => Ok(Self::Done),
            _ => Err(ParseLabelError {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Task priority.
///
/// The derived ordering is the display order: `High < Medium < Low`.
/// It is only ever used to sort views, never to order storage.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Priority {
    /// Rank 0.
    High,
    /// Rank 1. Default for new tasks.
    #[default]
    Medium,
    /// Rank 2.
    Low,
}

impl Priority {
    /// Every priority, in display order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Sort rank used by views (`High` = 0).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Plain label without the glyph.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Severity glyph shown before the label.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::High => "🔥",
            Self::Medium => "⚡",
            Self::Low => "🧊",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.glyph(), self.label())
    }
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "high" | "высокий" => Ok(Self::High),
            "medium" | "средний" => Ok(Self::Medium),
            "low" | "низкий" => Ok(Self::Low),
            _ => Err(ParseLabelError {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Parses a deadline written either ISO (`2024-01-31`) or day-first
/// (`31.01.2024`).
#[must_use]
pub fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, STORAGE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, DISPLAY_DATE_FORMAT))
        .ok()
}

/// One row of the task table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier assigned at creation.
    pub id: TaskId,
    /// What needs doing.
    pub title: String,
    /// Employee responsible for the task. Never empty once persisted.
    pub assignee: String,
    /// Workflow state.
    pub status: TaskStatus,
    /// Display priority.
    pub priority: Priority,
    /// Due date.
    pub deadline: NaiveDate,
}

impl Task {
    /// Creates a pending, medium-priority task with a fresh id.
    #[must_use]
    pub fn new(title: impl Into<String>, assignee: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            assignee: assignee.into(),
            status: TaskStatus::Pending,
            priority: Priority::default(),
            deadline,
        }
    }

    /// Returns the task with its status replaced.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the task with its priority replaced.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Returns `true` unless the task is done.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
