//! Read-only views over the task table.
//!
//! Views are derived on demand and never stored. The priority sort applied to
//! per-employee views is a display order only; merging a view back never
//! reorders storage by priority.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use officeflow_model::task::{Priority, Task, TaskId, TaskStatus};

/// One row of a per-employee view: a task without its assignee column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    /// Id of the task this row shows, or `None` for a row added in the view.
    pub id: Option<TaskId>,
    /// Task title.
    pub title: String,
    /// Workflow state.
    pub status: TaskStatus,
    /// Display priority.
    pub priority: Priority,
    /// Due date.
    pub deadline: NaiveDate,
}

impl ViewRow {
    /// A row added in the view: pending, medium priority, no id yet.
    #[must_use]
    pub fn new(title: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            id: None,
            title: title.into(),
            status: TaskStatus::Pending,
            priority: Priority::default(),
            deadline,
        }
    }

    /// Projects a task into a view row, dropping the assignee.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: Some(task.id.clone()),
            title: task.title.clone(),
            status: task.status,
            priority: task.priority,
            deadline: task.deadline,
        }
    }

    /// Reattaches `assignee`, minting an id for rows added in the view.
    #[must_use]
    pub fn into_task(self, assignee: &str) -> Task {
        Task {
            id: self.id.unwrap_or_default(),
            title: self.title,
            assignee: assignee.to_string(),
            status: self.status,
            priority: self.priority,
            deadline: self.deadline,
        }
    }
}

/// Splits the table into `(active, archived)`.
///
/// Every row lands on exactly one side; relative order is kept on both.
#[must_use]
pub fn split_by_status(tasks: &[Task]) -> (Vec<Task>, Vec<Task>) {
    tasks.iter().cloned().partition(Task::is_active)
}

/// Stable sort by priority rank (`High` first). Equal priorities keep their
/// input order.
pub fn sort_by_priority<T>(rows: &mut [T], priority: impl Fn(&T) -> Priority) {
    rows.sort_by_key(|row| priority(row).rank());
}

/// Active rows of one employee, assignee dropped, sorted for display.
#[must_use]
pub fn by_assignee(active: &[Task], name: &str) -> Vec<ViewRow> {
    let mut rows: Vec<ViewRow> = active
        .iter()
        .filter(|t| t.is_active() && t.assignee == name)
        .map(ViewRow::from_task)
        .collect();
    sort_by_priority(&mut rows, |r| r.priority);
    rows
}

/// Returns `true` if the title or assignee contains `query`, ignoring case.
/// A blank query matches everything.
#[must_use]
pub fn matches_query(task: &Task, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty()
        || task.title.to_lowercase().contains(&query)
        || task.assignee.to_lowercase().contains(&query)
}

/// Archived rows matching `query` on title or assignee.
#[must_use]
pub fn search(archived: &[Task], query: &str) -> Vec<Task> {
    archived
        .iter()
        .filter(|t| matches_query(t, query))
        .cloned()
        .collect()
}

/// Distinct assignee names, sorted.
#[must_use]
pub fn assignees(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .map(|t| t.assignee.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
