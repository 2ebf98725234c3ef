//! The task board: views, merges and administrative operations over a
//! [`TaskStore`].
//!
//! [`Board`] holds no table of its own. Every read loads a fresh
//! [`Snapshot`]; every mutation reloads, applies, and saves with
//! [`TaskStore::save_if`] against the revision it loaded. Operations that
//! commit an edited view also take the revision the view was derived from,
//! so an edit based on stale data is refused with
//! [`StoreError::Conflict`] rather than written over someone else's change.
//!
//! The pure table functions live in the submodules and can be used without a
//! store.

pub mod admin;
pub mod merge;
pub mod partition;

use chrono::NaiveDate;
use officeflow_model::task::{Priority, Task, TaskId, TaskStatus};

use crate::stats::BoardStats;
use crate::store::{Revision, Snapshot, StoreError, TaskStore, today};

pub use admin::Confirmation;
pub use merge::{MergeMode, MergeSummary, RowEdit};
pub use partition::ViewRow;

/// Errors that can occur during board operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// A destructive operation was attempted without confirmation.
    #[error("deleting every task of {0} requires confirmation")]
    NotConfirmed(String),

    /// Task with the given id was not found.
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// Loading or saving the table failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BoardError {
    /// Returns `true` if the table changed since the caller's revision.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::Conflict { .. }))
    }
}

/// Input for [`Board::create_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task title; blank titles are ignored.
    pub title: String,
    /// Responsible employee; blank names are ignored.
    pub assignee: String,
    /// Defaults to [`Priority::Medium`].
    pub priority: Priority,
    /// Defaults to [`TaskStatus::Pending`].
    pub status: TaskStatus,
    /// Defaults to today.
    pub deadline: Option<NaiveDate>,
}

impl NewTask {
    /// A pending, medium-priority task due today.
    #[must_use]
    pub fn new(title: impl Into<String>, assignee: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            assignee: assignee.into(),
            priority: Priority::default(),
            status: TaskStatus::Pending,
            deadline: None,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Rows derived from the table, plus the revision they were derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<T> {
    /// The view rows, in display order.
    pub rows: Vec<T>,
    /// Pass back when committing an edit of these rows.
    pub revision: Revision,
}

/// First half of a confirmed employee deletion.
///
/// Carries what the operator is asked to confirm. Committing the ticket
/// fails with a conflict if the table changed since it was prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTicket {
    /// Employee whose rows will be removed.
    pub name: String,
    /// Number of rows that will be removed.
    pub rows: usize,
    /// Revision the count was taken at.
    pub revision: Revision,
}

/// Task board over a [`TaskStore`].
pub struct Board<S> {
    store: S,
    mode: MergeMode,
}

impl<S: TaskStore> Board<S> {
    /// Creates a board with the default [`MergeMode::Explicit`].
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            mode: MergeMode::default(),
        }
    }

    /// Sets how rows missing from a committed view are treated.
    #[must_use]
    pub fn with_merge_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Merge mode in effect.
    #[must_use]
    pub const fn merge_mode(&self) -> MergeMode {
        self.mode
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Loads the whole table.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if the table cannot be loaded.
    pub fn snapshot(&self) -> Result<Snapshot, BoardError> {
        Ok(self.store.load()?)
    }

    /// Appends a new task. Returns `None` without touching storage if the
    /// title or assignee is blank.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if loading or saving fails.
    pub fn create_task(&self, new: NewTask) -> Result<Option<Task>, BoardError> {
        let title = new.title.trim();
        let assignee = new.assignee.trim();
        if title.is_empty() || assignee.is_empty() {
            return Ok(None);
        }
        let task = Task::new(title, assignee, new.deadline.unwrap_or_else(today))
            .with_status(new.status)
            .with_priority(new.priority);
        let created = task.clone();
        self.commit(None, "create_task", move |tasks| {
            tasks.push(task);
            Ok(())
        })?;
        Ok(Some(created))
    }

    /// Active rows of one employee, sorted by priority for display.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if the table cannot be loaded.
    pub fn assignee_view(&self, name: &str) -> Result<View<ViewRow>, BoardError> {
        let snapshot = self.store.load()?;
        let rows = partition::by_assignee(&snapshot.tasks, name);
        tracing::debug!(assignee = name, rows = rows.len(), "assignee view");
        Ok(View {
            rows,
            revision: snapshot.revision,
        })
    }

    /// Archived rows matching `query` on title or assignee.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if the table cannot be loaded.
    pub fn archive_view(&self, query: &str) -> Result<View<Task>, BoardError> {
        let snapshot = self.store.load()?;
        let (_, archived) = partition::split_by_status(&snapshot.tasks);
        let rows = partition::search(&archived, query);
        tracing::debug!(query, rows = rows.len(), "archive view");
        Ok(View {
            rows,
            revision: snapshot.revision,
        })
    }

    /// Commits an edited per-employee view derived at `base`. A blank `name`
    /// commits nothing.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the table changed since `base`, or
    /// [`BoardError::Store`] if loading or saving fails.
    pub fn commit_assignee_view(
        &self,
        base: Revision,
        name: &str,
        edited: &[ViewRow],
    ) -> Result<MergeSummary, BoardError> {
        if name.trim().is_empty() {
            tracing::debug!("assignee view without a name, nothing to commit");
            return Ok(MergeSummary::default());
        }
        let mode = self.mode;
        self.commit(Some(base), "commit_assignee_view", |tasks| {
            let (merged, summary) = merge::merge_assignee_view(tasks, name, edited, mode);
            *tasks = merged;
            Ok(summary)
        })
    }

    /// Commits an edited archive view derived at `base`.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the table changed since `base`, or
    /// [`BoardError::Store`] if loading or saving fails.
    pub fn commit_archive_view(
        &self,
        base: Revision,
        query: &str,
        edited: &[Task],
    ) -> Result<MergeSummary, BoardError> {
        let mode = self.mode;
        self.commit(Some(base), "commit_archive_view", |tasks| {
            let (merged, summary) = merge::merge_search_view(tasks, query, edited, mode);
            *tasks = merged;
            Ok(summary)
        })
    }

    /// Applies explicit edits. With `Some(base)` the commit is refused if the
    /// table changed since `base`.
    ///
    /// # Errors
    ///
    /// Returns a conflict on a stale `base`, or [`BoardError::Store`] if
    /// loading or saving fails.
    pub fn apply_edits(
        &self,
        base: Option<Revision>,
        edits: &[RowEdit],
    ) -> Result<MergeSummary, BoardError> {
        self.commit(base, "apply_edits", |tasks| {
            let (merged, summary) = merge::apply_edits(tasks, edits);
            *tasks = merged;
            Ok(summary)
        })
    }

    /// Sets the status of one task. Returns `true` if it changed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TaskNotFound`] for an unknown id, or
    /// [`BoardError::Store`] if loading or saving fails.
    pub fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<bool, BoardError> {
        self.commit(None, "set_status", |tasks| {
            admin::set_status(tasks, id, status)
        })
    }

    /// Renames an employee across the whole table. Returns the row count.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if loading or saving fails.
    pub fn rename_assignee(&self, old: &str, new: &str) -> Result<usize, BoardError> {
        self.commit(None, "rename_assignee", |tasks| {
            Ok(admin::rename_assignee(tasks, old, new))
        })
    }

    /// Reassigns one task by id. Returns `true` if it moved; a blank `to`
    /// moves nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TaskNotFound`] for an unknown id, or
    /// [`BoardError::Store`] if loading or saving fails.
    pub fn move_task(&self, id: &TaskId, to: &str) -> Result<bool, BoardError> {
        self.commit(None, "move_task", |tasks| admin::move_task(tasks, id, to))
    }

    /// Reassigns the first task of `from` titled `title`, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if loading or saving fails.
    pub fn move_task_by_title(
        &self,
        from: &str,
        to: &str,
        title: &str,
    ) -> Result<Option<TaskId>, BoardError> {
        self.commit(None, "move_task_by_title", |tasks| {
            Ok(admin::move_task_by_title(tasks, from, to, title))
        })
    }

    /// Counts the rows an employee deletion would remove.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if the table cannot be loaded.
    pub fn prepare_assignee_deletion(&self, name: &str) -> Result<DeletionTicket, BoardError> {
        let snapshot = self.store.load()?;
        let rows = snapshot.tasks.iter().filter(|t| t.assignee == name).count();
        Ok(DeletionTicket {
            name: name.to_string(),
            rows,
            revision: snapshot.revision,
        })
    }

    /// Commits a prepared deletion. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the table changed since the ticket was
    /// prepared, or [`BoardError::Store`] if loading or saving fails.
    pub fn confirm_deletion(&self, ticket: &DeletionTicket) -> Result<usize, BoardError> {
        self.commit(Some(ticket.revision), "confirm_deletion", |tasks| {
            admin::delete_assignee(tasks, &ticket.name, Confirmation::Confirmed)
        })
    }

    /// Removes every task of `name` in one step.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::NotConfirmed`] unless `confirmation` is
    /// [`Confirmation::Confirmed`], or [`BoardError::Store`] if loading or
    /// saving fails.
    pub fn delete_assignee(
        &self,
        name: &str,
        confirmation: Confirmation,
    ) -> Result<usize, BoardError> {
        self.commit(None, "delete_assignee", |tasks| {
            admin::delete_assignee(tasks, name, confirmation)
        })
    }

    /// Summary figures over the current table.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if the table cannot be loaded.
    pub fn stats(&self, today: NaiveDate) -> Result<BoardStats, BoardError> {
        let snapshot = self.store.load()?;
        Ok(BoardStats::compute(&snapshot.tasks, today))
    }

    /// Load, check `base`, apply, and save with compare-and-swap.
    ///
    /// Nothing is written if `apply` fails or leaves the table unchanged.
    fn commit<R>(
        &self,
        base: Option<Revision>,
        operation: &'static str,
        apply: impl FnOnce(&mut Vec<Task>) -> Result<R, BoardError>,
    ) -> Result<R, BoardError> {
        let Snapshot {
            mut tasks,
            revision,
        } = self.store.load()?;

        if let Some(expected) = base
            && expected != revision
        {
            tracing::warn!(operation, %expected, found = %revision, "edit based on stale table");
            return Err(StoreError::Conflict {
                expected,
                found: revision,
            }
            .into());
        }

        let before = tasks.clone();
        let result = apply(&mut tasks)?;
        if tasks == before {
            tracing::debug!(operation, "no change, nothing saved");
            return Ok(result);
        }

        let saved = self.store.save_if(revision, &tasks)?;
        tracing::info!(
            operation,
            rows_before = before.len(),
            rows_after = tasks.len(),
            revision = %saved,
            "board committed"
        );
        Ok(result)
    }
}
