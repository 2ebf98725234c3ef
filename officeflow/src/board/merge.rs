//! Merge functions that fold an edited view back into the full table.
//!
//! Two view shapes exist: the per-employee view (assignee column dropped,
//! active rows only) and the archive search view (full rows, done only). Both
//! merges pass every row outside the view through untouched and in its
//! original relative order.
//!
//! What happens to a row that was in the view but is missing from the edit
//! depends on [`MergeMode`]:
//!
//! - [`MergeMode::Explicit`] keeps it. Deletions go through
//!   [`RowEdit::Delete`] and [`apply_edits`].
//! - [`MergeMode::AbsenceDeletes`] deletes it. This is the legacy behavior of
//!   table editors that hand back "whatever is left"; a truncated edit loses
//!   rows silently.

use std::collections::{HashMap, HashSet};

use officeflow_model::task::{Task, TaskId};

use super::partition::{ViewRow, matches_query};

/// How rows missing from an edited view are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Missing rows are kept; only explicit deletes remove rows.
    #[default]
    Explicit,
    /// Missing rows are deleted.
    AbsenceDeletes,
}

impl std::fmt::Display for MergeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::AbsenceDeletes => write!(f, "absence-deletes"),
        }
    }
}

/// A single explicit change to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEdit {
    /// Replace the row with the same id, or append it if the id is new.
    Upsert(Task),
    /// Remove the row with this id.
    Delete(TaskId),
}

/// What a merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Rows that did not exist before.
    pub inserted: usize,
    /// Existing rows whose content changed.
    pub updated: usize,
    /// Rows removed.
    pub deleted: usize,
}

impl MergeSummary {
    /// Returns `true` if the merge changed nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.deleted == 0
    }
}

/// Rows a person can actually have meant: a blank title is an unused editor
/// line.
fn is_blank(title: &str) -> bool {
    title.trim().is_empty()
}

/// Gives each edited row an id that is unique and, if it claims an existing
/// row, claims one from `in_view`. Anything else becomes an insert.
fn settle_ids(edited: Vec<Task>, in_view: &HashMap<TaskId, &Task>) -> Vec<Task> {
    let mut claimed = HashSet::new();
    edited
        .into_iter()
        .map(|mut task| {
            if !in_view.contains_key(&task.id) || !claimed.insert(task.id.clone()) {
                task.id = TaskId::new();
            }
            task
        })
        .collect()
}

/// Recombines `tasks` with `edited` replacing the rows of `in_view`.
fn recombine(
    tasks: &[Task],
    in_view: &HashMap<TaskId, &Task>,
    edited: Vec<Task>,
    mode: MergeMode,
) -> (Vec<Task>, MergeSummary) {
    let edited = settle_ids(edited, in_view);
    let edited_ids: HashSet<&TaskId> = edited.iter().map(|t| &t.id).collect();
    let mut summary = MergeSummary::default();
    let mut merged = Vec::with_capacity(tasks.len() + edited.len());

    for task in tasks {
        if !in_view.contains_key(&task.id) {
            merged.push(task.clone());
        } else if edited_ids.contains(&task.id) {
            // Re-added from the edit below.
        } else if mode == MergeMode::AbsenceDeletes {
            summary.deleted += 1;
        } else {
            merged.push(task.clone());
        }
    }

    for task in edited {
        match in_view.get(&task.id) {
            Some(original) if **original == task => {}
            Some(_) => summary.updated += 1,
            None => summary.inserted += 1,
        }
        merged.push(task);
    }

    (merged, summary)
}

/// Merges an edited per-employee view back into the table.
///
/// The result is every row of other employees, every archived row of
/// `assignee`, and the edited rows with `assignee` reattached. Active rows of
/// `assignee` missing from `edited` are kept or deleted according to `mode`.
/// Edited rows with a blank title are ignored. A blank `assignee` names no
/// view, so the table comes back unchanged.
#[must_use]
pub fn merge_assignee_view(
    tasks: &[Task],
    assignee: &str,
    edited: &[ViewRow],
    mode: MergeMode,
) -> (Vec<Task>, MergeSummary) {
    if is_blank(assignee) {
        return (tasks.to_vec(), MergeSummary::default());
    }
    let in_view: HashMap<TaskId, &Task> = tasks
        .iter()
        .filter(|t| t.assignee == assignee && t.is_active())
        .map(|t| (t.id.clone(), t))
        .collect();
    let edited = edited
        .iter()
        .filter(|row| !is_blank(&row.title))
        .map(|row| row.clone().into_task(assignee))
        .collect();
    recombine(tasks, &in_view, edited, mode)
}

/// Merges an edited archive search view back into the table.
///
/// The view is every archived row matching `query`. A matched row missing
/// from `edited` is kept or removed from the whole table, whoever it belongs
/// to, according to `mode`. Edited rows with a blank title or assignee are
/// ignored.
#[must_use]
pub fn merge_search_view(
    tasks: &[Task],
    query: &str,
    edited: &[Task],
    mode: MergeMode,
) -> (Vec<Task>, MergeSummary) {
    let in_view: HashMap<TaskId, &Task> = tasks
        .iter()
        .filter(|t| !t.is_active() && matches_query(t, query))
        .map(|t| (t.id.clone(), t))
        .collect();
    let edited = edited
        .iter()
        .filter(|t| !is_blank(&t.title) && !is_blank(&t.assignee))
        .cloned()
        .collect();
    recombine(tasks, &in_view, edited, mode)
}

/// Applies explicit edits in order.
///
/// Upserts replace in place, keeping the row's position. Deleting an unknown
/// id is a no-op. Upserts with a blank title or assignee are ignored.
#[must_use]
pub fn apply_edits(tasks: &[Task], edits: &[RowEdit]) -> (Vec<Task>, MergeSummary) {
    let mut merged = tasks.to_vec();
    let mut summary = MergeSummary::default();

    for edit in edits {
        match edit {
            RowEdit::Upsert(task) if is_blank(&task.title) || is_blank(&task.assignee) => {}
            RowEdit::Upsert(task) => {
                if let Some(slot) = merged.iter_mut().find(|t| t.id == task.id) {
                    if *slot != *task {
                        slot.clone_from(task);
                        summary.updated += 1;
                    }
                } else {
                    merged.push(task.clone());
                    summary.inserted += 1;
                }
            }
            RowEdit::Delete(id) => {
                let before = merged.len();
                merged.retain(|t| t.id != *id);
                summary.deleted += before - merged.len();
            }
        }
    }

    (merged, summary)
}

/// Translates an absence-based edit of a per-employee view into explicit
/// edits: a delete for every original row missing from `edited`, an upsert
/// for every new or changed row.
///
/// Ids are settled the way [`merge_assignee_view`] settles them: an edited
/// row only keeps its id if that id came from `original` and no earlier row
/// claimed it; otherwise it is inserted under a fresh id. Blank-title rows
/// count as absent. A blank `assignee` yields no edits.
#[must_use]
pub fn diff_view(original: &[ViewRow], edited: &[ViewRow], assignee: &str) -> Vec<RowEdit> {
    if is_blank(assignee) {
        return Vec::new();
    }
    let before: HashMap<&TaskId, &ViewRow> = original
        .iter()
        .filter_map(|r| r.id.as_ref().map(|id| (id, r)))
        .collect();

    let mut claimed: HashSet<&TaskId> = HashSet::new();
    let mut upserts = Vec::new();
    for row in edited.iter().filter(|row| !is_blank(&row.title)) {
        let kept = row
            .id
            .as_ref()
            .and_then(|id| before.get_key_value(id))
            .filter(|(id, _)| claimed.insert(**id));
        match kept {
            Some((_, previous)) if *previous == row => {}
            Some(_) => upserts.push(RowEdit::Upsert(row.clone().into_task(assignee))),
            None => {
                let mut fresh = row.clone();
                fresh.id = None;
                upserts.push(RowEdit::Upsert(fresh.into_task(assignee)));
            }
        }
    }

    let deletes = original
        .iter()
        .filter_map(|r| r.id.as_ref())
        .filter(|id| !claimed.contains(id))
        .map(|id| RowEdit::Delete(id.clone()));
    let mut edits: Vec<RowEdit> = deletes.collect();
    edits.extend(upserts);
    edits
}
