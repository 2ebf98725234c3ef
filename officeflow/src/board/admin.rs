//! Table-wide administrative operations.
//!
//! These run on an already-loaded table and return what they changed; the
//! [`Board`](super::Board) wraps each one in a load/apply/save cycle.

use officeflow_model::task::{Task, TaskId, TaskStatus};

use super::BoardError;

/// Whether the operator has confirmed a destructive operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Not yet confirmed; destructive operations are refused.
    Unconfirmed,
    /// Confirmed by the operator.
    Confirmed,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Unconfirmed
        }
    }
}

/// Renames every row assigned to `old`, returning how many rows changed.
///
/// A blank `new` name or an unknown `old` name changes nothing.
pub fn rename_assignee(tasks: &mut [Task], old: &str, new: &str) -> usize {
    let new = new.trim();
    if new.is_empty() || old == new {
        return 0;
    }
    let mut renamed = 0;
    for task in tasks.iter_mut().filter(|t| t.assignee == old) {
        new.clone_into(&mut task.assignee);
        renamed += 1;
    }
    renamed
}

/// Reassigns the row with `id` to `to`. Returns `true` if the row moved.
///
/// A blank `to` changes nothing; every stored row keeps an assignee.
///
/// # Errors
///
/// Returns [`BoardError::TaskNotFound`] if no row has `id`.
pub fn move_task(tasks: &mut [Task], id: &TaskId, to: &str) -> Result<bool, BoardError> {
    let task = find_mut(tasks, id)?;
    let to = to.trim();
    if to.is_empty() || task.assignee == to {
        return Ok(false);
    }
    to.clone_into(&mut task.assignee);
    Ok(true)
}

/// Reassigns the first row, in table order, assigned to `from` with exactly
/// `title`. Returns its id, or `None` if nothing matched or `to` is blank.
///
/// Titles are not unique; when several rows match only the first moves.
pub fn move_task_by_title(tasks: &mut [Task], from: &str, to: &str, title: &str) -> Option<TaskId> {
    let to = to.trim();
    if to.is_empty() {
        return None;
    }
    let task = tasks
        .iter_mut()
        .find(|t| t.assignee == from && t.title == title)?;
    to.clone_into(&mut task.assignee);
    Some(task.id.clone())
}

/// Removes every row assigned to `name`, returning how many were removed.
///
/// # Errors
///
/// Returns [`BoardError::NotConfirmed`] and leaves the table untouched
/// unless `confirmation` is [`Confirmation::Confirmed`].
pub fn delete_assignee(
    tasks: &mut Vec<Task>,
    name: &str,
    confirmation: Confirmation,
) -> Result<usize, BoardError> {
    if confirmation != Confirmation::Confirmed {
        return Err(BoardError::NotConfirmed(name.to_string()));
    }
    let before = tasks.len();
    tasks.retain(|t| t.assignee != name);
    Ok(before - tasks.len())
}

/// Sets the status of the row with `id`. Returns `true` if it changed.
///
/// # Errors
///
/// Returns [`BoardError::TaskNotFound`] if no row has `id`.
pub fn set_status(tasks: &mut [Task], id: &TaskId, status: TaskStatus) -> Result<bool, BoardError> {
    let task = find_mut(tasks, id)?;
    let changed = task.status != status;
    task.status = status;
    Ok(changed)
}

fn find_mut<'a>(tasks: &'a mut [Task], id: &TaskId) -> Result<&'a mut Task, BoardError> {
    tasks
        .iter_mut()
        .find(|t| t.id == *id)
        .ok_or_else(|| BoardError::TaskNotFound(id.to_string()))
}
