//! Integration tests for the board: per-employee and archive views edited
//! and committed back through a file-backed store.
//!
//! Covers the add-a-row scenario, absence-deletes versus explicit merges,
//! stale-view conflicts, bulk administration, and stats over the stored
//! table.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use officeflow::board::{
    Board, BoardError, Confirmation, MergeMode, NewTask, RowEdit, ViewRow, merge::diff_view,
};
use officeflow::store::{CsvTaskStore, InMemoryTaskStore, TaskStore};
use officeflow_model::task::{Priority, TaskStatus};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn add(board: &Board<impl TaskStore>, title: &str, assignee: &str) {
    board
        .create_task(NewTask::new(title, assignee).deadline(date(10)))
        .unwrap()
        .unwrap();
}

fn titles_of(board: &Board<impl TaskStore>, assignee: &str) -> Vec<String> {
    board
        .snapshot()
        .unwrap()
        .tasks
        .into_iter()
        .filter(|t| t.assignee == assignee)
        .map(|t| t.title)
        .collect()
}

// ---------------------------------------------------------------------------
// View scenarios
// ---------------------------------------------------------------------------

#[test]
fn adding_row_in_assignee_view_appends_task() {
    let dir = tempfile::tempdir().unwrap();
    let board = Board::new(CsvTaskStore::new(dir.path().join("tasks.csv")));
    board
        .create_task(
            NewTask::new("T1", "Alice")
                .priority(Priority::High)
                .deadline(date(1)),
        )
        .unwrap();

    let view = board.assignee_view("Alice").unwrap();
    let mut rows = view.rows.clone();
    rows.push(ViewRow::new("T2", date(2)));
    let summary = board
        .commit_assignee_view(view.revision, "Alice", &rows)
        .unwrap();
    assert_eq!(summary.inserted, 1);

    let tasks = board.snapshot().unwrap().tasks;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "T1");
    assert_eq!(tasks[0].priority, Priority::High);
    assert_eq!(tasks[1].title, "T2");
    assert_eq!(tasks[1].assignee, "Alice");
    assert_eq!(tasks[1].status, TaskStatus::Pending);
    assert_eq!(tasks[1].priority, Priority::Medium);
}

#[test]
fn absence_deletes_mode_drops_omitted_rows() {
    let board = Board::new(InMemoryTaskStore::new()).with_merge_mode(MergeMode::AbsenceDeletes);
    add(&board, "T1", "Alice");
    add(&board, "T2", "Alice");
    add(&board, "B1", "Bob");

    let view = board.assignee_view("Alice").unwrap();
    let kept: Vec<ViewRow> = view
        .rows
        .iter()
        .filter(|r| r.title == "T2")
        .cloned()
        .collect();
    let summary = board
        .commit_assignee_view(view.revision, "Alice", &kept)
        .unwrap();

    assert_eq!(summary.deleted, 1);
    assert_eq!(titles_of(&board, "Alice"), ["T2"]);
    assert_eq!(titles_of(&board, "Bob"), ["B1"]);
}

#[test]
fn explicit_mode_keeps_omitted_rows_and_deletes_on_request() {
    let board = Board::new(InMemoryTaskStore::new());
    add(&board, "T1", "Alice");
    add(&board, "T2", "Alice");

    let view = board.assignee_view("Alice").unwrap();
    let summary = board
        .commit_assignee_view(view.revision, "Alice", &[])
        .unwrap();
    assert!(summary.is_noop());
    assert_eq!(titles_of(&board, "Alice"), ["T1", "T2"]);

    let doomed = view.rows.iter().find(|r| r.title == "T1").unwrap();
    let edits = vec![RowEdit::Delete(doomed.id.clone().unwrap())];
    let summary = board.apply_edits(Some(view.revision), &edits).unwrap();
    assert_eq!(summary.deleted, 1);
    assert_eq!(titles_of(&board, "Alice"), ["T2"]);
}

#[test]
fn diffed_edit_commits_like_legacy_merge() {
    let board = Board::new(InMemoryTaskStore::new());
    add(&board, "T1", "Alice");
    add(&board, "T2", "Alice");

    let view = board.assignee_view("Alice").unwrap();
    let mut edited: Vec<ViewRow> = view
        .rows
        .iter()
        .filter(|r| r.title != "T1")
        .cloned()
        .collect();
    edited.push(ViewRow::new("T3", date(3)));

    let edits = diff_view(&view.rows, &edited, "Alice");
    board.apply_edits(Some(view.revision), &edits).unwrap();

    let mut titles = titles_of(&board, "Alice");
    titles.sort();
    assert_eq!(titles, ["T2", "T3"]);
}

#[test]
fn archive_view_edit_reopens_task() {
    let dir = tempfile::tempdir().unwrap();
    let board = Board::new(CsvTaskStore::new(dir.path().join("tasks.csv")));
    board
        .create_task(NewTask::new("Report", "Alice").status(TaskStatus::Done))
        .unwrap();
    board
        .create_task(NewTask::new("Invoice", "Bob").status(TaskStatus::Done))
        .unwrap();

    let view = board.archive_view("report").unwrap();
    assert_eq!(view.rows.len(), 1);
    let mut rows = view.rows.clone();
    rows[0].status = TaskStatus::InProgress;
    board
        .commit_archive_view(view.revision, "report", &rows)
        .unwrap();

    assert_eq!(board.assignee_view("Alice").unwrap().rows.len(), 1);
    assert_eq!(board.archive_view("").unwrap().rows.len(), 1);
}

#[test]
fn archive_absence_delete_spans_assignees() {
    let board = Board::new(InMemoryTaskStore::new()).with_merge_mode(MergeMode::AbsenceDeletes);
    board
        .create_task(NewTask::new("Old report", "Alice").status(TaskStatus::Done))
        .unwrap();
    board
        .create_task(NewTask::new("Old invoice", "Bob").status(TaskStatus::Done))
        .unwrap();
    add(&board, "Live", "Bob");

    let view = board.archive_view("old").unwrap();
    let summary = board.commit_archive_view(view.revision, "old", &[]).unwrap();
    assert_eq!(summary.deleted, 2);
    assert_eq!(board.snapshot().unwrap().tasks.len(), 1);
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

#[test]
fn stale_view_is_refused_and_table_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let board = Board::new(CsvTaskStore::new(&path));
    add(&board, "T1", "Alice");

    let view = board.assignee_view("Alice").unwrap();

    let other_writer = Board::new(CsvTaskStore::new(&path));
    add(&other_writer, "B1", "Bob");
    let before = std::fs::read_to_string(&path).unwrap();

    let err = board
        .commit_assignee_view(view.revision, "Alice", &[])
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

#[test]
fn rename_and_move_through_board() {
    let board = Board::new(InMemoryTaskStore::new());
    add(&board, "T1", "Alice");
    add(&board, "T2", "Alice");
    add(&board, "B1", "Bob");

    assert_eq!(board.rename_assignee("Alice", "Alicia").unwrap(), 2);
    assert_eq!(board.rename_assignee("Nobody", "Somebody").unwrap(), 0);

    let moved = board.move_task_by_title("Alicia", "Bob", "T1").unwrap();
    assert!(moved.is_some());
    assert!(
        board
            .move_task_by_title("Alicia", "Bob", "missing")
            .unwrap()
            .is_none()
    );

    let t2 = board
        .snapshot()
        .unwrap()
        .tasks
        .into_iter()
        .find(|t| t.title == "T2")
        .unwrap();
    board.move_task(&t2.id, "Carol").unwrap();

    assert!(titles_of(&board, "Alicia").is_empty());
    assert_eq!(titles_of(&board, "Bob"), ["T1", "B1"]);
    assert_eq!(titles_of(&board, "Carol"), ["T2"]);
}

#[test]
fn blank_names_never_reach_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let board = Board::new(CsvTaskStore::new(&path)).with_merge_mode(MergeMode::AbsenceDeletes);
    add(&board, "T1", "Alice");
    add(&board, "T2", "Alice");
    let t1 = board.snapshot().unwrap().tasks[0].clone();

    assert!(!board.move_task(&t1.id, "   ").unwrap());
    assert!(board.move_task_by_title("Alice", "", "T2").unwrap().is_none());

    let view = board.assignee_view("").unwrap();
    board
        .commit_assignee_view(view.revision, "", &[ViewRow::new("T3", date(3))])
        .unwrap();

    let mut blank_owner = t1.clone();
    blank_owner.assignee = " ".to_string();
    let revision = board.snapshot().unwrap().revision;
    board
        .apply_edits(Some(revision), &[RowEdit::Upsert(blank_owner)])
        .unwrap();

    let reloaded = Board::new(CsvTaskStore::new(&path)).snapshot().unwrap().tasks;
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.iter().all(|t| t.assignee == "Alice"));
}

#[test]
fn edited_title_reads_back_as_committed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let board = Board::new(CsvTaskStore::new(&path));
    add(&board, "T1", "Alice");

    let view = board.assignee_view("Alice").unwrap();
    let mut rows = view.rows.clone();
    rows[0].title = "T1 ".to_string();
    board
        .commit_assignee_view(view.revision, "Alice", &rows)
        .unwrap();

    let reloaded = Board::new(CsvTaskStore::new(&path)).snapshot().unwrap().tasks;
    assert_eq!(reloaded[0].title, "T1 ");
}

#[test]
fn diffed_edit_leaves_other_employees_alone() {
    let board = Board::new(InMemoryTaskStore::new());
    add(&board, "T1", "Alice");
    add(&board, "B1", "Bob");
    let bob = board.snapshot().unwrap().tasks[1].clone();

    let view = board.assignee_view("Alice").unwrap();
    let mut edited = view.rows.clone();
    let mut copied = ViewRow::from_task(&bob);
    copied.title = "copied".to_string();
    edited.push(copied);

    let edits = diff_view(&view.rows, &edited, "Alice");
    board.apply_edits(Some(view.revision), &edits).unwrap();

    let tasks = board.snapshot().unwrap().tasks;
    assert!(tasks.contains(&bob));
    assert_eq!(titles_of(&board, "Alice"), ["T1", "copied"]);
}

#[test]
fn deleting_employee_requires_confirmation() {
    let board = Board::new(InMemoryTaskStore::new());
    add(&board, "C1", "Carol");
    board
        .create_task(NewTask::new("C2", "Carol").status(TaskStatus::Done))
        .unwrap();
    add(&board, "B1", "Bob");

    let err = board
        .delete_assignee("Carol", Confirmation::Unconfirmed)
        .unwrap_err();
    assert!(matches!(err, BoardError::NotConfirmed(_)));
    assert_eq!(board.snapshot().unwrap().tasks.len(), 3);

    assert_eq!(
        board
            .delete_assignee("Carol", Confirmation::Confirmed)
            .unwrap(),
        2
    );
    assert!(titles_of(&board, "Carol").is_empty());
    assert_eq!(titles_of(&board, "Bob"), ["B1"]);
}

#[test]
fn stats_reflect_stored_table() {
    let board = Board::new(InMemoryTaskStore::new());
    board
        .create_task(
            NewTask::new("T1", "Alice")
                .priority(Priority::High)
                .deadline(date(1)),
        )
        .unwrap();
    board
        .create_task(
            NewTask::new("T2", "Bob")
                .priority(Priority::High)
                .status(TaskStatus::Done)
                .deadline(date(1)),
        )
        .unwrap();

    let stats = board.stats(date(5)).unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.archived, 1);
    assert_eq!(stats.high_priority, 2);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.load_by_assignee.get("Alice"), Some(&1));
    assert_eq!(stats.load_by_assignee.get("Bob"), None);
}
