//! Integration tests for the task file store.
//!
//! Exercises the CSV file as people actually leave it: older schemas
//! without a deadline or id column, reordered columns, legacy labels,
//! quoted cells, and concurrent writers.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use officeflow::store::{CsvTaskStore, InMemoryTaskStore, Revision, StoreError, TaskStore, today};
use officeflow_model::task::{Priority, Task, TaskStatus};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
}

fn store_with(contents: &str) -> (tempfile::TempDir, CsvTaskStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    std::fs::write(&path, contents).unwrap();
    let store = CsvTaskStore::new(&path);
    (dir, store)
}

#[test]
fn file_without_deadline_backfills_today() {
    let (_dir, store) = store_with(
        "Task title,Assignee,Status,Priority\n\
         Report,Alice,🔴 Pending,🔥 High\n",
    );
    let tasks = store.load().unwrap().tasks;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].deadline, today());
    assert_eq!(tasks[0].priority, Priority::High);
}

#[test]
fn legacy_labels_and_day_first_dates_load() {
    let (_dir, store) = store_with(
        "Task title,Assignee,Status,Priority,Deadline\n\
         Отчёт,Ирина,🟡 В работе,Низкий,29.02.2024\n\
         Счёт,Ирина,Готово,⚡ Средний,2024-02-29\n",
    );
    let tasks = store.load().unwrap().tasks;
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
    assert_eq!(tasks[0].priority, Priority::Low);
    assert_eq!(tasks[0].deadline, date());
    assert_eq!(tasks[1].status, TaskStatus::Done);
    assert_eq!(tasks[1].priority, Priority::Medium);
}

#[test]
fn reordered_columns_load() {
    let (_dir, store) = store_with(
        "Priority,Deadline,Assignee,Task title,Status\n\
         Low,2024-02-29,Bob,Invoice,Done\n",
    );
    let task = &store.load().unwrap().tasks[0];
    assert_eq!(task.title, "Invoice");
    assert_eq!(task.assignee, "Bob");
    assert_eq!(task.status, TaskStatus::Done);
}

#[test]
fn rows_without_assignee_are_dropped() {
    let (_dir, store) = store_with(
        "Task title,Assignee,Status,Priority,Deadline\n\
         Orphan,,Pending,Low,2024-02-29\n\
         Kept,Alice,Pending,Low,2024-02-29\n",
    );
    let tasks = store.load().unwrap().tasks;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Kept");
}

#[test]
fn missing_required_column_is_error() {
    let (_dir, store) = store_with("Task title,Status,Priority\nT1,Pending,Low\n");
    assert!(matches!(store.load(), Err(StoreError::Codec(_))));
}

#[test]
fn quoted_cells_survive_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvTaskStore::new(dir.path().join("tasks.csv"));
    let tasks = vec![
        Task::new("Buy paper, pens", "Alice", date()),
        Task::new("Say \"hi\"\nto everyone", "Bob", date()).with_status(TaskStatus::Done),
    ];
    store.save(&tasks).unwrap();
    assert_eq!(store.load().unwrap().tasks, tasks);
}

#[test]
fn saved_file_uses_canonical_header_and_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let store = CsvTaskStore::new(&path);
    store
        .save(&[Task::new("T1", "Alice", date()).with_priority(Priority::High)])
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Task title,Assignee,Status,Priority,Deadline,Id")
    );
    assert!(
        lines
            .next()
            .unwrap()
            .starts_with("T1,Alice,🔴 Pending,🔥 High,2024-02-29,")
    );
}

#[test]
fn stale_save_if_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let first = CsvTaskStore::new(&path);
    let second = CsvTaskStore::new(&path);

    first.save(&[Task::new("T1", "Alice", date())]).unwrap();
    let snapshot = first.load().unwrap();

    second
        .save_if(snapshot.revision, &[Task::new("T2", "Bob", date())])
        .unwrap();
    let after_second = std::fs::read_to_string(&path).unwrap();

    let err = first
        .save_if(snapshot.revision, &[Task::new("T3", "Carol", date())])
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), after_second);
}

#[test]
fn unconditional_save_is_last_writer_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    let first = CsvTaskStore::new(&path);
    let second = CsvTaskStore::new(&path);

    first.save(&[Task::new("T1", "Alice", date())]).unwrap();
    second.save(&[Task::new("T2", "Bob", date())]).unwrap();
    let tasks = first.load().unwrap().tasks;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "T2");
}

#[test]
fn memory_and_file_stores_agree_on_empty() {
    let dir = tempfile::tempdir().unwrap();
    let file = CsvTaskStore::new(dir.path().join("absent.csv"));
    let memory = InMemoryTaskStore::new();
    assert_eq!(file.load().unwrap(), memory.load().unwrap());
    assert_eq!(file.load().unwrap().revision, Revision::EMPTY);
}
