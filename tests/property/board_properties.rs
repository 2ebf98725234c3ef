//! Property-based tests for the board's table functions.
//!
//! Uses proptest to verify:
//! 1. `split_by_status` is disjoint and exhaustive and keeps order.
//! 2. Merging an unedited assignee view changes nothing, in either mode.
//! 3. Merging an emptied view with absence-deletes removes exactly that
//!    assignee's active rows; explicit mode removes nothing.
//! 4. Other assignees' rows keep their relative order through a merge.
//! 5. `rename_assignee` touches exactly the matching rows.
//! 6. The priority display sort is stable.
//! 7. `react` n times adds n to one counter only.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use officeflow::board::admin::rename_assignee;
use officeflow::board::merge::{MergeMode, merge_assignee_view, merge_search_view};
use officeflow::board::partition::{by_assignee, sort_by_priority, split_by_status};
use officeflow::chat::ChatLog;
use officeflow_model::message::Reaction;
use officeflow_model::task::{Priority, Task, TaskStatus};
use proptest::prelude::*;

const NAMES: [&str; 4] = ["Alice", "Bob", "Carol", "Dave"];

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Pending),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Done),
    ]
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::High),
        Just(Priority::Medium),
        Just(Priority::Low),
    ]
}

fn arb_reaction() -> impl Strategy<Value = Reaction> {
    prop_oneof![
        Just(Reaction::ThumbsUp),
        Just(Reaction::Fire),
        Just(Reaction::Laugh),
        Just(Reaction::Check),
    ]
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        "[a-z]{1,8}",
        prop::sample::select(NAMES.to_vec()),
        arb_status(),
        arb_priority(),
        0u32..60,
    )
        .prop_map(|(title, assignee, status, priority, offset)| {
            let deadline = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                + chrono::Days::new(u64::from(offset));
            Task::new(title, assignee, deadline)
                .with_status(status)
                .with_priority(priority)
        })
}

fn arb_table() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(arb_task(), 0..24)
}

fn sorted(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|t| t.id.to_string());
    tasks
}

proptest! {
    #[test]
    fn split_is_exact_partition(tasks in arb_table()) {
        let (active, archived) = split_by_status(&tasks);
        prop_assert_eq!(active.len() + archived.len(), tasks.len());
        prop_assert!(active.iter().all(Task::is_active));
        prop_assert!(archived.iter().all(|t| !t.is_active()));

        let expected_active: Vec<Task> = tasks.iter().filter(|t| t.is_active()).cloned().collect();
        prop_assert_eq!(active, expected_active);
    }

    #[test]
    fn unedited_view_merge_is_noop(
        tasks in arb_table(),
        name in prop::sample::select(NAMES.to_vec()),
        absence in any::<bool>(),
    ) {
        let mode = if absence { MergeMode::AbsenceDeletes } else { MergeMode::Explicit };
        let view = by_assignee(&tasks, name);
        let (merged, summary) = merge_assignee_view(&tasks, name, &view, mode);
        prop_assert!(summary.is_noop());
        prop_assert_eq!(sorted(merged), sorted(tasks));
    }

    #[test]
    fn emptied_view_removes_exactly_active_rows(
        tasks in arb_table(),
        name in prop::sample::select(NAMES.to_vec()),
    ) {
        let (merged, summary) = merge_assignee_view(&tasks, name, &[], MergeMode::AbsenceDeletes);
        let expected: Vec<Task> = tasks
            .iter()
            .filter(|t| !(t.assignee == name && t.is_active()))
            .cloned()
            .collect();
        prop_assert_eq!(summary.deleted, tasks.len() - expected.len());
        prop_assert_eq!(merged, expected);

        let (kept, summary) = merge_assignee_view(&tasks, name, &[], MergeMode::Explicit);
        prop_assert!(summary.is_noop());
        prop_assert_eq!(kept, tasks);
    }

    #[test]
    fn other_assignees_keep_relative_order(
        tasks in arb_table(),
        name in prop::sample::select(NAMES.to_vec()),
        new_title in "[A-Z]{1,6}",
    ) {
        let mut view = by_assignee(&tasks, name);
        if let Some(first) = view.first_mut() {
            first.title = new_title;
        }
        let (merged, _) = merge_assignee_view(&tasks, name, &view, MergeMode::AbsenceDeletes);

        let others = |rows: &[Task]| -> Vec<Task> {
            rows.iter().filter(|t| t.assignee != name).cloned().collect()
        };
        prop_assert_eq!(others(&merged), others(&tasks));

        let archived_of = |rows: &[Task]| -> Vec<Task> {
            rows.iter().filter(|t| t.assignee == name && !t.is_active()).cloned().collect()
        };
        prop_assert_eq!(archived_of(&merged), archived_of(&tasks));
    }

    #[test]
    fn emptied_search_view_removes_matches_only(tasks in arb_table(), query in "[a-z]{0,2}") {
        let (merged, _) = merge_search_view(&tasks, &query, &[], MergeMode::AbsenceDeletes);
        prop_assert!(merged.iter().all(|t| tasks.contains(t)));
        prop_assert_eq!(
            merged.iter().filter(|t| t.is_active()).count(),
            tasks.iter().filter(|t| t.is_active()).count()
        );
    }

    #[test]
    fn rename_touches_exactly_matching_rows(
        tasks in arb_table(),
        old in prop::sample::select(NAMES.to_vec()),
    ) {
        let mut renamed = tasks.clone();
        let matches = tasks.iter().filter(|t| t.assignee == old).count();
        prop_assert_eq!(rename_assignee(&mut renamed, old, "Zed"), matches);
        for (before, after) in tasks.iter().zip(&renamed) {
            if before.assignee == old {
                prop_assert_eq!(after.assignee.as_str(), "Zed");
            } else {
                prop_assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn priority_sort_is_stable(priorities in prop::collection::vec(arb_priority(), 0..32)) {
        let mut rows: Vec<(usize, Priority)> = priorities.into_iter().enumerate().collect();
        sort_by_priority(&mut rows, |r| r.1);
        for pair in rows.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(a.1.rank() <= b.1.rank());
            if a.1 == b.1 {
                prop_assert!(a.0 < b.0);
            }
        }
    }

    #[test]
    fn react_n_times_adds_n_to_one_counter(reaction in arb_reaction(), n in 0u32..20) {
        let mut log = ChatLog::new();
        let id = log.send("Bob", "hi", "12:00").unwrap();
        for _ in 0..n {
            log.react(&id, reaction).unwrap();
        }
        let counters = log.get(&id).unwrap().reactions;
        for other in Reaction::ALL {
            let expected = if other == reaction { n } else { 0 };
            prop_assert_eq!(counters.get(other), expected);
        }
    }
}
