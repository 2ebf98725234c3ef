//! Summary figures over the task table.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use officeflow_model::task::{Priority, Task, TaskStatus};

/// Dashboard numbers, recomputed from the table on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardStats {
    /// Rows in the table.
    pub total: usize,
    /// Rows not yet done.
    pub active: usize,
    /// Done rows.
    pub archived: usize,
    /// High-priority rows across the whole table, done ones included.
    pub high_priority: usize,
    /// Active rows whose deadline has passed.
    pub overdue: usize,
    /// Active rows per employee.
    pub load_by_assignee: BTreeMap<String, usize>,
    /// Rows per status.
    pub by_status: BTreeMap<TaskStatus, usize>,
    /// Rows per priority.
    pub by_priority: BTreeMap<Priority, usize>,
}

impl BoardStats {
    /// Computes the figures for `tasks` as of `today`.
    #[must_use]
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let mut stats = Self {
            total: tasks.len(),
            ..Self::default()
        };

        for task in tasks {
            *stats.by_status.entry(task.status).or_default() += 1;
            *stats.by_priority.entry(task.priority).or_default() += 1;
            if task.priority == Priority::High {
                stats.high_priority += 1;
            }
            if task.is_active() {
                stats.active += 1;
                *stats
                    .load_by_assignee
                    .entry(task.assignee.clone())
                    .or_default() += 1;
                if task.deadline < today {
                    stats.overdue += 1;
                }
            } else {
                stats.archived += 1;
            }
        }

        stats
    }

    /// Rows with `status`, zero if none.
    #[must_use]
    pub fn status_count(&self, status: TaskStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Rows with `priority`, zero if none.
    #[must_use]
    pub fn priority_count(&self, priority: Priority) -> usize {
        self.by_priority.get(&priority).copied().unwrap_or(0)
    }
}
