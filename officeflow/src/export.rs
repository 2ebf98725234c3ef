//! Spreadsheet-friendly CSV export.
//!
//! Unlike the task file, the export is meant to be opened by people: it
//! starts with a UTF-8 byte-order mark, shows dates day-first, leaves out the
//! internal id column, and neutralizes cells a spreadsheet would evaluate as
//! formulas.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use officeflow_model::codec::{COLUMNS, write_record};
use officeflow_model::task::{DISPLAY_DATE_FORMAT, Task};

use crate::store::{StoreError, atomic_write};

const BOM: &str = "\u{feff}";

/// Columns shown in the export: every stored column except the id.
const EXPORT_COLUMNS: [&str; 5] = [COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4]];

fn should_neutralize(value: &str) -> bool {
    let trimmed = value.trim_start();
    matches!(trimmed.chars().next(), Some('=' | '+' | '-' | '@'))
}

/// Prefixes a would-be formula with an apostrophe.
fn neutralize(value: &str) -> String {
    if should_neutralize(value) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

/// Renders the table as export CSV bytes.
#[must_use]
pub fn export_csv(tasks: &[Task]) -> Vec<u8> {
    let mut out = String::from(BOM);
    write_record(&mut out, &EXPORT_COLUMNS);
    for task in tasks {
        let title = neutralize(&task.title);
        let assignee = neutralize(&task.assignee);
        let status = task.status.to_string();
        let priority = task.priority.to_string();
        let deadline = task.deadline.format(DISPLAY_DATE_FORMAT).to_string();
        write_record(
            &mut out,
            &[
                title.as_str(),
                assignee.as_str(),
                status.as_str(),
                priority.as_str(),
                deadline.as_str(),
            ],
        );
    }
    out.into_bytes()
}

/// Export file name for `date`: `tasks_YYYY-MM-DD.csv`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("tasks_{}.csv", date.format("%Y-%m-%d"))
}

/// Writes the export into `dir` under [`export_file_name`], returning the
/// path written.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be written.
pub fn write_export(dir: &Path, tasks: &[Task], date: NaiveDate) -> Result<PathBuf, StoreError> {
    let path = dir.join(export_file_name(date));
    atomic_write(&path, &export_csv(tasks))?;
    tracing::info!(path = %path.display(), rows = tasks.len(), "tasks exported");
    Ok(path)
}
