//! CSV encoding and decoding for the task table file.
//!
//! The file is a header row followed by one row per task. Columns are located
//! by header name rather than position, so a file that was reordered in a
//! spreadsheet still loads. Decoding also normalizes older files:
//!
//! - a missing or blank `Deadline` is back-filled with the caller's `today`,
//! - a missing, blank or duplicated `Id` gets a fresh [`TaskId`],
//! - rows with a blank assignee are dropped.
//!
//! The repairs are counted in [`DecodedTable`] so the store can log them.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::task::{Priority, STORAGE_DATE_FORMAT, Task, TaskId, TaskStatus, parse_deadline};

/// Canonical header row, in write order.
pub const COLUMNS: [&str; 6] = ["Task title", "Assignee", "Status", "Priority", "Deadline", "Id"];

/// Error type for table encode/decode operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A quoted field was still open at end of input.
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote {
        /// 1-based line where the quote opened.
        line: usize,
    },
    /// The header row lacks a column every row needs.
    #[error("missing required column {0:?}")]
    MissingColumn(&'static str),
    /// A cell could not be parsed into its column type.
    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidField {
        /// 1-based data row number (the header is row 0).
        row: usize,
        /// Canonical column name.
        column: &'static str,
        /// The rejected cell.
        value: String,
    },
}

/// Result of decoding a task file, with the repairs applied on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedTable {
    /// The decoded rows, in file order.
    pub tasks: Vec<Task>,
    /// Rows whose deadline was missing and set to today.
    pub backfilled_deadlines: usize,
    /// Rows that received a fresh id.
    pub assigned_ids: usize,
    /// Rows discarded for having no assignee.
    pub dropped_rows: usize,
}

impl DecodedTable {
    /// Returns `true` if any row was repaired or dropped.
    #[must_use]
    pub const fn was_repaired(&self) -> bool {
        self.backfilled_deadlines > 0 || self.assigned_ids > 0 || self.dropped_rows > 0
    }
}

/// Header spellings accepted for each column, canonical name first.
const TITLE: &[&str] = &["Task title", "Task", "Title", "Задача"];
const ASSIGNEE: &[&str] = &["Assignee", "Employee", "Сотрудник", "Исполнитель"];
const STATUS: &[&str] = &["Status", "Статус"];
const PRIORITY: &[&str] = &["Priority", "Приоритет"];
const DEADLINE: &[&str] = &["Deadline", "Due", "Дедлайн", "Срок"];
const ID: &[&str] = &["Id", "ID", "Task id"];

fn find_column(header: &[String], spellings: &[&str]) -> Option<usize> {
    header.iter().position(|h| {
        let h = h.trim();
        spellings.iter().any(|s| h.eq_ignore_ascii_case(s) || h == *s)
    })
}

fn require_column(header: &[String], spellings: &[&'static str]) -> Result<usize, CodecError> {
    find_column(header, spellings).ok_or(CodecError::MissingColumn(spellings[0]))
}

/// Appends one CSV record (with trailing newline) to `out`.
///
/// Fields containing a comma, quote, CR or LF are quoted, with embedded
/// quotes doubled.
pub fn write_record(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Splits CSV text into records of fields.
///
/// Handles quoted fields (with doubled quotes and embedded line breaks),
/// LF and CRLF line endings, and a leading byte-order mark. Blank lines are
/// skipped.
///
/// # Errors
///
/// Returns [`CodecError::UnterminatedQuote`] if a quoted field never closes.
pub fn parse_records(input: &str) -> Result<Vec<Vec<String>>, CodecError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted_field = false;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = input.chars().peekable();

    let mut end_record = |record: &mut Vec<String>, field: &mut String, quoted: bool| {
        record.push(std::mem::take(field));
        let blank = record.len() == 1 && record[0].is_empty() && !quoted;
        let finished = std::mem::take(record);
        if !blank {
            records.push(finished);
        }
    };

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quoted_field = true;
                quote_line = line;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                quoted_field = false;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                end_record(&mut record, &mut field, quoted_field);
                quoted_field = false;
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CodecError::UnterminatedQuote { line: quote_line });
    }
    if !field.is_empty() || !record.is_empty() || quoted_field {
        end_record(&mut record, &mut field, quoted_field);
    }
    Ok(records)
}

/// Encodes the table as CSV text with the canonical header.
#[must_use]
pub fn encode_table(tasks: &[Task]) -> String {
    let mut out = String::new();
    write_record(&mut out, &COLUMNS);
    for task in tasks {
        let status = task.status.to_string();
        let priority = task.priority.to_string();
        let deadline = task.deadline.format(STORAGE_DATE_FORMAT).to_string();
        let id = task.id.to_string();
        write_record(
            &mut out,
            &[
                task.title.as_str(),
                task.assignee.as_str(),
                status.as_str(),
                priority.as_str(),
                deadline.as_str(),
                id.as_str(),
            ],
        );
    }
    out
}

/// Decodes CSV text into tasks, repairing older schemas on the way.
///
/// Empty input decodes to an empty table.
///
/// # Errors
///
/// Returns [`CodecError`] if the CSV is malformed, a required column is
/// missing from the header, or a status, priority, deadline or id cell
/// cannot be parsed.
pub fn decode_table(input: &str, today: NaiveDate) -> Result<DecodedTable, CodecError> {
    let mut records = parse_records(input)?.into_iter();
    let Some(header) = records.next() else {
        return Ok(DecodedTable::default());
    };

    let title_col = require_column(&header, TITLE)?;
    let assignee_col = require_column(&header, ASSIGNEE)?;
    let status_col = require_column(&header, STATUS)?;
    let priority_col = require_column(&header, PRIORITY)?;
    let deadline_col = find_column(&header, DEADLINE);
    let id_col = find_column(&header, ID);

    let mut decoded = DecodedTable::default();
    let mut seen_ids = HashSet::new();

    for (index, record) in records.enumerate() {
        let row = index + 1;
        let cell = |col: usize| record.get(col).map_or("", |s| s.trim());
        let invalid = |column: &'static str, value: &str| CodecError::InvalidField {
            row,
            column,
            value: value.to_string(),
        };

        let assignee = cell(assignee_col);
        if assignee.is_empty() {
            decoded.dropped_rows += 1;
            continue;
        }

        let status_raw = cell(status_col);
        let status = status_raw
            .parse::<TaskStatus>()
            .map_err(|_| invalid(COLUMNS[2], status_raw))?;
        let priority_raw = cell(priority_col);
        let priority = priority_raw
            .parse::<Priority>()
            .map_err(|_| invalid(COLUMNS[3], priority_raw))?;

        let deadline_raw = deadline_col.map_or("", cell);
        let deadline = if deadline_raw.is_empty() {
            decoded.backfilled_deadlines += 1;
            today
        } else {
            parse_deadline(deadline_raw).ok_or_else(|| invalid(COLUMNS[4], deadline_raw))?
        };

        let id_raw = id_col.map_or("", cell);
        let parsed_id = if id_raw.is_empty() {
            None
        } else {
            Some(
                id_raw
                    .parse::<TaskId>()
                    .map_err(|_| invalid(COLUMNS[5], id_raw))?,
            )
        };
        let id = match parsed_id {
            Some(id) if !seen_ids.contains(&id) => id,
            _ => {
                decoded.assigned_ids += 1;
                TaskId::new()
            }
        };
        seen_ids.insert(id.clone());

        decoded.tasks.push(Task {
            id,
            title: record.get(title_col).cloned().unwrap_or_default(),
            assignee: assignee.to_string(),
            status,
            priority,
            deadline,
        });
    }

    Ok(decoded)
}
