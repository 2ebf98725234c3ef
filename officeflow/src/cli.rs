//! Command-line front end.
//!
//! Each [`Command`] maps onto one board or chat operation. [`execute`] opens
//! the stores named by the [`AppConfig`], runs the command, and writes
//! human-readable output to the given writer.

use std::io::Write;
use std::path::PathBuf;

use officeflow_model::message::{ChatMessage, MessageId, Reaction};
use officeflow_model::task::{
    DISPLAY_DATE_FORMAT, Priority, Task, TaskId, TaskStatus, parse_deadline,
};

use crate::board::{Board, BoardError, NewTask, ViewRow};
use crate::chat::{ChatError, ChatRoom, ChatStore, InMemoryChatStore, JsonChatStore};
use crate::config::{AppConfig, ChatPersistence, ConfigError};
use crate::export::write_export;
use crate::store::{CsvTaskStore, StoreError, today};

/// Errors surfaced to the user by the binary.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A board operation failed.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// A chat operation failed.
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// Reading or writing a file failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// The deadline argument is not a date.
    #[error("invalid deadline {0:?}, expected YYYY-MM-DD or DD.MM.YYYY")]
    InvalidDeadline(String),
}

/// Board and chat commands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a task.
    Add {
        /// Task title.
        title: String,
        /// Responsible employee.
        #[arg(long, short)]
        assignee: String,
        /// Priority (high, medium, low).
        #[arg(long, short, default_value = "medium")]
        priority: Priority,
        /// Initial status (pending, in progress, done).
        #[arg(long, short, default_value = "pending")]
        status: TaskStatus,
        /// Deadline (YYYY-MM-DD or DD.MM.YYYY); defaults to today.
        #[arg(long, short)]
        deadline: Option<String>,
    },
    /// List every task.
    List,
    /// Show the active tasks of one employee.
    Board {
        /// Employee name.
        name: String,
    },
    /// Search done tasks by title or assignee.
    Archive {
        /// Case-insensitive search text; empty shows everything.
        query: Option<String>,
    },
    /// Change the status of a task.
    SetStatus {
        /// Task id.
        id: TaskId,
        /// New status.
        status: TaskStatus,
    },
    /// Rename an employee across every task.
    Rename {
        /// Current name.
        old: String,
        /// New name.
        new: String,
    },
    /// Reassign a task, by id or by owner and title.
    Move {
        /// Task id.
        #[arg(required_unless_present = "title")]
        id: Option<TaskId>,
        /// Match by title instead of id (first match wins).
        #[arg(long, requires = "from", conflicts_with = "id")]
        title: Option<String>,
        /// Current owner, with `--title`.
        #[arg(long)]
        from: Option<String>,
        /// New owner.
        #[arg(long)]
        to: String,
    },
    /// Delete every task of an employee.
    DeleteEmployee {
        /// Employee name.
        name: String,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Show summary figures.
    Stats,
    /// Write a spreadsheet-friendly CSV export.
    Export {
        /// Directory to write into.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Team chat.
    #[command(subcommand)]
    Chat(ChatCommand),
}

/// Chat subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Post a message.
    Send {
        /// Author name.
        #[arg(long, short)]
        user: String,
        /// Message text.
        text: String,
    },
    /// React to a message.
    React {
        /// Message id.
        id: MessageId,
        /// Emoji or name (thumbsup, fire, laugh, check).
        emoji: String,
    },
    /// Edit your own message.
    Edit {
        /// Message id.
        id: MessageId,
        /// Your name.
        #[arg(long, short)]
        user: String,
        /// New text.
        text: String,
    },
    /// Delete your own message.
    Delete {
        /// Message id.
        id: MessageId,
        /// Your name.
        #[arg(long, short)]
        user: String,
    },
    /// Show messages, newest first.
    List {
        /// Show at most this many.
        #[arg(long, short)]
        limit: Option<usize>,
    },
}

/// Runs `command` against the stores named in `config`.
///
/// # Errors
///
/// Returns [`CommandError`] if the operation fails or output cannot be
/// written.
pub fn execute(
    command: &Command,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let board =
        Board::new(CsvTaskStore::new(&config.tasks_path)).with_merge_mode(config.merge_mode);

    match command {
        Command::Add {
            title,
            assignee,
            priority,
            status,
            deadline,
        } => {
            let mut new = NewTask::new(title.as_str(), assignee.as_str())
                .priority(*priority)
                .status(*status);
            if let Some(raw) = deadline {
                let date = parse_deadline(raw)
                    .ok_or_else(|| CommandError::InvalidDeadline(raw.clone()))?;
                new = new.deadline(date);
            }
            match board.create_task(new)? {
                Some(task) => writeln!(out, "added {}", task.id)?,
                None => writeln!(out, "nothing added: title and assignee are required")?,
            }
        }
        Command::List => {
            for task in &board.snapshot()?.tasks {
                write_task(out, task)?;
            }
        }
        Command::Board { name } => {
            for row in &board.assignee_view(name)?.rows {
                write_view_row(out, row)?;
            }
        }
        Command::Archive { query } => {
            let view = board.archive_view(query.as_deref().unwrap_or_default())?;
            for task in &view.rows {
                write_task(out, task)?;
            }
        }
        Command::SetStatus { id, status } => {
            if board.set_status(id, *status)? {
                writeln!(out, "{id} is now {status}")?;
            } else {
                writeln!(out, "{id} already {status}")?;
            }
        }
        Command::Rename { old, new } => {
            let renamed = board.rename_assignee(old, new)?;
            writeln!(out, "renamed {renamed} task(s)")?;
        }
        Command::Move { id, title, from, to } => match (id, title, from) {
            (Some(id), _, _) => {
                if board.move_task(id, to)? {
                    writeln!(out, "moved {id} to {to}")?;
                } else {
                    writeln!(out, "nothing moved: {to:?} is blank or already the owner")?;
                }
            }
            (None, Some(title), Some(from)) => {
                match board.move_task_by_title(from, to, title)? {
                    Some(id) => writeln!(out, "moved {id} to {to}")?,
                    None => writeln!(out, "no task of {from} titled {title:?}")?,
                }
            }
            _ => writeln!(out, "nothing moved: give an id or --from with --title")?,
        },
        Command::DeleteEmployee { name, yes } => {
            let ticket = board.prepare_assignee_deletion(name)?;
            if !yes {
                writeln!(
                    out,
                    "this would delete {} task(s) of {name}; re-run with --yes to confirm",
                    ticket.rows
                )?;
                return Err(BoardError::NotConfirmed(name.clone()).into());
            }
            let removed = board.confirm_deletion(&ticket)?;
            writeln!(out, "deleted {removed} task(s) of {name}")?;
        }
        Command::Stats => {
            let stats = board.stats(today())?;
            writeln!(out, "total: {}", stats.total)?;
            writeln!(out, "active: {}", stats.active)?;
            writeln!(out, "archived: {}", stats.archived)?;
            writeln!(out, "high priority: {}", stats.high_priority)?;
            writeln!(out, "overdue: {}", stats.overdue)?;
            for status in TaskStatus::ALL {
                writeln!(out, "{status}: {}", stats.status_count(status))?;
            }
            for priority in Priority::ALL {
                writeln!(out, "{priority}: {}", stats.priority_count(priority))?;
            }
            for (assignee, load) in &stats.load_by_assignee {
                writeln!(out, "{assignee}: {load} active")?;
            }
        }
        Command::Export { out: dir } => {
            let snapshot = board.snapshot()?;
            let path = write_export(dir, &snapshot.tasks, today())?;
            writeln!(
                out,
                "exported {} task(s) to {}",
                snapshot.tasks.len(),
                path.display()
            )?;
        }
        Command::Chat(chat) => execute_chat(chat, config, out)?,
    }
    Ok(())
}

fn open_chat(config: &AppConfig) -> ChatRoom<Box<dyn ChatStore>> {
    let store: Box<dyn ChatStore> = match config.chat_persistence {
        ChatPersistence::Durable => Box::new(JsonChatStore::new(&config.chat_path)),
        ChatPersistence::Ephemeral => Box::new(InMemoryChatStore::new()),
    };
    ChatRoom::new(store).with_time_format(config.timestamp_format.as_str())
}

fn execute_chat(
    command: &ChatCommand,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let room = open_chat(config);
    if !room.is_durable() {
        tracing::warn!("chat persistence is ephemeral, messages are not saved");
    }

    match command {
        ChatCommand::Send { user, text } => match room.send(user, text)? {
            Some(message) => writeln!(out, "sent {}", message.id)?,
            None => writeln!(out, "nothing sent: name and text are required")?,
        },
        ChatCommand::React { id, emoji } => {
            let reaction: Reaction = emoji.parse().map_err(ChatError::from)?;
            let count = room.react(id, reaction)?;
            writeln!(out, "{reaction} {count}")?;
        }
        ChatCommand::Edit { id, user, text } => {
            room.edit(id, user, text)?;
            writeln!(out, "edited {id}")?;
        }
        ChatCommand::Delete { id, user } => {
            room.delete(id, user)?;
            writeln!(out, "deleted {id}")?;
        }
        ChatCommand::List { limit } => {
            let messages = room.latest_first()?;
            let shown = limit.unwrap_or(messages.len());
            for (position, message) in messages.iter().take(shown).enumerate() {
                write_message(out, position, message)?;
            }
        }
    }
    Ok(())
}

fn write_task(out: &mut dyn Write, task: &Task) -> std::io::Result<()> {
    writeln!(
        out,
        "{}  {}  {}  {}  {}  {}",
        task.id,
        task.title,
        task.assignee,
        task.status,
        task.priority,
        task.deadline.format(DISPLAY_DATE_FORMAT)
    )
}

fn write_view_row(out: &mut dyn Write, row: &ViewRow) -> std::io::Result<()> {
    let id = row.id.as_ref().map(ToString::to_string).unwrap_or_default();
    writeln!(
        out,
        "{id}  {}  {}  {}  {}",
        row.title,
        row.status,
        row.priority,
        row.deadline.format(DISPLAY_DATE_FORMAT)
    )
}

fn write_message(
    out: &mut dyn Write,
    position: usize,
    message: &ChatMessage,
) -> std::io::Result<()> {
    let reactions: Vec<String> = message
        .reactions
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(reaction, count)| format!("{reaction}{count}"))
        .collect();
    writeln!(
        out,
        "[{position}] {} {} {}: {} {}",
        message.id,
        message.time,
        message.user,
        message.text,
        reactions.join(" ")
    )
}
