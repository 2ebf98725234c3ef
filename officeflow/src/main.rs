//! `OfficeFlow` — task board and team chat over flat files.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/officeflow/config.toml`).
//!
//! ```bash
//! officeflow add "Quarterly report" --assignee Alice --priority high
//! officeflow board Alice
//! officeflow chat send --user Bob "hi"
//!
//! # Point at another table, log to a file
//! OFFICEFLOW_TASKS=/srv/office/tasks.csv officeflow --log-file office.log stats
//! ```

use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_appender::non_blocking::WorkerGuard;

use officeflow::cli::{self, CommandError};
use officeflow::config::{AppConfig, CliArgs};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let _log_guard = init_logging(&args.log_level, args.log_file.as_deref());

    let Some(command) = args.command.as_ref() else {
        if let Err(e) = CliArgs::command().print_help() {
            tracing::error!(error = %e, "failed to print help");
        }
        return ExitCode::from(2);
    };

    match run(&args, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("officeflow: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs, command: &cli::Command) -> Result<(), CommandError> {
    let config = AppConfig::load(args)?;
    tracing::debug!(?config, "configuration resolved");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::execute(command, &config, &mut out)
}

/// Initialize logging.
///
/// Logs go to stderr unless `file_path` is given, in which case they are
/// appended to that file through a non-blocking writer. Returns a
/// [`WorkerGuard`] for the file writer that must be held until shutdown to
/// ensure all buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let Some((log_dir, file_name)) = file_path.and_then(split_log_path) else {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(env_filter)
            .init();
        return None;
    };

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

fn split_log_path(path: &Path) -> Option<(&Path, &str)> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some((dir, path.file_name()?.to_str()?))
}
