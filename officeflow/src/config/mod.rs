//! Settings for the `officeflow` binary.
//!
//! A value is taken from the first place that sets it: command-line flag,
//! its `OFFICEFLOW_*` environment variable, `config.toml`, then the built-in
//! default. Some settings (chat persistence, merge mode) only exist in the
//! file.
//!
//! The file is looked up in the platform config directory
//! (`~/.config/officeflow/config.toml` on Linux) and may be absent. A file
//! named with `--config` must exist.

use std::path::{Path, PathBuf};

use crate::board::MergeMode;
use crate::chat::room::DEFAULT_TIME_FORMAT;
use crate::cli::Command;

/// Errors raised while reading `config.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists (or was named explicitly) but could not be read.
    #[error("cannot read {path}: {source}")]
    ReadFile {
        /// File that was being read.
        path: PathBuf,
        /// I/O failure.
        source: std::io::Error,
    },

    /// The file is not valid TOML or has an unknown value.
    #[error("invalid config: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// `config.toml` as written by the user. Every key is optional.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageSection,
    chat: ChatSection,
    board: BoardSection,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageSection {
    tasks_path: Option<PathBuf>,
    chat_path: Option<PathBuf>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ChatSection {
    persistence: Option<ChatPersistence>,
    timestamp_format: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BoardSection {
    merge_mode: Option<MergeMode>,
}

/// Where chat messages live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatPersistence {
    /// Every mutation is written to the chat log file.
    #[default]
    Durable,
    /// Messages live in process memory only.
    Ephemeral,
}

/// Settings after every layer has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Task table file.
    pub tasks_path: PathBuf,
    /// Chat log file.
    pub chat_path: PathBuf,
    /// Chat storage mode.
    pub chat_persistence: ChatPersistence,
    /// `strftime` pattern for new chat messages.
    pub timestamp_format: String,
    /// How rows missing from a committed view are treated.
    pub merge_mode: MergeMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tasks_path: PathBuf::from("tasks.csv"),
            chat_path: PathBuf::from("chat.json"),
            chat_persistence: ChatPersistence::default(),
            timestamp_format: DEFAULT_TIME_FORMAT.to_string(),
            merge_mode: MergeMode::default(),
        }
    }
}

impl AppConfig {
    /// Reads `config.toml` (explicit or default location) and layers the
    /// parsed flags over it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit file is missing, or any file
    /// found cannot be read or parsed.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = match args.config.as_deref() {
            Some(path) => read_config(path)?,
            None => default_config_path()
                .map(|path| read_optional_config(&path))
                .transpose()?
                .flatten()
                .unwrap_or_default(),
        };
        Ok(Self::layer(args, file))
    }

    fn layer(args: &CliArgs, file: ConfigFile) -> Self {
        let base = Self::default();
        Self {
            tasks_path: args
                .tasks
                .clone()
                .or(file.storage.tasks_path)
                .unwrap_or(base.tasks_path),
            chat_path: args
                .chat
                .clone()
                .or(file.storage.chat_path)
                .unwrap_or(base.chat_path),
            chat_persistence: file.chat.persistence.unwrap_or(base.chat_persistence),
            timestamp_format: args
                .timestamp_format
                .clone()
                .or(file.chat.timestamp_format)
                .unwrap_or(base.timestamp_format),
            merge_mode: file.board.merge_mode.unwrap_or(base.merge_mode),
        }
    }
}

/// Command-line flags.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Task board and team chat over flat files")]
pub struct CliArgs {
    /// Read settings from this file instead of the default location.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Task table CSV file.
    #[arg(long, env = "OFFICEFLOW_TASKS")]
    pub tasks: Option<PathBuf>,

    /// Chat log JSON file.
    #[arg(long, env = "OFFICEFLOW_CHAT")]
    pub chat: Option<PathBuf>,

    /// `strftime` pattern for new chat messages.
    #[arg(long)]
    pub timestamp_format: Option<String>,

    /// Tracing filter, e.g. `info` or `officeflow=debug`.
    #[arg(long, default_value = "warn", env = "OFFICEFLOW_LOG")]
    pub log_level: String,

    /// Append logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Option<Command>,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("officeflow").join("config.toml"))
}

fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Like [`read_config`], but a missing file is `None`.
fn read_optional_config(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    match read_config(path) {
        Err(ConfigError::ReadFile { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::debug!(path = %path.display(), "no config file");
            Ok(None)
        }
        other => other.map(Some),
    }
}
