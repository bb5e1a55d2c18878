//! Command-line arguments and configuration file handling.
//!
//! Settings come from three places, highest precedence first: command-line
//! flags, environment variables (for the token and API URL only), and an
//! optional TOML file passed with `--config`:
//!
//! ```toml
//! org = "kubernetes"
//! repo = "publishing-bot"
//! api_url = "https://api.github.com"
//! max_lines = 50
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use reporting::{IdentifierError, IssueNumber, IssueRef, OrgName, RepoName, DEFAULT_MAX_LINES};
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Report publishing-bot failures on a GitHub issue.
#[derive(Debug, Parser)]
#[command(name = "publish-reporter", version, about)]
pub struct Cli {
    /// GitHub access token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Repository owner. Overrides `org` in the configuration file.
    #[arg(long)]
    pub org: Option<String>,

    /// Repository name. Overrides `repo` in the configuration file.
    #[arg(long)]
    pub repo: Option<String>,

    /// Number of the tracking issue.
    #[arg(long)]
    pub issue: u64,

    /// GitHub API root, e.g. `https://ghe.example.com/api/v3`.
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format for diagnostic logs (written to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Diagnostic log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Post a failure comment with the run's log and delete older bot comments.
    Report(ReportArgs),
    /// Close the tracking issue.
    Close,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// The error the publishing run ended with.
    #[arg(long)]
    pub error: String,

    /// File holding the run's log; `-` or omitted reads standard input.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Number of `+`-prefixed steps kept from the end of the log.
    #[arg(long)]
    pub max_lines: Option<usize>,
}

impl ReportArgs {
    /// Returns the log file path, or `None` when the log comes from stdin.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file
            .as_deref()
            .filter(|path| path.as_os_str() != "-")
    }
}

// ---------------------------------------------------------------------------
// Configuration file
// ---------------------------------------------------------------------------

/// Errors raised while building [`Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has unknown keys.
    #[error("failed to parse configuration file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A required setting was given neither as a flag nor in the file.
    #[error("missing required setting `{0}` (pass --{0} or set it in the configuration file)")]
    Missing(&'static str),

    /// A setting was present but invalid.
    #[error(transparent)]
    Invalid(#[from] IdentifierError),
}

/// Contents of the optional TOML configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub org: Option<String>,
    pub repo: Option<String>,
    pub api_url: Option<String>,
    pub max_lines: Option<usize>,
}

impl FileConfig {
    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

/// Everything the binary needs after flags, environment, and file are merged.
#[derive(Clone)]
pub struct Settings {
    pub token: String,
    pub issue: IssueRef,
    pub api_url: String,
    pub max_lines: usize,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("issue", &self.issue)
            .field("api_url", &self.api_url)
            .field("max_lines", &self.max_lines)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Merges `cli` with the configuration file it names, if any.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merges `cli` over `file`.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let org = cli.org.clone().or(file.org).ok_or(ConfigError::Missing("org"))?;
        let repo = cli
            .repo
            .clone()
            .or(file.repo)
            .ok_or(ConfigError::Missing("repo"))?;
        let api_url = cli
            .api_url
            .clone()
            .or(file.api_url)
            .unwrap_or_else(|| github::DEFAULT_API_URL.to_string());
        let max_lines = match &cli.command {
            Command::Report(args) => args.max_lines,
            Command::Close => None,
        }
        .or(file.max_lines)
        .unwrap_or(DEFAULT_MAX_LINES);

        Ok(Self {
            token: cli.token.clone(),
            issue: IssueRef::new(
                OrgName::new(org)?,
                RepoName::new(repo)?,
                IssueNumber::new(cli.issue),
            ),
            api_url,
            max_lines,
        })
    }
}
