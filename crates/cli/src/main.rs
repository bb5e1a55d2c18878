//! Publish-reporter CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration**: flags, environment, and the optional
//!    `--config` TOML file are merged into [`config::Settings`].
//! 2. **Wire observability**: install a `tracing-subscriber` with either a
//!    human-readable or a JSON layer. All `tracing` events emitted by every
//!    crate in the workspace flow through it.
//! 3. **Construct infrastructure**: create the [`github::GitHubClient`] and
//!    hand it to the [`reporting`] operations as their `IssueTracker`.
//! 4. **Dispatch**: `report` posts the failure comment and cleans up old
//!    ones; `close` closes the tracking issue.
//!
//! Every step runs sequentially on a current-thread runtime. Any failure ends
//! the process with a non-zero exit status.

mod config;
mod observability;

use anyhow::Context;
use clap::Parser;
use github::GitHubClient;
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::config::{Cli, Command, ReportArgs, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    observability::init(cli.log_format)?;

    let settings = Settings::load(&cli).context("invalid configuration")?;
    let client = GitHubClient::new(settings.token.as_str(), &settings.api_url)
        .context("failed to create GitHub client")?;

    match &cli.command {
        Command::Report(args) => report(&client, &settings, args).await,
        Command::Close => {
            reporting::close_issue(&client, &settings.issue).await?;
            Ok(())
        }
    }
}

async fn report(
    client: &GitHubClient,
    settings: &Settings,
    args: &ReportArgs,
) -> anyhow::Result<()> {
    let logs = read_logs(args).await?;

    let outcome = reporting::report_on_issue(
        client,
        &settings.issue,
        &args.error,
        &logs,
        &settings.token,
        settings.max_lines,
    )
    .await?;

    info!(
        issue = %settings.issue,
        comment = %outcome.comment,
        deleted = outcome.deleted().count(),
        "Reported publishing failure"
    );
    Ok(())
}

/// Reads the run log from `--log-file` or stdin. Invalid UTF-8 sequences are
/// replaced with U+FFFD.
async fn read_logs(args: &ReportArgs) -> anyhow::Result<String> {
    let bytes = match args.log_path() {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read log file {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("failed to read log from stdin")?;
            buf
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
