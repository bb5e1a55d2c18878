//! Reporting a failed publishing run on its tracking issue.
//!
//! The publishing bot keeps one issue per repository set open while runs fail.
//! [`report_on_issue`] posts the latest failure there and removes the bot's
//! earlier failure comments so the issue only ever shows the most recent one.
//! The `/reopen` line in the comment makes Prow reopen the issue if someone
//! closed it. [`close_issue`] is used once a run succeeds again.
//!
//! Calls are issued one at a time in a fixed order and the first failure is
//! returned. The cleanup loop is not transactional: when a deletion fails,
//! comments deleted before it stay deleted (see
//! [`ReportError::DeleteComment::deleted_before`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    format_log_for_github, redact_secret, CommentId, IssueRef, IssueTracker, ReportError,
    Timestamp,
};

/// Number of traced steps kept in a failure comment unless configured otherwise.
pub const DEFAULT_MAX_LINES: usize = 50;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// One decision taken while cleaning up old comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CleanupAction {
    /// A previous comment by the bot was deleted.
    Deleted {
        /// The deleted comment.
        comment: CommentId,
        /// When the deleted comment had been posted, if the tracker said.
        posted_at: Option<Timestamp>,
    },
    /// A comment by someone else was left alone.
    SkippedForeign {
        /// The comment that was kept.
        comment: CommentId,
        /// Login of its author; `None` for deleted accounts.
        author: Option<String>,
    },
}

/// What [`report_on_issue`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutcome {
    /// The comment that now carries the failure report.
    pub comment: CommentId,
    /// Cleanup decisions, in the order the comments were listed.
    pub actions: Vec<CleanupAction>,
}

impl ReportOutcome {
    /// Returns the ids of the comments that were deleted.
    pub fn deleted(&self) -> impl Iterator<Item = CommentId> + '_ {
        self.actions.iter().filter_map(|action| match action {
            CleanupAction::Deleted { comment, .. } => Some(*comment),
            CleanupAction::SkippedForeign { .. } => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Returns the first lines of a failure comment.
pub fn failure_heading(failure: impl fmt::Display) -> String {
    format!("/reopen\n\nThe last publishing run failed: {failure}")
}

/// Posts `logs` as a failure comment on `issue` and deletes the bot's older
/// comments there.
///
/// `secret` is removed from `failure` and `logs` before anything is sent; pass
/// the token the tracker authenticates with. `max_lines` bounds the number of traced steps
/// shown (see [`format_log_for_github`]).
///
/// # Errors
///
/// Returns the first failing call wrapped in the matching [`ReportError`]
/// variant. No call is retried.
#[instrument(skip_all, fields(issue = %issue))]
pub async fn report_on_issue<T>(
    tracker: &T,
    issue: &IssueRef,
    failure: impl fmt::Display,
    logs: &str,
    secret: &str,
    max_lines: usize,
) -> Result<ReportOutcome, ReportError>
where
    T: IssueTracker + ?Sized,
{
    let logs = redact_secret(logs, secret);
    let heading = failure_heading(redact_secret(&failure.to_string(), secret));

    let myself = tracker
        .current_user()
        .await
        .map_err(|source| ReportError::OwnUser { source })?;

    let body = format_log_for_github(&logs, max_lines, [heading]);
    let created = tracker
        .create_comment(issue, &body)
        .await
        .map_err(|source| ReportError::CreateComment {
            issue: issue.number,
            source,
        })?;
    info!(comment = %created.id, bytes = body.len(), "Posted failure comment");

    let comments = tracker
        .list_comments(issue)
        .await
        .map_err(|source| ReportError::ListComments {
            issue: issue.number,
            source,
        })?;

    let mut actions = Vec::new();
    let mut deleted = Vec::new();
    for comment in comments {
        if !comment.is_authored_by(myself.id) {
            let author = comment.author.map(|a| a.login);
            info!(comment = %comment.id, author = ?author, "Skipping comment not by me");
            actions.push(CleanupAction::SkippedForeign {
                comment: comment.id,
                author,
            });
            continue;
        }
        if comment.id == created.id {
            continue;
        }

        let posted_at = comment.created_at;
        info!(
            comment = %comment.id,
            posted_at = ?posted_at.map(|ts| ts.to_string()),
            "Deleting comment"
        );
        tracker
            .delete_comment(issue, comment.id)
            .await
            .map_err(|source| ReportError::DeleteComment {
                comment: comment.id,
                issue: issue.number,
                deleted_before: deleted.clone(),
                source,
            })?;
        deleted.push(comment.id);
        actions.push(CleanupAction::Deleted {
            comment: comment.id,
            posted_at,
        });
    }

    Ok(ReportOutcome {
        comment: created.id,
        actions,
    })
}

/// Closes `issue`.
///
/// # Errors
///
/// Returns [`ReportError::CloseIssue`] if the tracker call fails.
#[instrument(skip_all, fields(issue = %issue))]
pub async fn close_issue<T>(tracker: &T, issue: &IssueRef) -> Result<(), ReportError>
where
    T: IssueTracker + ?Sized,
{
    tracker
        .close_issue(issue)
        .await
        .map_err(|source| ReportError::CloseIssue {
            issue: issue.number,
            source,
        })?;
    info!("Closed issue");
    Ok(())
}
