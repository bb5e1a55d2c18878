//! Shared value types for the reporting domain.
//!
//! These are the shapes the [`crate::IssueTracker`] port hands back to the
//! reporter. They carry only the fields the reporter reads; wire formats are
//! the infrastructure crate's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CommentId, UserId};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// A GitHub account as seen by the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable numeric account id. Used for ownership comparisons.
    pub id: UserId,
    /// Login name. Informational only; logins can be renamed.
    pub login: String,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// One comment attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Repository-wide comment id.
    pub id: CommentId,

    /// Author of the comment.
    ///
    /// `None` when the authoring account has since been deleted.
    pub author: Option<User>,

    /// Markdown body.
    pub body: String,

    /// Creation time, when the tracker reports one. Reported back in
    /// [`crate::CleanupAction::Deleted`].
    pub created_at: Option<Timestamp>,
}

impl IssueComment {
    /// Returns `true` if this comment was written by the account `user`.
    ///
    /// Comments whose author is unknown are never considered owned.
    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author.as_ref().is_some_and(|a| a.id == user)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Parses an RFC 3339 timestamp such as `"2017-08-01T12:00:00Z"`.
    ///
    /// Returns `None` if the string is not valid RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
