//! Top-level error types for the reporting domain.
//!
//! [`ReportError`] covers the failure of one reporter operation. Each variant
//! names the operation and the identifiers it was working on, and keeps the
//! underlying [`TrackerError`] as its source. Nothing here is retried: the
//! first failure is returned to the caller as-is.
//!
//! Port-level failures ([`TrackerError`]) are defined next to the port in
//! [`crate::tracker`].

use thiserror::Error;

use crate::{CommentId, IssueNumber, TrackerError};

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

/// Returned when a string identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The value was empty or whitespace only.
    #[error("{kind} must not be empty")]
    Empty {
        /// Which identifier was being constructed (e.g. `"repository"`).
        kind: &'static str,
    },

    /// The value holds a character GitHub does not allow in owner or
    /// repository names, or is a `.`/`..` path segment.
    #[error("{kind} `{value}` may only contain ASCII letters, digits, '-', '_' and '.'")]
    Invalid {
        /// Which identifier was being constructed.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Reporter operation errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::report_on_issue`] and [`crate::close_issue`].
///
/// A [`ReportError::DeleteComment`] can be returned after earlier deletions
/// already succeeded; the cleanup is not transactional.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The authenticated account could not be identified.
    #[error("failed to get own user: {source}")]
    OwnUser {
        /// Underlying tracker failure.
        #[source]
        source: TrackerError,
    },

    /// The failure comment could not be posted.
    #[error("failed to comment on issue #{issue}: {source}")]
    CreateComment {
        /// Issue the comment was meant for.
        issue: IssueNumber,
        /// Underlying tracker failure.
        #[source]
        source: TrackerError,
    },

    /// The existing comments could not be listed.
    #[error("failed to get github comments of issue #{issue}: {source}")]
    ListComments {
        /// Issue whose comments were being listed.
        issue: IssueNumber,
        /// Underlying tracker failure.
        #[source]
        source: TrackerError,
    },

    /// A stale comment could not be deleted.
    #[error("failed to delete github comment {comment} of issue #{issue}: {source}")]
    DeleteComment {
        /// The comment that could not be deleted.
        comment: CommentId,
        /// Issue the comment belongs to.
        issue: IssueNumber,
        /// Comments already deleted before this failure.
        deleted_before: Vec<CommentId>,
        /// Underlying tracker failure.
        #[source]
        source: TrackerError,
    },

    /// The issue could not be closed.
    #[error("failed to close issue #{issue}: {source}")]
    CloseIssue {
        /// Issue that should have been closed.
        issue: IssueNumber,
        /// Underlying tracker failure.
        #[source]
        source: TrackerError,
    },
}
