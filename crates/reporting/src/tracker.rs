//! The issue tracker port.
//!
//! [`IssueTracker`] is the only seam between the reporter and GitHub. The
//! `github` crate implements it over the REST API; tests implement it in memory.
//! Authentication is an implementation detail of the tracker: the reporter
//! never sends credentials itself.

use async_trait::async_trait;
use thiserror::Error;

use crate::{CommentId, IssueComment, IssueRef, User};

/// Failure of a single tracker call.
///
/// Messages are phrased to read well after the operation context added by
/// [`crate::ReportError`], e.g. `failed to close issue #3: HTTP code 404`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("request failed: {message}")]
    Transport {
        /// Description from the transport layer.
        message: String,
    },

    /// The server answered with a status code the operation does not accept.
    #[error("HTTP code {status}")]
    UnexpectedStatus {
        /// The HTTP status code returned.
        status: u16,
        /// Response body, kept for diagnostics. May be empty.
        body: String,
    },

    /// The server answered successfully but the body could not be decoded.
    #[error("invalid response body: {message}")]
    InvalidResponse {
        /// Decoder error description.
        message: String,
    },
}

impl TrackerError {
    /// Returns the HTTP status code, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Issue and comment operations the reporter needs.
///
/// Calls are issued strictly one after another; implementations do not need to
/// be safe for concurrent use by the reporter, but must be `Send + Sync` so the
/// binary can hold them across `.await` points.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Returns the account the tracker is authenticated as.
    async fn current_user(&self) -> Result<User, TrackerError>;

    /// Posts a new comment on `issue` and returns it as stored by the tracker.
    async fn create_comment(
        &self,
        issue: &IssueRef,
        body: &str,
    ) -> Result<IssueComment, TrackerError>;

    /// Returns the comments on `issue`, oldest first.
    async fn list_comments(&self, issue: &IssueRef) -> Result<Vec<IssueComment>, TrackerError>;

    /// Deletes one comment on `issue`.
    async fn delete_comment(&self, issue: &IssueRef, comment: CommentId)
        -> Result<(), TrackerError>;

    /// Sets the state of `issue` to closed.
    async fn close_issue(&self, issue: &IssueRef) -> Result<(), TrackerError>;
}
