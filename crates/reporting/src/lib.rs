//! Core domain for the publish reporter.
//!
//! This crate turns a failed publishing run into a GitHub issue comment: it
//! formats the run's log, strips the access token from it, posts it, and cleans
//! up the bot's previous failure comments. It can also close the tracking issue
//! once runs succeed again.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It talks to GitHub only through the [`IssueTracker`] trait; the `github`
//! crate supplies the HTTP implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`OrgName`, `IssueNumber`, `CommentId`, etc.) |
//! | [`types`] | Value types returned by the tracker (`User`, `IssueComment`, `Timestamp`) |
//! | [`errors`] | Operation-level error types |
//! | [`tracker`] | The [`IssueTracker`] port and its [`TrackerError`] |
//! | [`log_format`] | Log truncation and Markdown rendering |
//! | [`redact`] | Secret redaction |
//! | [`reporter`] | [`report_on_issue`] and [`close_issue`] |

pub mod errors;
pub mod identifiers;
pub mod log_format;
pub mod redact;
pub mod reporter;
pub mod tracker;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{IdentifierError, ReportError};
pub use identifiers::{CommentId, IssueNumber, IssueRef, OrgName, RepoName, UserId};
pub use log_format::{format_log_for_github, LogBuilder, MAX_COMMENT_BYTES, STEP_MARKER};
pub use redact::{redact_secret, REDACTION_PLACEHOLDER};
pub use reporter::{
    close_issue, failure_heading, report_on_issue, CleanupAction, ReportOutcome,
    DEFAULT_MAX_LINES,
};
pub use tracker::{IssueTracker, TrackerError};
pub use types::{IssueComment, Timestamp, User};
