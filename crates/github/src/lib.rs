//! Publish-reporter GitHub infrastructure adapter.
//!
//! Implements the [`reporting::IssueTracker`] trait against the GitHub REST
//! API (`/user`, `/repos/{owner}/{repo}/issues/...`) using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! Authentication headers, pagination, status-code checks, and JSON decoding
//! are handled here; the [`reporting`] crate never sees them.
//!
//! ## Status codes
//!
//! Reads (`GET /user`, comment listing) accept only `200 OK`. Writes (create,
//! delete, close) accept any `2xx`. Anything else becomes
//! [`reporting::TrackerError::UnexpectedStatus`] carrying the response body.

mod client;
mod wire;

pub use client::{ClientError, GitHubClient, COMMENTS_PER_PAGE, DEFAULT_API_URL, MAX_COMMENT_PAGES};
