//! Newtype domain identifiers.
//!
//! Every GitHub concept the reporter touches is represented as a distinct
//! newtype wrapping a primitive. This prevents accidentally interchanging, for
//! example, a [`CommentId`] with a [`UserId`] even though both are `u64` under
//! the hood.

use serde::{Deserialize, Serialize};

use crate::errors::IdentifierError;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() rejecting blank or non-path-safe values, as_str(),
// Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident, $label:literal
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, trimming surrounding whitespace.
            ///
            /// Returns [`IdentifierError::Empty`] if nothing is left after
            /// trimming, and [`IdentifierError::Invalid`] if the value could
            /// not be used as a single URL path segment.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
                let v = value.into();
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    return Err(IdentifierError::Empty { kind: $label });
                }
                if !is_path_safe(trimmed) {
                    return Err(IdentifierError::Invalid {
                        kind: $label,
                        value: trimmed.to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Owner and repository names end up as URL path segments.
fn is_path_safe(value: &str) -> bool {
    value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (GitHub-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// The number of a GitHub issue within its repository.
    IssueNumber
}

u64_id! {
    /// Identifies an issue comment.
    ///
    /// Comment ids are unique across the whole repository, not just the issue,
    /// which is why deletion addresses comments without the issue number.
    CommentId
}

u64_id! {
    /// Identifies a GitHub account (user or bot).
    UserId
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// The owning organisation (or user) of a repository, e.g. `"kubernetes"`.
    OrgName, "organization"
}

string_id! {
    /// A repository name without its owner, e.g. `"sig-release"`.
    RepoName, "repository"
}

// ---------------------------------------------------------------------------
// Composite reference
// ---------------------------------------------------------------------------

/// Fully qualified reference to one issue: owner, repository, and number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueRef {
    /// Repository owner.
    pub org: OrgName,
    /// Repository name.
    pub repo: RepoName,
    /// Issue number within the repository.
    pub number: IssueNumber,
}

impl IssueRef {
    /// Creates a new [`IssueRef`].
    pub fn new(org: OrgName, repo: RepoName, number: IssueNumber) -> Self {
        Self { org, repo, number }
    }
}

impl std::fmt::Display for IssueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.org, self.repo, self.number)
    }
}
