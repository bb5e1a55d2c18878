//! GitHub REST payloads and their conversion into domain types.

use reporting::{CommentId, IssueComment, Timestamp, User, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct OctoUser {
    pub id: u64,
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OctoComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<OctoUser>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentRequest<'a> {
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct IssueStateRequest {
    pub state: &'static str,
}

pub(crate) fn map_user(user: OctoUser) -> User {
    User {
        id: UserId::new(user.id),
        login: user.login,
    }
}

pub(crate) fn map_comment(comment: OctoComment) -> IssueComment {
    IssueComment {
        id: CommentId::new(comment.id),
        author: comment.user.map(map_user),
        body: comment.body.unwrap_or_default(),
        created_at: comment
            .created_at
            .as_deref()
            .and_then(Timestamp::parse_rfc3339),
    }
}
