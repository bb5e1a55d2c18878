//! `reqwest` client for the GitHub issues and users endpoints.

use async_trait::async_trait;
use reporting::{CommentId, IssueComment, IssueRef, IssueTracker, TrackerError, User};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::wire::{self, CommentRequest, IssueStateRequest, OctoComment, OctoUser};

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size requested when listing comments (the API maximum).
pub const COMMENTS_PER_PAGE: usize = 100;

/// Most pages fetched when listing comments on one issue.
pub const MAX_COMMENT_PAGES: u32 = 50;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("publish-reporter/", env!("CARGO_PKG_VERSION"));

/// Errors raised while constructing a [`GitHubClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The access token was empty or whitespace only.
    #[error("access token must not be empty")]
    EmptyToken,

    /// The API URL was empty or whitespace only.
    #[error("API URL must not be empty")]
    EmptyApiUrl,

    /// The HTTP client could not be initialised (e.g. TLS backend failure).
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Which status codes an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Exactly `200 OK`. Used for reads.
    Ok,
    /// Any `2xx`. Used for writes, which answer `201` or `204`.
    Success,
}

impl Expect {
    fn accepts(self, status: StatusCode) -> bool {
        match self {
            Expect::Ok => status == StatusCode::OK,
            Expect::Success => status.is_success(),
        }
    }
}

/// GitHub REST client authenticated with a personal access or app token.
///
/// Implements [`IssueTracker`]. Every request is sent once; failures are
/// returned to the caller without retrying.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GitHubClient {
    /// Creates a client for `api_url` (e.g. [`DEFAULT_API_URL`] or a GitHub
    /// Enterprise `https://host/api/v3`).
    ///
    /// # Errors
    ///
    /// Returns an error if the token or URL is blank, or the HTTP client
    /// cannot be built.
    pub fn new(access_token: impl Into<String>, api_url: &str) -> Result<Self, ClientError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(ClientError::EmptyToken);
        }
        let base_url = normalize_base_url(api_url)?;
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url,
            access_token,
        })
    }

    fn issue_url(&self, issue: &IssueRef) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}",
            self.base_url, issue.org, issue.repo, issue.number
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(&self, request: RequestBuilder, expect: Expect) -> Result<Response, TrackerError> {
        let response = request.send().await.map_err(|err| TrackerError::Transport {
            message: err.to_string(),
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "GitHub API response");
        if expect.accepts(status) {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TrackerError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        expect: Expect,
    ) -> Result<T, TrackerError> {
        let response = self.send(request, expect).await?;
        let text = response.text().await.map_err(|err| TrackerError::Transport {
            message: err.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|err| TrackerError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn current_user(&self) -> Result<User, TrackerError> {
        let url = format!("{}/user", self.base_url);
        let user: OctoUser = self
            .send_json(self.request(Method::GET, &url), Expect::Ok)
            .await?;
        Ok(wire::map_user(user))
    }

    async fn create_comment(
        &self,
        issue: &IssueRef,
        body: &str,
    ) -> Result<IssueComment, TrackerError> {
        let url = format!("{}/comments", self.issue_url(issue));
        let request = self
            .request(Method::POST, &url)
            .json(&CommentRequest { body });
        let comment: OctoComment = self.send_json(request, Expect::Success).await?;
        Ok(wire::map_comment(comment))
    }

    async fn list_comments(&self, issue: &IssueRef) -> Result<Vec<IssueComment>, TrackerError> {
        let url = format!("{}/comments", self.issue_url(issue));
        let per_page = COMMENTS_PER_PAGE.to_string();
        let mut comments = Vec::new();
        let mut previous_first = None;
        let mut page = 1_u32;
        loop {
            let page_param = page.to_string();
            let request = self
                .request(Method::GET, &url)
                .query(&[("per_page", per_page.as_str()), ("page", page_param.as_str())]);
            let batch: Vec<OctoComment> = self.send_json(request, Expect::Ok).await?;

            // A server that ignores `page` hands back the same page forever.
            let first = batch.first().map(|c| c.id);
            if first.is_some() && first == previous_first {
                warn!(page, "Comment page repeats the previous one, stopping");
                break;
            }
            previous_first = first;

            let fetched = batch.len();
            comments.extend(batch.into_iter().map(wire::map_comment));
            if fetched < COMMENTS_PER_PAGE {
                break;
            }
            if page >= MAX_COMMENT_PAGES {
                warn!(pages = page, "Stopped listing comments at the page limit");
                break;
            }
            page += 1;
        }
        debug!(count = comments.len(), pages = page, "Listed issue comments");
        Ok(comments)
    }

    async fn delete_comment(
        &self,
        issue: &IssueRef,
        comment: CommentId,
    ) -> Result<(), TrackerError> {
        let url = format!(
            "{}/repos/{}/{}/issues/comments/{}",
            self.base_url, issue.org, issue.repo, comment
        );
        self.send(self.request(Method::DELETE, &url), Expect::Success)
            .await?;
        Ok(())
    }

    async fn close_issue(&self, issue: &IssueRef) -> Result<(), TrackerError> {
        let request = self
            .request(Method::PATCH, &self.issue_url(issue))
            .json(&IssueStateRequest { state: "closed" });
        self.send(request, Expect::Success).await?;
        Ok(())
    }
}

/// Normalizes a GitHub API URL by trimming whitespace and trailing slashes.
///
/// # Errors
///
/// Returns an error if the URL is empty or contains only whitespace.
fn normalize_base_url(api_url: &str) -> Result<String, ClientError> {
    let trimmed = api_url.trim();
    if trimmed.is_empty() {
        return Err(ClientError::EmptyApiUrl);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use reporting::{IssueNumber, OrgName, RepoName, UserId};
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, Request, ResponseTemplate,
    };

    use super::*;

    fn issue() -> IssueRef {
        IssueRef::new(
            OrgName::new("kubernetes").unwrap(),
            RepoName::new("publishing-bot").unwrap(),
            IssueNumber::new(42),
        )
    }

    fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::new("test-token", &server.uri()).unwrap()
    }

    fn comment_json(id: u64, user_id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "body": format!("comment {id}"),
            "user": { "id": user_id, "login": format!("user-{user_id}") },
            "created_at": "2024-05-01T10:00:00Z",
        })
    }

    // --- normalize_base_url tests ---

    #[test]
    fn test_normalize_base_url_trims_trailing_slash() {
        let result = normalize_base_url("https://api.github.com/").unwrap();
        assert_eq!(result, "https://api.github.com");
    }

    #[test]
    fn test_normalize_base_url_trims_whitespace() {
        let result = normalize_base_url("  https://ghe.example.com/api/v3  ").unwrap();
        assert_eq!(result, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_normalize_base_url_empty_returns_error() {
        assert!(matches!(
            normalize_base_url("   "),
            Err(ClientError::EmptyApiUrl)
        ));
    }

    #[test]
    fn test_new_rejects_blank_token() {
        let result = GitHubClient::new("  ", DEFAULT_API_URL);
        assert!(matches!(result, Err(ClientError::EmptyToken)));
    }

    #[test]
    fn test_debug_does_not_print_token() {
        let client = GitHubClient::new("ghp_secret", "https://api.github.com/").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains(r#"base_url: "https://api.github.com""#));
    }

    // --- current_user ---

    #[tokio::test]
    async fn test_current_user_sends_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("accept", "application/vnd.github+json"))
            .and(header("x-github-api-version", "2022-11-28"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": 77, "login": "publisher-bot" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let user = client_for(&server).current_user().await.unwrap();

        assert_eq!(user.id, UserId::new(77));
        assert_eq!(user.login, "publisher-bot");
    }

    #[tokio::test]
    async fn test_current_user_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = client_for(&server).current_user().await.unwrap_err();

        assert_eq!(
            err,
            TrackerError::UnexpectedStatus {
                status: 401,
                body: "Bad credentials".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_current_user_requires_exactly_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(
                ResponseTemplate::new(203)
                    .set_body_json(serde_json::json!({ "id": 1, "login": "x" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).current_user().await.unwrap_err();

        assert_eq!(err.status(), Some(203));
    }

    #[tokio::test]
    async fn test_current_user_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).current_user().await.unwrap_err();

        assert!(matches!(err, TrackerError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        // Nothing listens on port 1.
        let client = GitHubClient::new("test-token", "http://127.0.0.1:1").unwrap();

        let err = client.current_user().await.unwrap_err();

        assert!(matches!(err, TrackerError::Transport { .. }));
    }

    // --- create_comment ---

    #[tokio::test]
    async fn test_create_comment_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42/comments"))
            .and(body_json(serde_json::json!({ "body": "hello\n```\nlog\n```" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(comment_json(500, 77)))
            .expect(1)
            .mount(&server)
            .await;

        let comment = client_for(&server)
            .create_comment(&issue(), "hello\n```\nlog\n```")
            .await
            .unwrap();

        assert_eq!(comment.id, CommentId::new(500));
        assert!(comment.is_authored_by(UserId::new(77)));
    }

    #[tokio::test]
    async fn test_create_comment_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42/comments"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_comment(&issue(), "body")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP code 403");
    }

    // --- list_comments ---

    #[tokio::test]
    async fn test_list_comments_single_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42/comments"))
            .and(query_param("per_page", "100"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([comment_json(1, 77), comment_json(2, 5)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let comments = client_for(&server).list_comments(&issue()).await.unwrap();

        let ids: Vec<u64> = comments.iter().map(|c| c.id.as_u64()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_list_comments_follows_full_pages() {
        let server = MockServer::start().await;
        let first_page: Vec<_> = (1..=100).map(|id| comment_json(id, 77)).collect();
        Mock::given(method("GET"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42/comments"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(first_page))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42/comments"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![comment_json(101, 77)]))
            .expect(1)
            .mount(&server)
            .await;

        let comments = client_for(&server).list_comments(&issue()).await.unwrap();

        assert_eq!(comments.len(), 101);
        assert_eq!(comments.last().unwrap().id, CommentId::new(101));
    }

    #[tokio::test]
    async fn test_list_comments_stops_when_page_is_ignored() {
        let server = MockServer::start().await;
        let same_page: Vec<_> = (1..=100).map(|id| comment_json(id, 77)).collect();
        Mock::given(method("GET"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(same_page))
            .expect(2)
            .mount(&server)
            .await;

        let comments = client_for(&server).list_comments(&issue()).await.unwrap();

        assert_eq!(comments.len(), 100);
    }

    #[tokio::test]
    async fn test_list_comments_stops_at_page_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42/comments"))
            .respond_with(|request: &Request| {
                let page: u64 = request
                    .url
                    .query_pairs()
                    .find(|(key, _)| key == "page")
                    .and_then(|(_, value)| value.parse().ok())
                    .unwrap();
                let start = (page - 1) * 100 + 1;
                let batch: Vec<_> = (start..start + 100).map(|id| comment_json(id, 77)).collect();
                ResponseTemplate::new(200).set_body_json(batch)
            })
            .expect(u64::from(MAX_COMMENT_PAGES))
            .mount(&server)
            .await;

        let comments = client_for(&server).list_comments(&issue()).await.unwrap();

        assert_eq!(comments.len(), MAX_COMMENT_PAGES as usize * COMMENTS_PER_PAGE);
    }

    #[tokio::test]
    async fn test_list_comments_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42/comments"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server).list_comments(&issue()).await.unwrap_err();

        assert_eq!(err.status(), Some(502));
    }

    // --- delete_comment ---

    #[tokio::test]
    async fn test_delete_comment() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/repos/kubernetes/publishing-bot/issues/comments/9"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .delete_comment(&issue(), CommentId::new(9))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_comment_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/repos/kubernetes/publishing-bot/issues/comments/9"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_comment(&issue(), CommentId::new(9))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
    }

    // --- close_issue ---

    #[tokio::test]
    async fn test_close_issue_patches_state() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42"))
            .and(body_json(serde_json::json!({ "state": "closed" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "number": 42, "state": "closed" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).close_issue(&issue()).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_issue_rejects_non_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/kubernetes/publishing-bot/issues/42"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let err = client_for(&server).close_issue(&issue()).await.unwrap_err();

        assert_eq!(err.status(), Some(410));
    }
}
