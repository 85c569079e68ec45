//! GitHub REST client
//!
//! Implements the gate's collaborator traits over the GitHub REST API:
//! pull request + reviews, check runs for a commit, and issue comments.
//! Listings request a single page of up to 100 items.

use std::time::Duration;

use async_trait::async_trait;
use evidence_gate_core::{
    count_approvals, CheckRun, CommentId, CommentSink, ExistingComment, GateResult,
    PullRequestSnapshot, PullRequestSource,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::GitHubError;
use crate::models::{
    ApiCheckRunList, ApiComment, ApiPullRequest, ApiReview, AutomationIdentity, CommentRequest,
};
use crate::Result;

const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: u32 = 100;

/// GitHub connection settings
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// REST API base URL (GitHub Enterprise uses `https://host/api/v3`)
    pub api_url: String,
    /// Token sent as a bearer credential (optional for public reads)
    pub token: Option<String>,
    pub owner: String,
    pub repo: String,
    /// Author identity treated as the gate's own
    pub automation: AutomationIdentity,
    pub timeout: Duration,
}

impl GitHubConfig {
    /// Config for `owner/repo` on github.com
    pub fn new(owner: &str, repo: &str) -> Self {
        GitHubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            owner: owner.to_string(),
            repo: repo.to_string(),
            automation: AutomationIdentity::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build from `GITHUB_REPOSITORY`, `GITHUB_TOKEN` and `GITHUB_API_URL`
    pub fn from_env() -> Result<Self> {
        let repository = std::env::var("GITHUB_REPOSITORY")
            .map_err(|_| GitHubError::Config("GITHUB_REPOSITORY is not set".to_string()))?;
        let (owner, repo) = parse_repository(&repository)?;

        let mut config = GitHubConfig::new(owner, repo);
        if let Ok(url) = std::env::var("GITHUB_API_URL") {
            config = config.with_api_url(&url);
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            config = config.with_token(&token);
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the token; blank tokens are ignored
    pub fn with_token(mut self, token: &str) -> Self {
        let token = token.trim();
        self.token = (!token.is_empty()).then(|| token.to_string());
        self
    }

    pub fn with_automation(mut self, automation: AutomationIdentity) -> Self {
        self.automation = automation;
        self
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, self.owner, self.repo, path)
    }
}

/// Split `owner/name` into its parts
pub fn parse_repository(repository: &str) -> Result<(&str, &str)> {
    match repository.trim().split_once('/') {
        Some((owner, repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner, repo))
        }
        _ => Err(GitHubError::Config(format!(
            "repository must be 'owner/name', got {repository:?}"
        ))),
    }
}

/// GitHub client for the gate's reads and comment writes
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new client
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| GitHubError::Config("token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("evidence-gate/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GitHubConfig::from_env()?)
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    pub async fn get_pull_request(&self, pr_number: u64) -> Result<ApiPullRequest> {
        self.get_json(&format!("pulls/{pr_number}")).await
    }

    pub async fn list_reviews(&self, pr_number: u64) -> Result<Vec<ApiReview>> {
        self.get_json(&format!("pulls/{pr_number}/reviews?per_page={PAGE_SIZE}"))
            .await
    }

    pub async fn list_check_runs(&self, head_sha: &str) -> Result<ApiCheckRunList> {
        self.get_json(&format!(
            "commits/{head_sha}/check-runs?per_page={PAGE_SIZE}"
        ))
        .await
    }

    pub async fn list_comments(&self, pr_number: u64) -> Result<Vec<ApiComment>> {
        self.get_json(&format!(
            "issues/{pr_number}/comments?per_page={PAGE_SIZE}"
        ))
        .await
    }

    pub async fn create_comment(&self, pr_number: u64, body: &str) -> Result<ApiComment> {
        self.send_json(
            Method::POST,
            &format!("issues/{pr_number}/comments"),
            &CommentRequest { body },
        )
        .await
    }

    pub async fn edit_comment(&self, comment_id: u64, body: &str) -> Result<ApiComment> {
        self.send_json(
            Method::PATCH,
            &format!("issues/comments/{comment_id}"),
            &CommentRequest { body },
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.repo_url(path);
        debug!(%url, "GET");
        let response = self.http_client.get(&url).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.repo_url(path);
        debug!(%url, %method, "send");
        let response = self
            .http_client
            .request(method, &url)
            .json(body)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(GitHubError::Status {
        status: status.as_u16(),
        url,
        message: api_message(&body),
    })
}

/// The `message` field of a GitHub error body, or the raw body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn fetch_pull_request(&self, pr_number: u64) -> GateResult<PullRequestSnapshot> {
        let (pull, reviews) = futures::try_join!(
            self.get_pull_request(pr_number),
            self.list_reviews(pr_number)
        )
        .map_err(|e| e.into_gate_error("fetch pull request"))?;

        let reviews: Vec<_> = reviews
            .into_iter()
            .filter_map(ApiReview::into_review)
            .collect();
        Ok(pull.into_snapshot(count_approvals(&reviews)))
    }

    async fn fetch_check_runs(&self, head_sha: &str) -> GateResult<Vec<CheckRun>> {
        let list = self
            .list_check_runs(head_sha)
            .await
            .map_err(|e| e.into_gate_error("fetch check runs"))?;
        debug!(total = list.total_count, "check runs listed");
        Ok(list.check_runs.into_iter().map(CheckRun::from).collect())
    }

    async fn fetch_comments(&self, pr_number: u64) -> GateResult<Vec<ExistingComment>> {
        let comments = self
            .list_comments(pr_number)
            .await
            .map_err(|e| e.into_gate_error("fetch comments"))?;
        Ok(comments
            .into_iter()
            .map(|c| c.into_existing(&self.config.automation))
            .collect())
    }
}

#[async_trait]
impl CommentSink for GitHubClient {
    async fn post_comment(&self, pr_number: u64, body: &str) -> GateResult<CommentId> {
        let comment = self
            .create_comment(pr_number, body)
            .await
            .map_err(|e| e.into_gate_error("post comment"))?;
        Ok(comment.id)
    }

    async fn update_comment(&self, comment_id: CommentId, body: &str) -> GateResult<()> {
        self.edit_comment(comment_id, body)
            .await
            .map_err(|e| e.into_gate_error("update comment"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_parses() {
        assert_eq!(
            parse_repository("stevedores-org/shop").unwrap(),
            ("stevedores-org", "shop")
        );
    }

    #[test]
    fn malformed_repository_rejected() {
        for bad in ["", "shop", "/shop", "org/", "a/b/c"] {
            assert!(parse_repository(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn repo_urls_are_built_from_config() {
        let config = GitHubConfig::new("o", "r").with_api_url("https://ghe.example/api/v3/");
        assert_eq!(
            config.repo_url("pulls/3"),
            "https://ghe.example/api/v3/repos/o/r/pulls/3"
        );
    }

    #[test]
    fn blank_token_ignored() {
        let config = GitHubConfig::new("o", "r").with_token("  ");
        assert!(config.token.is_none());
        let config = config.with_token("ghp_abc");
        assert_eq!(config.token.as_deref(), Some("ghp_abc"));
    }

    #[test]
    fn client_builds_with_token() {
        let client = GitHubClient::new(GitHubConfig::new("o", "r").with_token("ghp_abc"));
        assert!(client.is_ok());
    }

    #[test]
    fn api_message_prefers_json_message() {
        assert_eq!(
            api_message(r#"{"message":"Bad credentials","documentation_url":"x"}"#),
            "Bad credentials"
        );
        assert_eq!(api_message("gateway timeout"), "gateway timeout");
    }

    #[tokio::test]
    async fn unreachable_api_is_a_collaborator_error() {
        let config = GitHubConfig::new("o", "r")
            .with_api_url("http://127.0.0.1:9")
            .with_token("t");
        let client = GitHubClient::new(config).unwrap();

        let err = client.fetch_check_runs("abc").await.unwrap_err();
        assert!(err.to_string().starts_with("fetch check runs failed"));
    }
}
