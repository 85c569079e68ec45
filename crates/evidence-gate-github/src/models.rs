//! Wire shapes of the GitHub REST responses the gate reads.
//!
//! Only the fields the gate needs are declared; everything else in the
//! payload is ignored. Conversion into core types happens here, so label
//! objects, user objects and review state strings never reach the engine.

use chrono::{DateTime, Utc};
use evidence_gate_core::{
    CheckConclusion, CheckRun, ExistingComment, PullRequestSnapshot, Review, ReviewState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
    /// `User`, `Bot` or `Organization`.
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommitRef {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<ApiLabel>,
    pub head: ApiCommitRef,
    #[serde(default)]
    pub draft: bool,
}

impl ApiPullRequest {
    pub fn into_snapshot(self, approval_count: u32) -> PullRequestSnapshot {
        PullRequestSnapshot {
            number: self.number,
            title: self.title,
            body: self.body,
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            head_sha: self.head.sha,
            draft: self.draft,
            approval_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiReview {
    /// `null` for deleted accounts.
    #[serde(default)]
    pub user: Option<ApiUser>,
    pub state: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ApiReview {
    /// `None` for reviews by deleted users or with an unrecognised state.
    pub fn into_review(self) -> Option<Review> {
        let state = match self.state.as_str() {
            "APPROVED" => ReviewState::Approved,
            "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
            "COMMENTED" => ReviewState::Commented,
            "DISMISSED" => ReviewState::Dismissed,
            "PENDING" => ReviewState::Pending,
            _ => return None,
        };
        let user = self.user?;
        Some(Review::new(user.login, state, self.submitted_at))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCheckRunList {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub check_runs: Vec<ApiCheckRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCheckRun {
    pub name: String,
    #[serde(default)]
    pub conclusion: Option<CheckConclusion>,
}

impl From<ApiCheckRun> for CheckRun {
    fn from(run: ApiCheckRun) -> Self {
        CheckRun::new(run.name, run.conclusion)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<ApiUser>,
}

impl ApiComment {
    pub fn into_existing(self, automation: &AutomationIdentity) -> ExistingComment {
        let author_is_automation = self
            .user
            .as_ref()
            .is_some_and(|user| automation.matches(user));
        ExistingComment::new(self.id, author_is_automation, self.body.unwrap_or_default())
    }
}

/// Request body for creating or editing a comment.
#[derive(Debug, Serialize)]
pub struct CommentRequest<'a> {
    pub body: &'a str,
}

/// Which comment authors count as the gate's own automation identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomationIdentity {
    /// Exactly this login (e.g. `github-actions[bot]`).
    Login(String),
    /// Any account of type `Bot`.
    AnyBot,
}

impl AutomationIdentity {
    pub fn matches(&self, user: &ApiUser) -> bool {
        match self {
            AutomationIdentity::Login(login) => user.login == *login,
            AutomationIdentity::AnyBot => user.kind == "Bot",
        }
    }
}

impl Default for AutomationIdentity {
    fn default() -> Self {
        AutomationIdentity::Login("github-actions[bot]".to_string())
    }
}
