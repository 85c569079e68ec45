//! Read side of the hosting-platform collaborator.
//!
//! Implementations are backend-specific (the GitHub REST client lives in
//! `evidence-gate-github`); an in-memory fake is in [`crate::fakes`].

use async_trait::async_trait;

use crate::domain::{CheckRun, ExistingComment, GateResult, PullRequestSnapshot};

#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Snapshot of the pull request, including its approval count.
    async fn fetch_pull_request(&self, pr_number: u64) -> GateResult<PullRequestSnapshot>;

    /// Check runs attached to `head_sha`.
    async fn fetch_check_runs(&self, head_sha: &str) -> GateResult<Vec<CheckRun>>;

    /// Issue comments on the pull request, oldest first.
    async fn fetch_comments(&self, pr_number: u64) -> GateResult<Vec<ExistingComment>>;
}
