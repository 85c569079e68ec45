//! Pull request inputs: the snapshot, its check runs, comments and reviews.
//!
//! These are fixed-shape records. Collaborators normalise whatever the
//! hosting platform returns into these types at the boundary, so the rule
//! engine only ever sees plain strings and enums.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only view of a pull request for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestSnapshot {
    /// Pull request number, unique within the repository.
    pub number: u64,
    pub title: String,
    /// Description. `None` is treated as an empty string.
    #[serde(default)]
    pub body: Option<String>,
    /// Label names. Matching is exact and case-sensitive.
    #[serde(default)]
    pub labels: BTreeSet<String>,
    /// Head commit, used to look up check runs.
    pub head_sha: String,
    /// Carried for forward compatibility; no rule reads it.
    #[serde(default)]
    pub draft: bool,
    /// Distinct reviewers whose latest decisive review is an approval.
    #[serde(default)]
    pub approval_count: u32,
}

impl PullRequestSnapshot {
    pub fn new(number: u64, title: impl Into<String>, head_sha: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            body: None,
            labels: BTreeSet::new(),
            head_sha: head_sha.into(),
            draft: false,
            approval_count: 0,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_approvals(mut self, approval_count: u32) -> Self {
        self.approval_count = approval_count;
        self
    }

    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }

    /// The description, or `""` when absent.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

/// Terminal state of a check run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Stale,
    #[serde(other)]
    Unknown,
}

impl CheckConclusion {
    /// Only an explicit failing terminal state counts against the tests rule.
    pub fn is_failing(self) -> bool {
        matches!(self, CheckConclusion::Failure | CheckConclusion::Cancelled)
    }
}

/// A CI result attached to the head commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckRun {
    pub name: String,
    /// `None` while the run is still queued or in progress.
    #[serde(default)]
    pub conclusion: Option<CheckConclusion>,
}

impl CheckRun {
    pub fn new(name: impl Into<String>, conclusion: Option<CheckConclusion>) -> Self {
        Self {
            name: name.into(),
            conclusion,
        }
    }

    pub fn is_test(&self) -> bool {
        self.name.to_lowercase().contains("test")
    }

    pub fn is_failing(&self) -> bool {
        self.conclusion.is_some_and(CheckConclusion::is_failing)
    }
}

/// An issue comment already present on the pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExistingComment {
    pub id: u64,
    /// Whether the author is the automation identity the gate posts as.
    pub author_is_automation: bool,
    pub body: String,
}

impl ExistingComment {
    pub fn new(id: u64, author_is_automation: bool, body: impl Into<String>) -> Self {
        Self {
            id,
            author_is_automation,
            body: body.into(),
        }
    }
}

/// State of a single submitted review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

impl ReviewState {
    /// Decisive states replace a reviewer's earlier standing; comments do not.
    pub fn is_decisive(self) -> bool {
        matches!(
            self,
            ReviewState::Approved | ReviewState::ChangesRequested | ReviewState::Dismissed
        )
    }
}

/// One review event on a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub reviewer: String,
    pub state: ReviewState,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn new(
        reviewer: impl Into<String>,
        state: ReviewState,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            reviewer: reviewer.into(),
            state,
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_body_reads_as_empty() {
        let pr = PullRequestSnapshot::new(7, "title", "abc");
        assert_eq!(pr.body_text(), "");
    }

    #[test]
    fn label_match_is_case_sensitive() {
        let pr = PullRequestSnapshot::new(7, "title", "abc").with_labels(["Reviewed"]);
        assert!(pr.has_label("Reviewed"));
        assert!(!pr.has_label("reviewed"));
    }

    #[test]
    fn test_run_detection_ignores_case() {
        assert!(CheckRun::new("Unit-TESTS", None).is_test());
        assert!(CheckRun::new("integration_test", None).is_test());
        assert!(!CheckRun::new("lint", None).is_test());
    }

    #[test]
    fn pending_run_is_not_failing() {
        assert!(!CheckRun::new("test", None).is_failing());
        assert!(CheckRun::new("test", Some(CheckConclusion::Cancelled)).is_failing());
        assert!(!CheckRun::new("test", Some(CheckConclusion::TimedOut)).is_failing());
    }

    #[test]
    fn unknown_conclusion_deserializes() {
        let run: CheckRun =
            serde_json::from_str(r#"{"name":"test","conclusion":"something_new"}"#).unwrap();
        assert_eq!(run.conclusion, Some(CheckConclusion::Unknown));
    }

    #[test]
    fn snapshot_deserializes_with_defaults() {
        let pr: PullRequestSnapshot =
            serde_json::from_str(r#"{"number":1,"title":"t","head_sha":"abc"}"#).unwrap();
        assert!(pr.labels.is_empty());
        assert_eq!(pr.body, None);
        assert!(!pr.draft);
        assert_eq!(pr.approval_count, 0);
    }
}
