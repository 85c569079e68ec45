//! In-memory fakes for the collaborator traits (testing only)
//!
//! Provides `MemoryPullRequestSource` and `RecordingCommentSink`, which
//! satisfy the trait contracts without any network access. Each can be told
//! to fail a specific call so error paths are testable.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{CheckRun, ExistingComment, GateError, GateResult, PullRequestSnapshot};
use crate::reconcile::{CommentId, CommentSink};
use crate::source::PullRequestSource;

// ---------------------------------------------------------------------------
// MemoryPullRequestSource
// ---------------------------------------------------------------------------

/// Pull requests, check runs and comments held in maps.
#[derive(Debug, Default)]
pub struct MemoryPullRequestSource {
    pulls: HashMap<u64, PullRequestSnapshot>,
    check_runs: HashMap<String, Vec<CheckRun>>,
    comments: HashMap<u64, Vec<ExistingComment>>,
    fail_check_runs: bool,
    fail_comments: bool,
    check_run_fetches: Mutex<usize>,
    comment_fetches: Mutex<usize>,
}

impl MemoryPullRequestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pull_request(mut self, snapshot: PullRequestSnapshot) -> Self {
        self.pulls.insert(snapshot.number, snapshot);
        self
    }

    pub fn with_check_runs(mut self, head_sha: &str, runs: Vec<CheckRun>) -> Self {
        self.check_runs.insert(head_sha.to_string(), runs);
        self
    }

    pub fn with_comments(mut self, pr_number: u64, comments: Vec<ExistingComment>) -> Self {
        self.comments.insert(pr_number, comments);
        self
    }

    /// Make every check-run fetch fail.
    pub fn failing_check_runs(mut self) -> Self {
        self.fail_check_runs = true;
        self
    }

    /// Make every comment fetch fail.
    pub fn failing_comments(mut self) -> Self {
        self.fail_comments = true;
        self
    }

    /// How many times check runs were requested.
    pub fn check_run_fetches(&self) -> usize {
        *self.check_run_fetches.lock().unwrap()
    }

    /// How many times comments were requested.
    pub fn comment_fetches(&self) -> usize {
        *self.comment_fetches.lock().unwrap()
    }
}

#[async_trait]
impl PullRequestSource for MemoryPullRequestSource {
    async fn fetch_pull_request(&self, pr_number: u64) -> GateResult<PullRequestSnapshot> {
        self.pulls.get(&pr_number).cloned().ok_or_else(|| {
            GateError::collaborator(
                "fetch pull request",
                format!("pull request #{pr_number} not found"),
            )
        })
    }

    async fn fetch_check_runs(&self, head_sha: &str) -> GateResult<Vec<CheckRun>> {
        *self.check_run_fetches.lock().unwrap() += 1;
        if self.fail_check_runs {
            return Err(GateError::collaborator(
                "fetch check runs",
                "check runs unavailable",
            ));
        }
        Ok(self.check_runs.get(head_sha).cloned().unwrap_or_default())
    }

    async fn fetch_comments(&self, pr_number: u64) -> GateResult<Vec<ExistingComment>> {
        *self.comment_fetches.lock().unwrap() += 1;
        if self.fail_comments {
            return Err(GateError::collaborator(
                "fetch comments",
                "comments unavailable",
            ));
        }
        Ok(self.comments.get(&pr_number).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// RecordingCommentSink
// ---------------------------------------------------------------------------

/// A call made against [`RecordingCommentSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Post { pr_number: u64, body: String },
    Update { comment_id: CommentId, body: String },
}

/// Records every post/update; optionally fails all of them.
#[derive(Debug)]
pub struct RecordingCommentSink {
    calls: Mutex<Vec<SinkCall>>,
    next_id: Mutex<CommentId>,
    fail: bool,
}

impl Default for RecordingCommentSink {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: Mutex::new(1000),
            fail: false,
        }
    }
}

impl RecordingCommentSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn post_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SinkCall::Post { .. }))
            .count()
    }

    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SinkCall::Update { .. }))
            .count()
    }
}

#[async_trait]
impl CommentSink for RecordingCommentSink {
    async fn post_comment(&self, pr_number: u64, body: &str) -> GateResult<CommentId> {
        self.calls.lock().unwrap().push(SinkCall::Post {
            pr_number,
            body: body.to_string(),
        });
        if self.fail {
            return Err(GateError::collaborator("post comment", "HTTP 403"));
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        Ok(*next_id)
    }

    async fn update_comment(&self, comment_id: CommentId, body: &str) -> GateResult<()> {
        self.calls.lock().unwrap().push(SinkCall::Update {
            comment_id,
            body: body.to_string(),
        });
        if self.fail {
            return Err(GateError::collaborator("update comment", "HTTP 403"));
        }
        Ok(())
    }
}
