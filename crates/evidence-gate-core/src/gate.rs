//! One end-to-end gate run against a pull request.
//!
//! Fetch snapshot → fetch comments and check runs concurrently → evaluate →
//! reconcile the status comment. A failed read of data an enabled rule needs
//! aborts the run before a verdict exists. Comment I/O that only feeds the
//! status comment never aborts it.

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::config::RuleConfig;
use crate::domain::{
    ExistingComment, GateDecision, GateError, GateResult, PullRequestSnapshot, Verdict,
};
use crate::engine::evaluate;
use crate::obs::{emit_comment_failed, emit_gate_evaluated, emit_gate_started, gate_span};
use crate::reconcile::{reconcile, CommentSink, ReconcileOutcome};
use crate::source::PullRequestSource;

/// Run options that are not rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateOptions {
    /// Create or update the status comment.
    pub post_comment: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self { post_comment: true }
    }
}

/// Result of a completed gate run.
#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub snapshot: PullRequestSnapshot,
    pub verdict: Verdict,
    pub decision: GateDecision,
    /// `None` when commenting was disabled.
    pub comment: Option<ReconcileOutcome>,
}

/// Evaluate `pr_number` and publish feedback.
pub async fn run_gate(
    source: &dyn PullRequestSource,
    sink: &dyn CommentSink,
    pr_number: u64,
    config: &RuleConfig,
    options: &GateOptions,
) -> GateResult<GateOutcome> {
    run_gate_inner(source, sink, pr_number, config, options)
        .instrument(gate_span(pr_number))
        .await
}

async fn run_gate_inner(
    source: &dyn PullRequestSource,
    sink: &dyn CommentSink,
    pr_number: u64,
    config: &RuleConfig,
    options: &GateOptions,
) -> GateResult<GateOutcome> {
    emit_gate_started(pr_number);

    let snapshot = source.fetch_pull_request(pr_number).await?;

    let check_runs = async {
        if config.require_tests {
            source.fetch_check_runs(&snapshot.head_sha).await.map(Some)
        } else {
            Ok(None)
        }
    };
    let (comments, check_runs) = futures::try_join!(
        fetch_comments(source, pr_number, config, options),
        check_runs
    )?;

    let bodies: Option<Vec<String>> = match &comments {
        FetchedComments::Loaded(existing) => {
            Some(existing.iter().map(|c| c.body.clone()).collect())
        }
        FetchedComments::Skipped | FetchedComments::Unavailable(_) => None,
    };
    let verdict = evaluate(&snapshot, config, check_runs.as_deref(), bodies.as_deref());
    emit_gate_evaluated(pr_number, &verdict);

    let comment = match comments {
        FetchedComments::Loaded(existing) if options.post_comment => {
            Some(reconcile(pr_number, &verdict, &existing, sink).await)
        }
        FetchedComments::Unavailable(err) if options.post_comment => {
            emit_comment_failed(pr_number, &err);
            Some(ReconcileOutcome::Failed(err.to_string()))
        }
        _ => None,
    };

    let decision = GateDecision::from_verdict(&verdict, config.fail_on_violation);
    Ok(GateOutcome {
        snapshot,
        verdict,
        decision,
        comment,
    })
}

enum FetchedComments {
    Skipped,
    Loaded(Vec<ExistingComment>),
    /// The listing failed but no enabled rule reads comments.
    Unavailable(GateError),
}

/// Comments are fetched when the evidence rule or the status comment needs
/// them. Only the evidence rule makes a failed fetch fatal.
async fn fetch_comments(
    source: &dyn PullRequestSource,
    pr_number: u64,
    config: &RuleConfig,
    options: &GateOptions,
) -> GateResult<FetchedComments> {
    if !config.require_evidence_attachments && !options.post_comment {
        return Ok(FetchedComments::Skipped);
    }
    match source.fetch_comments(pr_number).await {
        Ok(existing) => Ok(FetchedComments::Loaded(existing)),
        Err(err) if config.require_evidence_attachments => Err(err),
        Err(err) => Ok(FetchedComments::Unavailable(err)),
    }
}
