//! Status comment rendering and create-or-update reconciliation.
//!
//! The gate owns at most one status comment per pull request. It is found
//! again on later runs by [`STATUS_COMMENT_MARKER`] plus the automation
//! author flag, and overwritten in place.

use async_trait::async_trait;

use crate::domain::{ExistingComment, GateResult, Verdict, Violation};
use crate::obs::{emit_comment_failed, emit_comment_reconciled};

/// Hidden marker identifying the gate's own status comment.
pub const STATUS_COMMENT_MARKER: &str = "<!-- evidence-gate:status -->";

/// Identifier of a pull request comment.
pub type CommentId = u64;

/// Write side of the comment collaborator.
#[async_trait]
pub trait CommentSink: Send + Sync {
    /// Create a new comment on the pull request and return its id.
    async fn post_comment(&self, pr_number: u64, body: &str) -> GateResult<CommentId>;

    /// Overwrite the body of an existing comment.
    async fn update_comment(&self, comment_id: CommentId, body: &str) -> GateResult<()>;
}

/// What [`reconcile`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(CommentId),
    Updated(CommentId),
    /// Posting or updating failed. Logged, never fatal.
    Failed(String),
}

/// Render the verdict as the markdown status comment body.
pub fn render_status_comment(verdict: &Verdict) -> String {
    let mut md = format!("{STATUS_COMMENT_MARKER}\n");

    if verdict.passed {
        md.push_str("## ✅ Evidence gate passed\n\n");
        md.push_str("All evidence requirements are satisfied.\n");
    } else {
        md.push_str("## ❌ Evidence gate failed\n\n");
        md.push_str(&format!(
            "Found {} error(s) and {} warning(s).\n",
            verdict.error_count(),
            verdict.warning_count()
        ));
        push_section(&mut md, "Errors", verdict.errors());
    }
    push_section(&mut md, "Warnings", verdict.warnings());

    md
}

fn push_section<'a>(md: &mut String, title: &str, violations: impl Iterator<Item = &'a Violation>) {
    let mut violations = violations.peekable();
    if violations.peek().is_none() {
        return;
    }
    md.push_str(&format!("\n### {title}\n\n"));
    for v in violations {
        md.push_str(&format!("- **{}**: {}\n", v.rule, v.message));
    }
}

/// The most recent (highest id) status comment left by the automation.
pub fn find_status_comment(existing: &[ExistingComment]) -> Option<&ExistingComment> {
    existing
        .iter()
        .filter(|c| c.author_is_automation && c.body.contains(STATUS_COMMENT_MARKER))
        .max_by_key(|c| c.id)
}

/// Create or update the single status comment for `pr_number`.
///
/// Sink failures are logged and reported as [`ReconcileOutcome::Failed`];
/// they never alter the verdict.
pub async fn reconcile(
    pr_number: u64,
    verdict: &Verdict,
    existing: &[ExistingComment],
    sink: &dyn CommentSink,
) -> ReconcileOutcome {
    let body = render_status_comment(verdict);

    let outcome = match find_status_comment(existing) {
        Some(comment) => match sink.update_comment(comment.id, &body).await {
            Ok(()) => ReconcileOutcome::Updated(comment.id),
            Err(e) => ReconcileOutcome::Failed(e.to_string()),
        },
        None => match sink.post_comment(pr_number, &body).await {
            Ok(id) => ReconcileOutcome::Created(id),
            Err(e) => ReconcileOutcome::Failed(e.to_string()),
        },
    };

    match &outcome {
        ReconcileOutcome::Created(id) => emit_comment_reconciled(pr_number, "created", *id),
        ReconcileOutcome::Updated(id) => emit_comment_reconciled(pr_number, "updated", *id),
        ReconcileOutcome::Failed(error) => emit_comment_failed(pr_number, error),
    }
    outcome
}
