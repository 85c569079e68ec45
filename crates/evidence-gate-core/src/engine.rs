//! Evidence gate rules engine.
//!
//! Evaluates a [`PullRequestSnapshot`] against a [`RuleConfig`] to produce a
//! [`Verdict`]: the pass/fail decision plus every violation found. Rules are
//! independent of one another; all of them run, violations accumulate, and
//! the result is sorted into canonical [`RuleId`] order before returning.

use crate::config::RuleConfig;
use crate::domain::{CheckRun, PullRequestSnapshot, RuleId, Verdict, Violation};
use crate::patterns::{has_evidence_attachment, has_issue_reference};
use crate::reconcile::STATUS_COMMENT_MARKER;

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub snapshot: &'a PullRequestSnapshot,
    pub config: &'a RuleConfig,
    /// `None` skips the tests rule.
    pub check_runs: Option<&'a [CheckRun]>,
    /// `None` restricts the evidence search to the description.
    pub comments: Option<&'a [String]>,
}

/// Evaluate every enabled rule and return the verdict.
pub fn evaluate(
    snapshot: &PullRequestSnapshot,
    config: &RuleConfig,
    check_runs: Option<&[CheckRun]>,
    comments: Option<&[String]>,
) -> Verdict {
    let ctx = EvaluationContext {
        snapshot,
        config,
        check_runs,
        comments,
    };
    evaluate_rules(&ctx, RuleId::ALL)
}

/// Evaluate the given rules in the order supplied.
///
/// The verdict does not depend on that order.
pub fn evaluate_rules(
    ctx: &EvaluationContext<'_>,
    rules: impl IntoIterator<Item = RuleId>,
) -> Verdict {
    let violations = rules
        .into_iter()
        .filter_map(|rule| check_rule(rule, ctx))
        .collect();
    Verdict::from_violations(violations)
}

fn check_rule(rule: RuleId, ctx: &EvaluationContext<'_>) -> Option<Violation> {
    let EvaluationContext {
        snapshot, config, ..
    } = *ctx;

    match rule {
        RuleId::RequiredLabels => {
            let missing: Vec<&str> = config
                .required_labels
                .iter()
                .filter(|label| !snapshot.has_label(label))
                .map(String::as_str)
                .collect();

            if missing.is_empty() {
                None
            } else {
                Some(Violation::error(
                    rule,
                    format!("Missing required label(s): {}", missing.join(", ")),
                ))
            }
        }

        RuleId::BlockedLabels => {
            let present: Vec<&str> = config
                .blocked_labels
                .iter()
                .filter(|label| snapshot.has_label(label))
                .map(String::as_str)
                .collect();

            if present.is_empty() {
                None
            } else {
                Some(Violation::error(
                    rule,
                    format!("Blocked label(s) present: {}", present.join(", ")),
                ))
            }
        }

        RuleId::RequireDescription => {
            if config.require_description && snapshot.body_text().trim().is_empty() {
                Some(Violation::error(rule, "Pull request description is empty"))
            } else {
                None
            }
        }

        RuleId::RequireLinkedIssue => {
            if config.require_linked_issue && !has_issue_reference(snapshot.body_text()) {
                Some(Violation::error(
                    rule,
                    "No linked issue found. Reference an issue in the description, \
                     e.g. \"Fixes #123\"",
                ))
            } else {
                None
            }
        }

        RuleId::RequireEvidenceAttachments => {
            if !config.require_evidence_attachments || has_evidence(ctx) {
                None
            } else {
                Some(Violation::error(
                    rule,
                    "No evidence attachments found. Add a screenshot or file to the \
                     description or a comment",
                ))
            }
        }

        RuleId::RequireTests => {
            if !config.require_tests {
                return None;
            }
            let runs = ctx.check_runs?;
            let tests: Vec<&CheckRun> = runs.iter().filter(|run| run.is_test()).collect();

            if tests.is_empty() {
                return Some(Violation::warning(
                    rule,
                    format!(
                        "No test check runs found for commit {}",
                        short_sha(&snapshot.head_sha)
                    ),
                ));
            }

            let failed = tests.iter().filter(|run| run.is_failing()).count();
            if failed > 0 {
                Some(Violation::error(
                    rule,
                    format!("{failed} test check(s) failed"),
                ))
            } else {
                None
            }
        }

        RuleId::MinApprovals => {
            if snapshot.approval_count < config.min_approvals {
                Some(Violation::error(
                    rule,
                    format!(
                        "Insufficient approvals: {}/{}",
                        snapshot.approval_count, config.min_approvals
                    ),
                ))
            } else {
                None
            }
        }
    }
}

/// Description or any non-status comment carries an attachment.
fn has_evidence(ctx: &EvaluationContext<'_>) -> bool {
    if has_evidence_attachment(ctx.snapshot.body_text()) {
        return true;
    }
    ctx.comments.unwrap_or_default().iter().any(|body| {
        !body.contains(STATUS_COMMENT_MARKER) && has_evidence_attachment(body)
    })
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
