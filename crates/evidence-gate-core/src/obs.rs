//! Structured observability hooks for the gate lifecycle.
//!
//! This module provides:
//! - A PR-scoped tracing span via [`gate_span`]
//! - Emission functions for lifecycle events: start, evaluation, comment
//!   reconciliation
//!
//! Verbosity follows `RUST_LOG`; see [`crate::telemetry::init_tracing`].

use tracing::{info, warn};

use crate::domain::Verdict;

/// Span tagging every event of one gate run with the pull request number.
///
/// # Example
///
/// ```ignore
/// run(pr).instrument(gate_span(42)).await
/// ```
pub fn gate_span(pr_number: u64) -> tracing::Span {
    tracing::info_span!("evidence_gate.run", pr_number = pr_number)
}

pub fn emit_gate_started(pr_number: u64) {
    info!(event = "gate.started", pr_number = pr_number);
}

/// Emit event: verdict computed.
pub fn emit_gate_evaluated(pr_number: u64, verdict: &Verdict) {
    info!(
        event = "gate.evaluated",
        pr_number = pr_number,
        passed = verdict.passed,
        errors = verdict.error_count(),
        warnings = verdict.warning_count(),
    );
}

/// Emit event: status comment created or updated.
pub fn emit_comment_reconciled(pr_number: u64, action: &str, comment_id: u64) {
    info!(
        event = "comment.reconciled",
        pr_number = pr_number,
        action = %action,
        comment_id = comment_id,
    );
}

/// Emit event: status comment could not be published (warning level).
pub fn emit_comment_failed(pr_number: u64, error: &dyn std::fmt::Display) {
    warn!(event = "comment.failed", pr_number = pr_number, error = %error);
}
