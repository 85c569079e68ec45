//! Evidence Gate Core
//!
//! Decision logic for the pull request evidence gate:
//! - [`engine`]: evaluates a pull request snapshot against a rule
//!   configuration and produces a [`Verdict`]
//! - [`reconcile`]: renders the verdict and keeps a single status comment
//!   on the pull request up to date
//! - [`gate`]: the fetch → evaluate → comment pipeline over collaborator
//!   traits

pub mod approvals;
pub mod config;
pub mod domain;
pub mod engine;
pub mod fakes;
pub mod gate;
pub mod obs;
pub mod patterns;
pub mod reconcile;
pub mod source;
pub mod telemetry;

pub use approvals::count_approvals;
pub use config::{RuleConfig, RuleInputs};
pub use domain::{
    CheckConclusion, CheckRun, ConfigError, ExistingComment, GateDecision, GateError, GateResult,
    PullRequestSnapshot, Review, ReviewState, RuleId, Severity, Verdict, VerdictOutputs,
    Violation,
};
pub use engine::{evaluate, evaluate_rules, EvaluationContext};
pub use gate::{run_gate, GateOptions, GateOutcome};
pub use reconcile::{
    find_status_comment, reconcile, render_status_comment, CommentId, CommentSink,
    ReconcileOutcome, STATUS_COMMENT_MARKER,
};
pub use source::PullRequestSource;
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
