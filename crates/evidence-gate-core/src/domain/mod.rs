//! Domain model for the evidence gate.

pub mod error;
pub mod pull_request;
pub mod verdict;

pub use error::{ConfigError, GateError, GateResult};
pub use pull_request::{
    CheckConclusion, CheckRun, ExistingComment, PullRequestSnapshot, Review, ReviewState,
};
pub use verdict::{GateDecision, RuleId, Severity, Verdict, VerdictOutputs, Violation};
