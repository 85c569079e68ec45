//! Evidence Gate GitHub collaborator
//!
//! Connects the gate's [`PullRequestSource`](evidence_gate_core::PullRequestSource)
//! and [`CommentSink`](evidence_gate_core::CommentSink) traits to the GitHub
//! REST API. Response payloads are normalised into core types at this
//! boundary; approval counts are reduced from raw review history with
//! [`count_approvals`](evidence_gate_core::count_approvals).

pub mod client;
pub mod error;
pub mod models;

pub use client::{parse_repository, GitHubClient, GitHubConfig};
pub use error::GitHubError;
pub use models::AutomationIdentity;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GitHubError>;
