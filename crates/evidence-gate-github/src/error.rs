//! Error types for evidence-gate-github

use evidence_gate_core::GateError;
use thiserror::Error;

/// Errors that can occur talking to the GitHub REST API
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Missing or malformed client configuration
    #[error("GitHub client configuration error: {0}")]
    Config(String),

    /// Transport-level failure (DNS, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response from the API
    #[error("GitHub API returned {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode GitHub response: {0}")]
    Decode(String),
}

impl GitHubError {
    /// Wrap as a fatal collaborator error for the gate.
    pub fn into_gate_error(self, operation: &'static str) -> GateError {
        GateError::collaborator(operation, self.to_string())
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GitHubError::Decode(err.to_string())
        } else {
            GitHubError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GitHubError {
    fn from(err: serde_json::Error) -> Self {
        GitHubError::Decode(err.to_string())
    }
}
