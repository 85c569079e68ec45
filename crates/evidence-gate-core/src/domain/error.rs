//! Error taxonomy for the evidence gate.

/// Malformed rule configuration. Raised before any evaluation starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("min-approvals must not be negative, got {0}")]
    NegativeMinApprovals(i64),

    #[error("min-approvals is not an integer: {0:?}")]
    InvalidMinApprovals(String),

    #[error("{input} must be 'true' or 'false', got {value:?}")]
    InvalidBoolean { input: String, value: String },

    #[error("{input} contains an unparseable label: {label:?}")]
    InvalidLabel { input: String, label: String },
}

/// Fatal errors that abort a gate run. No partial verdict is produced.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A collaborator read or write failed.
    #[error("{operation} failed: {message}")]
    Collaborator {
        operation: &'static str,
        message: String,
    },
}

impl GateError {
    pub fn collaborator(operation: &'static str, message: impl Into<String>) -> Self {
        GateError::Collaborator {
            operation,
            message: message.into(),
        }
    }
}

/// Result type for gate operations.
pub type GateResult<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts() {
        let err: GateError = ConfigError::NegativeMinApprovals(-1).into();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn collaborator_error_display() {
        let err = GateError::collaborator("fetch check runs", "HTTP 502");
        assert_eq!(err.to_string(), "fetch check runs failed: HTTP 502");
    }
}
