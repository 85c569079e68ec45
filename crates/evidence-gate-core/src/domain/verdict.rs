//! Rule identifiers, violations and the aggregate verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a gate rule.
///
/// Variants are declared in canonical reporting order; the derived `Ord`
/// is what [`Verdict::from_violations`] sorts by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    BlockedLabels,
    RequiredLabels,
    RequireDescription,
    RequireLinkedIssue,
    RequireEvidenceAttachments,
    RequireTests,
    MinApprovals,
}

impl RuleId {
    /// Every rule, in canonical reporting order.
    pub const ALL: [RuleId; 7] = [
        RuleId::BlockedLabels,
        RuleId::RequiredLabels,
        RuleId::RequireDescription,
        RuleId::RequireLinkedIssue,
        RuleId::RequireEvidenceAttachments,
        RuleId::RequireTests,
        RuleId::MinApprovals,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::BlockedLabels => "blocked-labels",
            RuleId::RequiredLabels => "required-labels",
            RuleId::RequireDescription => "require-description",
            RuleId::RequireLinkedIssue => "require-linked-issue",
            RuleId::RequireEvidenceAttachments => "require-evidence-attachments",
            RuleId::RequireTests => "require-tests",
            RuleId::MinApprovals => "min-approvals",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single rule failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub rule: RuleId,
    pub message: String,
    pub severity: Severity,
}

impl Violation {
    pub fn error(rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of one evaluation.
///
/// `passed` holds exactly when no violation has [`Severity::Error`].
/// Warnings alone never fail a verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub violations: Vec<Violation>,
}

impl Verdict {
    /// Build a verdict, sorting violations into canonical rule order.
    pub fn from_violations(mut violations: Vec<Violation>) -> Self {
        violations.sort_by_key(|v| v.rule);
        let passed = !violations.iter().any(Violation::is_error);
        Self { passed, violations }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// `"passed"` or `"failed"`.
    pub fn result_label(&self) -> &'static str {
        if self.passed {
            "passed"
        } else {
            "failed"
        }
    }

    /// Workflow output values for this verdict.
    pub fn outputs(&self) -> serde_json::Result<VerdictOutputs> {
        Ok(VerdictOutputs {
            validation_result: self.result_label().to_string(),
            violations: serde_json::to_string(&self.violations)?,
            violation_count: self.violations.len(),
        })
    }
}

/// Serialized verdict, as exposed to the invoking workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictOutputs {
    /// `passed` or `failed`.
    pub validation_result: String,
    /// Single-line JSON array of `{rule, message, severity}`.
    pub violations: String,
    pub violation_count: usize,
}

impl VerdictOutputs {
    /// Output name/value pairs in a stable order.
    pub fn pairs(&self) -> [(&'static str, String); 3] {
        [
            ("validation-result", self.validation_result.clone()),
            ("violations", self.violations.clone()),
            ("violation-count", self.violation_count.to_string()),
        ]
    }
}

/// Terminal signal for the invoking environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Success,
    Failure { violation_count: usize },
}

impl GateDecision {
    /// Depends only on the verdict and `fail_on_violation`, never on whether
    /// the status comment could be published.
    pub fn from_verdict(verdict: &Verdict, fail_on_violation: bool) -> Self {
        if verdict.passed || !fail_on_violation {
            GateDecision::Success
        } else {
            GateDecision::Failure {
                violation_count: verdict.violations.len(),
            }
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, GateDecision::Failure { .. })
    }
}
