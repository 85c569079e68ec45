//! Offline evaluation of a pull request captured as a JSON document.

use std::path::Path;

use anyhow::{Context, Result};
use evidence_gate_core::{
    count_approvals, evaluate, CheckRun, PullRequestSnapshot, Review, RuleConfig, Verdict,
};
use serde::Deserialize;

/// A captured pull request plus the optional inputs the rules read.
///
/// When `reviews` is present it replaces the snapshot's `approval_count`.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationDocument {
    pub pull_request: PullRequestSnapshot,
    #[serde(default)]
    pub check_runs: Option<Vec<CheckRun>>,
    #[serde(default)]
    pub comments: Option<Vec<String>>,
    #[serde(default)]
    pub reviews: Option<Vec<Review>>,
}

impl EvaluationDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse evaluation document {}", path.display()))
    }

    pub fn snapshot(&self) -> PullRequestSnapshot {
        let mut snapshot = self.pull_request.clone();
        if let Some(reviews) = &self.reviews {
            snapshot.approval_count = count_approvals(reviews);
        }
        snapshot
    }

    pub fn evaluate(&self, config: &RuleConfig) -> Verdict {
        evaluate(
            &self.snapshot(),
            config,
            self.check_runs.as_deref(),
            self.comments.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_gate_core::{RuleId, Severity};

    const FIXTURE: &str = include_str!("../fixtures/pull_request.json");

    fn document() -> EvaluationDocument {
        serde_json::from_str(FIXTURE).unwrap()
    }

    #[test]
    fn reviews_override_approval_count() {
        let doc = document();
        assert_eq!(doc.pull_request.approval_count, 0);
        assert_eq!(doc.snapshot().approval_count, 1);
    }

    #[test]
    fn fixture_fails_on_tests_and_approvals() {
        let config = RuleConfig::default()
            .with_required_labels(["reviewed"])
            .with_require_description(true)
            .with_require_linked_issue(true)
            .with_require_evidence_attachments(true)
            .with_require_tests(true)
            .with_min_approvals(2);

        let verdict = document().evaluate(&config);

        assert!(!verdict.passed);
        let rules: Vec<RuleId> = verdict.violations.iter().map(|v| v.rule).collect();
        assert_eq!(rules, vec![RuleId::RequireTests, RuleId::MinApprovals]);
        assert_eq!(verdict.violations[0].severity, Severity::Error);
        assert_eq!(verdict.violations[0].message, "1 test check(s) failed");
        assert_eq!(verdict.violations[1].message, "Insufficient approvals: 1/2");
    }

    #[test]
    fn missing_sections_skip_their_rules() {
        let doc: EvaluationDocument = serde_json::from_str(
            r#"{"pull_request":{"number":1,"title":"t","head_sha":"abc1234def"}}"#,
        )
        .unwrap();
        assert!(doc.check_runs.is_none());

        let verdict = doc.evaluate(&RuleConfig::default().with_require_tests(true));
        assert!(verdict.passed);
        assert!(verdict.violations.is_empty());
    }

    #[test]
    fn load_reports_path_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pr.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = EvaluationDocument::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("pr.json"));
    }
}
