//! Rule configuration and parsing of raw action inputs.
//!
//! Action inputs arrive as strings (label lists comma separated, booleans as
//! `true`/`false`). [`RuleInputs::parse`] turns them into a validated
//! [`RuleConfig`] or a [`ConfigError`]; the engine never sees raw strings.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::ConfigError;

/// Static rule configuration for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleConfig {
    pub required_labels: Vec<String>,
    pub blocked_labels: Vec<String>,
    pub require_description: bool,
    pub require_linked_issue: bool,
    pub require_evidence_attachments: bool,
    pub require_tests: bool,
    pub min_approvals: u32,
    /// Whether error violations fail the run for the invoking environment.
    pub fail_on_violation: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            required_labels: Vec::new(),
            blocked_labels: Vec::new(),
            require_description: false,
            require_linked_issue: false,
            require_evidence_attachments: false,
            require_tests: false,
            min_approvals: 0,
            fail_on_violation: true,
        }
    }
}

impl RuleConfig {
    pub fn with_required_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_labels = dedup(labels.into_iter().map(Into::into));
        self
    }

    pub fn with_blocked_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_labels = dedup(labels.into_iter().map(Into::into));
        self
    }

    pub fn with_require_description(mut self, enabled: bool) -> Self {
        self.require_description = enabled;
        self
    }

    pub fn with_require_linked_issue(mut self, enabled: bool) -> Self {
        self.require_linked_issue = enabled;
        self
    }

    pub fn with_require_evidence_attachments(mut self, enabled: bool) -> Self {
        self.require_evidence_attachments = enabled;
        self
    }

    pub fn with_require_tests(mut self, enabled: bool) -> Self {
        self.require_tests = enabled;
        self
    }

    pub fn with_min_approvals(mut self, min_approvals: u32) -> Self {
        self.min_approvals = min_approvals;
        self
    }

    pub fn with_fail_on_violation(mut self, enabled: bool) -> Self {
        self.fail_on_violation = enabled;
        self
    }

    /// Labels that are both required and blocked. Such a configuration is
    /// still evaluated; it just can never pass.
    pub fn conflicting_labels(&self) -> Vec<&str> {
        self.required_labels
            .iter()
            .filter(|label| self.blocked_labels.contains(label))
            .map(String::as_str)
            .collect()
    }
}

/// Raw, unparsed action inputs. `None` means the input was not supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleInputs {
    pub required_labels: Option<String>,
    pub blocked_labels: Option<String>,
    pub require_description: Option<String>,
    pub require_linked_issue: Option<String>,
    pub require_evidence_attachments: Option<String>,
    pub require_tests: Option<String>,
    pub min_approvals: Option<String>,
    pub fail_on_violation: Option<String>,
}

impl RuleInputs {
    /// Parse and validate into a [`RuleConfig`].
    ///
    /// Missing inputs take the [`RuleConfig::default`] value. Empty strings
    /// count as missing, matching how workflow runners pass unset inputs.
    pub fn parse(&self) -> Result<RuleConfig, ConfigError> {
        let defaults = RuleConfig::default();
        let config = RuleConfig {
            required_labels: parse_label_list("required-labels", self.required_labels.as_deref())?,
            blocked_labels: parse_label_list("blocked-labels", self.blocked_labels.as_deref())?,
            require_description: parse_bool(
                "require-description",
                self.require_description.as_deref(),
                defaults.require_description,
            )?,
            require_linked_issue: parse_bool(
                "require-linked-issue",
                self.require_linked_issue.as_deref(),
                defaults.require_linked_issue,
            )?,
            require_evidence_attachments: parse_bool(
                "require-evidence-attachments",
                self.require_evidence_attachments.as_deref(),
                defaults.require_evidence_attachments,
            )?,
            require_tests: parse_bool(
                "require-tests",
                self.require_tests.as_deref(),
                defaults.require_tests,
            )?,
            min_approvals: parse_min_approvals(self.min_approvals.as_deref())?,
            fail_on_violation: parse_bool(
                "fail-on-violation",
                self.fail_on_violation.as_deref(),
                defaults.fail_on_violation,
            )?,
        };
        for label in config.conflicting_labels() {
            warn!(label, "label is both required and blocked; no pull request can pass");
        }
        Ok(config)
    }
}

/// Split a comma or newline separated label list.
///
/// Entries are trimmed, empty entries dropped and duplicates removed while
/// keeping first-seen order. Entries with embedded control characters are
/// rejected.
pub fn parse_label_list(input: &str, raw: Option<&str>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let mut labels = Vec::new();
    for entry in raw.split([',', '\n']) {
        let label = entry.trim();
        if label.is_empty() {
            continue;
        }
        if label.chars().any(char::is_control) {
            return Err(ConfigError::InvalidLabel {
                input: input.to_string(),
                label: label.to_string(),
            });
        }
        labels.push(label.to_string());
    }
    Ok(dedup(labels))
}

/// Parse `true`/`false` (any case, surrounding whitespace ignored).
pub fn parse_bool(input: &str, raw: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(v) => v,
    };
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::InvalidBoolean {
            input: input.to_string(),
            value: value.to_string(),
        })
    }
}

pub fn parse_min_approvals(raw: Option<&str>) -> Result<u32, ConfigError> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Ok(0),
        Some(v) => v,
    };
    let parsed: i64 = value
        .parse()
        .map_err(|_| ConfigError::InvalidMinApprovals(value.to_string()))?;
    if parsed < 0 {
        return Err(ConfigError::NegativeMinApprovals(parsed));
    }
    u32::try_from(parsed).map_err(|_| ConfigError::InvalidMinApprovals(value.to_string()))
}

fn dedup(labels: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        if !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PullRequestSnapshot, RuleId};
    use crate::engine::evaluate;

    #[test]
    fn empty_inputs_give_defaults() {
        let config = RuleInputs::default().parse().unwrap();
        assert_eq!(config, RuleConfig::default());
        assert!(config.fail_on_violation);
    }

    #[test]
    fn label_list_is_trimmed_and_deduplicated() {
        let labels = parse_label_list("required-labels", Some(" a, b ,,a\nc")).unwrap();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn label_with_control_character_rejected() {
        let err = parse_label_list("blocked-labels", Some("ok,bad\u{7}label")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLabel { .. }));
    }

    #[test]
    fn booleans_parse_case_insensitively() {
        assert!(parse_bool("x", Some(" TRUE "), false).unwrap());
        assert!(!parse_bool("x", Some("False"), true).unwrap());
        assert!(parse_bool("x", Some(""), true).unwrap());
        assert!(matches!(
            parse_bool("x", Some("yes"), false),
            Err(ConfigError::InvalidBoolean { .. })
        ));
    }

    #[test]
    fn negative_min_approvals_rejected() {
        assert_eq!(
            parse_min_approvals(Some("-1")),
            Err(ConfigError::NegativeMinApprovals(-1))
        );
    }

    #[test]
    fn non_numeric_min_approvals_rejected() {
        assert!(matches!(
            parse_min_approvals(Some("two")),
            Err(ConfigError::InvalidMinApprovals(_))
        ));
        assert_eq!(parse_min_approvals(Some(" 2 ")), Ok(2));
    }

    #[test]
    fn label_both_required_and_blocked_is_evaluated() {
        let inputs = RuleInputs {
            required_labels: Some("wip".to_string()),
            blocked_labels: Some("wip".to_string()),
            ..RuleInputs::default()
        };
        let config = inputs.parse().expect("conflict is not a config error");
        assert_eq!(config.conflicting_labels(), vec!["wip"]);

        let labelled = PullRequestSnapshot::new(1, "t", "abc").with_labels(["wip"]);
        let verdict = evaluate(&labelled, &config, None, None);
        assert!(!verdict.passed);
        assert_eq!(verdict.violations.len(), 1);
        assert_eq!(verdict.violations[0].rule, RuleId::BlockedLabels);

        let unlabelled = PullRequestSnapshot::new(2, "t", "abc");
        let verdict = evaluate(&unlabelled, &config, None, None);
        assert_eq!(verdict.violations.len(), 1);
        assert_eq!(verdict.violations[0].rule, RuleId::RequiredLabels);
    }

    #[test]
    fn full_inputs_parse() {
        let inputs = RuleInputs {
            required_labels: Some("reviewed".to_string()),
            blocked_labels: Some("wip, do-not-merge".to_string()),
            require_description: Some("true".to_string()),
            require_linked_issue: Some("true".to_string()),
            require_evidence_attachments: Some("false".to_string()),
            require_tests: Some("true".to_string()),
            min_approvals: Some("2".to_string()),
            fail_on_violation: Some("false".to_string()),
        };
        let config = inputs.parse().unwrap();
        assert_eq!(config.required_labels, vec!["reviewed"]);
        assert_eq!(config.blocked_labels, vec!["wip", "do-not-merge"]);
        assert!(config.require_description);
        assert!(config.require_linked_issue);
        assert!(!config.require_evidence_attachments);
        assert!(config.require_tests);
        assert_eq!(config.min_approvals, 2);
        assert!(!config.fail_on_violation);
    }
}
