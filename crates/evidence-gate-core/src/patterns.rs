//! Text patterns used by the description and evidence rules.

use std::sync::OnceLock;

use regex::Regex;

/// Closing keyword followed by `#<digits>`, or a bare `#<digits>` anywhere.
///
/// The bare form makes the keyword branch redundant for matching, but both
/// are kept so the accepted shapes stay explicit.
const LINKED_ISSUE: &str =
    r"(?i)\b(?:close[sd]?|fix(?:e[sd])?|resolve[sd]?)\s+#\d+|#\d+";

/// Markdown image, `<img` tag, or an anchor whose href mentions a download.
const EVIDENCE_ATTACHMENT: &str = r"(?is)!\[[^\]]*\]\([^)]+\)|<img\b|<a\s[^>]*href\s*=[^>]*download";

fn linked_issue() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LINKED_ISSUE).expect("linked-issue pattern compiles"))
}

fn evidence_attachment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EVIDENCE_ATTACHMENT).expect("evidence pattern compiles"))
}

/// Whether `text` references an issue (`Fixes #42`, `#42`).
pub fn has_issue_reference(text: &str) -> bool {
    linked_issue().is_match(text)
}

/// Whether `text` carries an image or downloadable file reference.
pub fn has_evidence_attachment(text: &str) -> bool {
    evidence_attachment().is_match(text)
}
