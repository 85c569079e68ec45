//! GitHub Actions workflow plumbing: step outputs, workflow commands and the
//! triggering event payload.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use evidence_gate_core::VerdictOutputs;
use serde_json::Value;

/// Append `name=value` lines to the step output file.
pub fn write_outputs(path: &Path, outputs: &VerdictOutputs) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file {}", path.display()))?;

    for (name, value) in outputs.pairs() {
        writeln!(file, "{name}={value}")
            .with_context(|| format!("Failed to write output {name}"))?;
    }
    Ok(())
}

/// Format a workflow command such as `::error::message`.
///
/// `%`, CR and LF are escaped so multi-line messages stay one command.
pub fn command(kind: &str, message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::{kind}::{escaped}")
}

/// Parse an explicit pull request number. Empty values count as unset,
/// matching how the runner passes inputs that were not given.
pub fn parse_pr_number(raw: Option<&str>) -> Result<Option<u64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .with_context(|| format!("pr-number is not a pull request number: {value:?}")),
    }
}

/// Pull request number from the event payload at `path`.
///
/// Accepts `pull_request` events, `issue_comment` events on a pull request,
/// and any payload with a top-level `number`.
pub fn pr_number_from_event(path: &Path) -> Result<u64> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload {}", path.display()))?;
    let event: Value = serde_json::from_str(&raw).context("Event payload is not valid JSON")?;

    let number = event
        .pointer("/pull_request/number")
        .or_else(|| {
            event
                .get("issue")
                .filter(|issue| issue.get("pull_request").is_some())
                .and_then(|issue| issue.get("number"))
        })
        .or_else(|| event.get("number"))
        .and_then(Value::as_u64);

    match number {
        Some(n) => Ok(n),
        None => bail!(
            "Event payload {} does not reference a pull request; pass --pr-number",
            path.display()
        ),
    }
}

/// Resolve the pull request number from `GITHUB_EVENT_PATH`.
pub fn pr_number_from_env() -> Result<u64> {
    let path = std::env::var("GITHUB_EVENT_PATH")
        .context("No --pr-number given and GITHUB_EVENT_PATH is not set")?;
    pr_number_from_event(Path::new(&path))
}
