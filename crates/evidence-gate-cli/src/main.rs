//! Evidence Gate CLI
//!
//! The `evidence-gate` command runs the pull request evidence gate inside a
//! GitHub Actions job, or offline against a captured pull request.
//!
//! ## Commands
//!
//! - `run`: fetch the pull request, evaluate it, update the status comment
//!   and write step outputs
//! - `evaluate`: evaluate a JSON document without touching the network
//!
//! Rule inputs are read from flags or the `INPUT_*` variables the Actions
//! runner sets for each `with:` key.

mod offline;
mod workflow;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use evidence_gate_core::config::parse_bool;
use evidence_gate_core::{
    render_status_comment, run_gate, GateDecision, GateOptions, ReconcileOutcome, RuleInputs,
    Verdict,
};
use evidence_gate_github::{parse_repository, AutomationIdentity, GitHubClient, GitHubConfig};
use tracing::{info, warn, Level};

use crate::offline::EvaluationDocument;

#[derive(Parser)]
#[command(name = "evidence-gate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pull request evidence gate", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a pull request on GitHub and publish the result
    Run {
        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        github: GitHubArgs,

        /// Pull request number (read from the event payload if omitted or empty)
        #[arg(long, env = "INPUT_PR-NUMBER")]
        pr_number: Option<String>,

        /// Create or update the status comment ("true"/"false")
        #[arg(long, env = "INPUT_POST-COMMENT")]
        post_comment: Option<String>,

        /// Step output file
        #[arg(long, env = "GITHUB_OUTPUT")]
        output_file: Option<PathBuf>,
    },

    /// Evaluate a pull request captured as JSON
    Evaluate {
        /// Document with `pull_request` and optional `check_runs`,
        /// `comments` and `reviews`
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        rules: RuleArgs,

        /// Print the status comment instead of the verdict JSON
        #[arg(long)]
        markdown: bool,
    },
}

/// Rule inputs. Values stay raw here and are validated by [`RuleInputs::parse`].
#[derive(Args, Debug, Default)]
struct RuleArgs {
    /// Labels that must be present (comma or newline separated)
    #[arg(long, env = "INPUT_REQUIRED-LABELS")]
    required_labels: Option<String>,

    /// Labels that must be absent (comma or newline separated)
    #[arg(long, env = "INPUT_BLOCKED-LABELS")]
    blocked_labels: Option<String>,

    #[arg(long, env = "INPUT_REQUIRE-DESCRIPTION")]
    require_description: Option<String>,

    #[arg(long, env = "INPUT_REQUIRE-LINKED-ISSUE")]
    require_linked_issue: Option<String>,

    #[arg(long, env = "INPUT_REQUIRE-EVIDENCE-ATTACHMENTS")]
    require_evidence_attachments: Option<String>,

    #[arg(long, env = "INPUT_REQUIRE-TESTS")]
    require_tests: Option<String>,

    /// Minimum number of approving reviewers
    #[arg(long, env = "INPUT_MIN-APPROVALS")]
    min_approvals: Option<String>,

    /// Fail the step when any violation is found
    #[arg(long, env = "INPUT_FAIL-ON-VIOLATION")]
    fail_on_violation: Option<String>,
}

impl RuleArgs {
    fn to_inputs(&self) -> RuleInputs {
        RuleInputs {
            required_labels: self.required_labels.clone(),
            blocked_labels: self.blocked_labels.clone(),
            require_description: self.require_description.clone(),
            require_linked_issue: self.require_linked_issue.clone(),
            require_evidence_attachments: self.require_evidence_attachments.clone(),
            require_tests: self.require_tests.clone(),
            min_approvals: self.min_approvals.clone(),
            fail_on_violation: self.fail_on_violation.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct GitHubArgs {
    /// Token used for API calls
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: String,

    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    api_url: String,

    /// Login whose comments count as the gate's own
    #[arg(long, env = "INPUT_BOT-LOGIN", conflicts_with = "any_bot")]
    bot_login: Option<String>,

    /// Treat comments from any bot account as the gate's own
    #[arg(long)]
    any_bot: bool,
}

impl GitHubArgs {
    fn to_config(&self) -> Result<GitHubConfig> {
        let (owner, repo) = parse_repository(&self.repository)?;
        let automation = match (&self.bot_login, self.any_bot) {
            (_, true) => AutomationIdentity::AnyBot,
            (Some(login), false) if !login.trim().is_empty() => {
                AutomationIdentity::Login(login.trim().to_string())
            }
            _ => AutomationIdentity::default(),
        };

        let mut config = GitHubConfig::new(owner, repo)
            .with_api_url(&self.api_url)
            .with_automation(automation);
        if let Some(token) = &self.github_token {
            config = config.with_token(token);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    evidence_gate_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            rules,
            github,
            pr_number,
            post_comment,
            output_file,
        } => {
            cmd_run(
                &rules,
                &github,
                pr_number.as_deref(),
                post_comment.as_deref(),
                output_file.as_deref(),
            )
            .await
        }
        Commands::Evaluate {
            input,
            rules,
            markdown,
        } => cmd_evaluate(&input, &rules, markdown),
    }
}

async fn cmd_run(
    rules: &RuleArgs,
    github: &GitHubArgs,
    pr_number: Option<&str>,
    post_comment: Option<&str>,
    output_file: Option<&Path>,
) -> Result<ExitCode> {
    let config = rules
        .to_inputs()
        .parse()
        .context("Invalid rule configuration")?;
    let post_comment = parse_bool("post-comment", post_comment, true)?;
    let pr_number = match workflow::parse_pr_number(pr_number)? {
        Some(n) => n,
        None => workflow::pr_number_from_env()?,
    };

    let client = GitHubClient::new(github.to_config()?)?;
    let options = GateOptions { post_comment };
    let outcome = run_gate(&client, &client, pr_number, &config, &options)
        .await
        .with_context(|| format!("Evidence gate could not evaluate pull request #{pr_number}"))?;

    publish(
        &outcome.verdict,
        outcome.decision,
        outcome.comment.as_ref(),
        output_file,
    )
}

fn cmd_evaluate(input: &Path, rules: &RuleArgs, markdown: bool) -> Result<ExitCode> {
    let config = rules
        .to_inputs()
        .parse()
        .context("Invalid rule configuration")?;
    let document = EvaluationDocument::load(input)?;
    let verdict = document.evaluate(&config);

    if markdown {
        println!("{}", render_status_comment(&verdict));
    } else {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    }

    let decision = GateDecision::from_verdict(&verdict, config.fail_on_violation);
    Ok(exit_code(decision))
}

/// Write step outputs and workflow annotations for a finished evaluation.
fn publish(
    verdict: &Verdict,
    decision: GateDecision,
    comment: Option<&ReconcileOutcome>,
    output_file: Option<&Path>,
) -> Result<ExitCode> {
    let outputs = verdict.outputs()?;
    info!(
        result = %outputs.validation_result,
        violations = outputs.violation_count,
        "Evidence gate finished"
    );

    match output_file {
        Some(path) => workflow::write_outputs(path, &outputs)?,
        None => {
            warn!("GITHUB_OUTPUT not set; step outputs not written");
            for (name, value) in outputs.pairs() {
                println!("{name}={value}");
            }
        }
    }

    for line in annotations(verdict, decision, comment) {
        println!("{line}");
    }

    Ok(exit_code(decision))
}

/// Workflow commands for the run log.
///
/// Error violations are annotated as errors only when they fail the step.
fn annotations(
    verdict: &Verdict,
    decision: GateDecision,
    comment: Option<&ReconcileOutcome>,
) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(ReconcileOutcome::Failed(reason)) = comment {
        lines.push(workflow::command(
            "warning",
            &format!("Status comment not published: {reason}"),
        ));
    }

    let error_kind = if decision.is_failure() {
        "error"
    } else {
        "warning"
    };
    for violation in &verdict.violations {
        let kind = if violation.is_error() {
            error_kind
        } else {
            "warning"
        };
        lines.push(workflow::command(
            kind,
            &format!("{}: {}", violation.rule, violation.message),
        ));
    }

    if let GateDecision::Failure { violation_count } = decision {
        lines.push(workflow::command(
            "error",
            &format!("Evidence gate failed with {violation_count} violation(s)"),
        ));
    }

    lines
}

fn exit_code(decision: GateDecision) -> ExitCode {
    if decision.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_gate_core::{RuleId, Violation};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn run_args_parse() {
        let cli = parse(&[
            "evidence-gate",
            "run",
            "--repository",
            "stevedores-org/shop",
            "--pr-number",
            "42",
            "--required-labels",
            "reviewed,qa-passed",
            "--min-approvals",
            "2",
            "--bot-login",
            "gate-bot[bot]",
        ]);

        let Commands::Run {
            rules,
            github,
            pr_number,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(pr_number.as_deref(), Some("42"));

        let config = rules.to_inputs().parse().unwrap();
        assert_eq!(config.required_labels, vec!["reviewed", "qa-passed"]);
        assert_eq!(config.min_approvals, 2);

        let gh = github.to_config().unwrap();
        assert_eq!(gh.owner, "stevedores-org");
        assert_eq!(gh.repo, "shop");
        assert_eq!(
            gh.automation,
            AutomationIdentity::Login("gate-bot[bot]".to_string())
        );
    }

    #[test]
    fn any_bot_conflicts_with_bot_login() {
        let result = Cli::try_parse_from([
            "evidence-gate",
            "run",
            "--repository",
            "o/r",
            "--bot-login",
            "x[bot]",
            "--any-bot",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn negative_min_approvals_is_config_error() {
        let rules = RuleArgs {
            min_approvals: Some("-1".to_string()),
            ..RuleArgs::default()
        };
        assert!(rules.to_inputs().parse().is_err());
    }

    #[test]
    fn empty_pr_number_env_falls_through() {
        std::env::set_var("INPUT_PR-NUMBER", "");
        let cli = Cli::try_parse_from(["evidence-gate", "run", "--repository", "o/r"]);
        std::env::remove_var("INPUT_PR-NUMBER");

        let Commands::Run { pr_number, .. } = cli.unwrap().command else {
            panic!("expected run");
        };
        assert_eq!(workflow::parse_pr_number(pr_number.as_deref()).unwrap(), None);
    }

    #[test]
    fn errors_annotated_as_errors_when_failing() {
        let verdict = Verdict::from_violations(vec![
            Violation::error(RuleId::RequireDescription, "Pull request description is empty"),
            Violation::warning(RuleId::RequireTests, "No test check runs found for commit abc1234"),
        ]);
        let decision = GateDecision::from_verdict(&verdict, true);

        let lines = annotations(&verdict, decision, None);
        assert_eq!(
            lines,
            vec![
                "::error::require-description: Pull request description is empty".to_string(),
                "::warning::require-tests: No test check runs found for commit abc1234"
                    .to_string(),
                "::error::Evidence gate failed with 2 violation(s)".to_string(),
            ]
        );
    }

    #[test]
    fn errors_downgraded_when_not_enforcing() {
        let verdict = Verdict::from_violations(vec![Violation::error(
            RuleId::MinApprovals,
            "Insufficient approvals: 0/1",
        )]);
        let decision = GateDecision::from_verdict(&verdict, false);

        let lines = annotations(&verdict, decision, None);
        assert_eq!(
            lines,
            vec!["::warning::min-approvals: Insufficient approvals: 0/1".to_string()]
        );
    }

    #[test]
    fn unpublished_comment_is_a_warning() {
        let verdict = Verdict::from_violations(Vec::new());
        let comment = ReconcileOutcome::Failed("post comment failed: HTTP 403".to_string());

        let lines = annotations(&verdict, GateDecision::Success, Some(&comment));
        assert_eq!(
            lines,
            vec!["::warning::Status comment not published: post comment failed: HTTP 403"
                .to_string()]
        );

        let created = ReconcileOutcome::Created(5);
        assert!(annotations(&verdict, GateDecision::Success, Some(&created)).is_empty());
    }

    #[test]
    fn evaluate_args_parse() {
        let cli = parse(&[
            "evidence-gate",
            "--json",
            "evaluate",
            "--input",
            "pr.json",
            "--require-tests",
            "true",
            "--markdown",
        ]);
        assert!(cli.json);
        let Commands::Evaluate {
            input,
            rules,
            markdown,
        } = cli.command
        else {
            panic!("expected evaluate");
        };
        assert_eq!(input, PathBuf::from("pr.json"));
        assert!(markdown);
        assert!(rules.to_inputs().parse().unwrap().require_tests);
    }

    #[test]
    fn publish_writes_outputs_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let verdict = Verdict::from_violations(vec![
            Violation::error(RuleId::RequireDescription, "Pull request description is empty"),
            Violation::warning(RuleId::RequireTests, "No test check runs found for commit abc1234"),
        ]);
        let decision = GateDecision::from_verdict(&verdict, true);

        let code = publish(&verdict, decision, None, Some(&path)).unwrap();
        assert_eq!(code, ExitCode::FAILURE);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("validation-result=failed\n"));
        assert!(written.contains("violation-count=2\n"));
    }

    #[test]
    fn publish_succeeds_when_not_enforcing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let verdict = Verdict::from_violations(vec![Violation::error(
            RuleId::MinApprovals,
            "Insufficient approvals: 0/1",
        )]);
        let decision = GateDecision::from_verdict(&verdict, false);

        let code = publish(&verdict, decision, None, Some(&path)).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("validation-result=failed\n"));
    }

    #[test]
    fn evaluate_fixture_exit_code() {
        let input = PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/fixtures/pull_request.json"
        ));
        let rules = RuleArgs {
            require_tests: Some("true".to_string()),
            ..RuleArgs::default()
        };
        assert_eq!(cmd_evaluate(&input, &rules, false).unwrap(), ExitCode::FAILURE);

        let rules = RuleArgs {
            require_linked_issue: Some("true".to_string()),
            ..RuleArgs::default()
        };
        assert_eq!(cmd_evaluate(&input, &rules, true).unwrap(), ExitCode::SUCCESS);
    }
}
