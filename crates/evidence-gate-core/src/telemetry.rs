//! Log setup for the `evidence-gate` binary.
//!
//! The runner parses workflow commands (`::error::`, `::warning::`) from
//! stdout, so every log line is written to stderr instead.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide subscriber for a gate run.
///
/// `level` applies to the gate's own crates; HTTP and runtime crates stay
/// at `warn` so verbose runs show gate decisions, not connection chatter.
/// `RUST_LOG` replaces both. With `json` set each event is one JSON object
/// per line, for runners that ship logs to an aggregator.
///
/// A second call leaves the first subscriber in place.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }
}

fn default_directives(level: Level) -> String {
    format!("warn,evidence_gate={level}")
}
