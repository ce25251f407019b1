//! Tracing setup for the command line.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable selecting the log level or a full filter directive.
pub const LOG_ENV: &str = "SPECGEN_LOG";

const CRATE_TARGETS: [&str; 2] = ["specgen_core", "specgen_cli"];

/// Install a stderr fmt subscriber filtered by [`LOG_ENV`].
///
/// Calling it twice is harmless: the second call only prints a warning.
pub fn init_tracing() {
    let filter = filter_directive(std::env::var(LOG_ENV).ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// `trace|debug|info|warn|error` scope to the specgen crates; anything else
/// is taken as a full `EnvFilter` directive.
fn filter_directive(value: Option<&str>) -> String {
    match value {
        Some(level) if is_plain_level(level) => scoped(&level.to_ascii_lowercase()),
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => scoped("info"),
    }
}

fn scoped(level: &str) -> String {
    CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
