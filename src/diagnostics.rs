//! Logging helpers shared by the parser, the model and the CLI.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. `level` accepts any `EnvFilter` directive
/// (`info`, `debug`, `hflow_timeline=trace`, ...).
pub fn init(level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level).with_context(|| format!("invalid log level: {}", level))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Report a recoverable log anomaly.
pub fn warn(msg: impl AsRef<str>) {
    tracing::warn!("{}", msg.as_ref());
}

/// Prefix used for errors raised while reading input files.
pub fn error_message(msg: impl AsRef<str>) -> String {
    format!("hflow-timeline: {}", msg.as_ref())
}
