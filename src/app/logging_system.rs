use super::config::{LogFormat, LogLevel};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Crates whose debug output drowns the forwarder's own lines.
const QUIET_TARGETS: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "rustls",
    "h2",
    "aws_config",
    "aws_smithy_runtime",
];

/// Filter string: default level first, then the quiet targets at `warn`.
pub fn build_filter_string(default_level: LogLevel) -> String {
    let mut parts = Vec::with_capacity(QUIET_TARGETS.len() + 1);
    parts.push(default_level.as_str().to_string());
    for target in QUIET_TARGETS {
        parts.push(format!("{target}=warn"));
    }
    parts.join(",")
}

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// Returns `false` when a subscriber was already installed (tests, embedding
/// hosts); that is not an error.
pub fn setup_logging_safe(default_level: LogLevel, format: LogFormat) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(build_filter_string(default_level)))
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().with_target(true).compact())
            .try_init(),
    };

    installed.is_ok()
}
