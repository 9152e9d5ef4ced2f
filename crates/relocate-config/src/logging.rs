//! Centralized logging initialization with environment variable support

use crate::{AppConfig, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Format requested through `LOG_FORMAT`, if any
fn format_override() -> Option<LogFormat> {
    std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|f| match f.to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "human" => Some(LogFormat::Pretty),
            _ => None,
        })
}

/// Initialize the tracing subscriber
///
/// Environment variables (in priority order):
/// - `RUST_LOG`: Standard Rust log filter (takes precedence over all)
/// - `LOG_LEVEL`: Set log level (trace, debug, info, warn, error)
/// - `LOG_FORMAT`: Override format (json, pretty)
///
/// ```bash
/// LOG_LEVEL=debug relocate src/a.js src/b.js
/// RUST_LOG=relocate_core=debug relocate src/a.js lib/
/// ```
///
/// Logs always go to stderr so `--format json` output on stdout stays clean.
/// Calling this twice is harmless: the second subscriber is not installed.
pub fn initialize(config: &AppConfig) {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .unwrap_or_else(|| config.logging.level.clone());
    let log_level = level.parse().unwrap_or(tracing::Level::WARN);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(log_level.into()));

    let format = format_override().unwrap_or(config.logging.format);

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
