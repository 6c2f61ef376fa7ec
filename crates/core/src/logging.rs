//! Tracing setup.
//!
//! Logs always go to stderr; stdout carries command output only. The server
//! can switch to one JSON object per line for log collectors.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, coloured when allowed
    #[default]
    Pretty,
    Json,
}

/// Install the global subscriber with human-readable output.
///
/// `log_level` takes any `EnvFilter` directive (e.g. `"debug"` or
/// `"lectern_retrieval=trace,info"`); without it `RUST_LOG` is used, then `info`.
///
/// # Example
/// ```no_run
/// use lectern_core::logging::init_logging;
///
/// init_logging(None, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> AppResult<()> {
    init_logging_as(LogFormat::Pretty, log_level, no_color)
}

/// Install the global subscriber in the given format. Fails if one is already set.
pub fn init_logging_as(format: LogFormat, log_level: Option<&str>, no_color: bool) -> AppResult<()> {
    let filter = build_filter(log_level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(use_color(no_color)),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
    };

    installed.map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))
}

/// Explicit level, then `RUST_LOG`, then `info`.
fn build_filter(log_level: Option<&str>) -> AppResult<EnvFilter> {
    let directive = match log_level {
        Some(level) => level.to_string(),
        None => std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
    };

    EnvFilter::try_new(&directive)
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", directive, e)))
}

fn use_color(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none()
}
