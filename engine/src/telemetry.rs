//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` for structured logging. Log output goes to
//! stderr so the conversation on stdout stays clean.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, compact lines
    #[default]
    Compact,
    /// One JSON object per event, with the current span
    Json,
}

/// Build the filter directive for a level.
///
/// Dependencies are held at `warn` so HTTP client chatter does not bury the
/// engine's own events.
fn filter_directive(log_level: &str) -> String {
    format!("warn,oopsie_engine={0},oopsie={0}", log_level)
}

/// Initialize the tracing subscriber with the given log level from config.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter
pub fn init_telemetry_with_level(log_level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));

    match format {
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .ok();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .ok();
        }
    }
}

/// Initialize the tracing subscriber with default settings.
///
/// Debug builds log compactly, release builds log JSON.
pub fn init_telemetry(log_level: &str) {
    let format = if cfg!(debug_assertions) {
        LogFormat::Compact
    } else {
        LogFormat::Json
    };
    init_telemetry_with_level(log_level, format);
}
