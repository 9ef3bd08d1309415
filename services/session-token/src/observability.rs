//! Log subscriber and per-request spans.
//!
//! `RUST_LOG` overrides the level from `LOG_LEVEL` entirely. Otherwise our own
//! crates and the HTTP trace layer log at that level and everything else at
//! `warn`.

use axum::body::Body;
use axum::http::{Request, Response};
use std::time::Duration;
use tracing::field::{Empty, display};
use tracing::{Level, Span};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Name attached to startup logs and every request span.
pub const SERVICE_NAME: &str = "session-token-service";

/// Targets that follow `LOG_LEVEL`. The library and the binary log under
/// different crate names.
const SERVICE_TARGETS: [&str; 3] = ["session_token", "session_token_service", "tower_http"];

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging settings taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Level for this service's targets.
    pub level: Level,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Text,
        }
    }
}

impl LogSettings {
    /// Filter directives used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directives(&self) -> String {
        let level = self.level.to_string().to_ascii_lowercase();
        SERVICE_TARGETS
            .iter()
            .fold("warn".to_string(), |acc, target| format!("{acc},{target}={level}"))
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }
}

/// Install the global subscriber. Call once at startup.
///
/// # Errors
///
/// Fails if a global subscriber is already set.
pub fn init(settings: &LogSettings) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(settings.env_filter());
    match settings.format {
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(true)).try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    }
}

/// Span wrapping one HTTP request. Only the path is recorded: the query
/// string never reaches the logs.
pub fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http.request",
        service = SERVICE_NAME,
        http.method = %request.method(),
        http.target = %request.uri().path(),
        http.status_code = Empty,
    )
}

/// Access log line emitted when the response head is ready.
pub fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    let status = response.status().as_u16();
    span.record("http.status_code", display(status));
    tracing::info!(
        http.status = status,
        elapsed_ms = %latency.as_millis(),
        "request handled"
    );
}
