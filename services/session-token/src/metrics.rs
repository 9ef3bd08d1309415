//! Prometheus metrics for the session token service.

use once_cell::sync::Lazy;
use prometheus::{
    CounterVec, Encoder, HistogramVec, IntCounter, TextEncoder, register_counter_vec,
    register_histogram_vec, register_int_counter,
};

/// Tokens issued by sign-in or refresh.
pub static TOKENS_ISSUED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "session_token_tokens_issued_total",
        "Total number of session tokens issued"
    )
    .expect("Failed to register tokens_issued metric")
});

/// Refresh decisions by outcome.
pub static TOKENS_REFRESHED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_refresh_total",
        "Refresh attempts by outcome",
        &["status"]
    )
    .expect("Failed to register refresh metric")
});

/// Validation results by outcome.
pub static TOKEN_VALIDATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_validations_total",
        "Token validations by outcome",
        &["result"]
    )
    .expect("Failed to register validations metric")
});

/// Sign-in attempts by outcome.
pub static SIGNIN_ATTEMPTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_signin_total",
        "Sign-in attempts by outcome",
        &["result"]
    )
    .expect("Failed to register signin metric")
});

/// HTTP handler latency.
pub static HTTP_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "session_token_http_latency_seconds",
        "HTTP handler latency in seconds",
        &["route"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register http_latency metric")
});

/// Render every registered metric in the text exposition format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn render() -> Result<String, prometheus::Error> {
    let families = prometheus::gather();
    let mut buf = Vec::new();
    TextEncoder::new().encode(&families, &mut buf)?;
    String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
