//! Span helpers shared by the runtime and the CLI

/// Create the span that wraps one submitted turn
///
/// The `error`, `error.message` and `duration_ms` fields start empty and are
/// filled by [`record_error`] and [`record_duration`] while the span is current.
///
/// # Example
///
/// ```rust
/// use headline_observability::session_span;
///
/// let span = session_span!("5f1c", "volcano", "DeepSeek-V3");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! session_span {
    ($session_id:expr, $provider:expr, $model:expr) => {
        tracing::info_span!(
            "session.submit",
            session.id = $session_id,
            provider = $provider,
            model = $model,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    };
}

/// Record an error on the current span and log it
pub fn record_error<E: std::error::Error>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
    tracing::error!(error = %error, "Operation failed");
}

/// Record a duration in milliseconds on the current span
///
/// ```rust
/// use headline_observability::record_duration;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// record_duration("duration_ms", start.elapsed());
/// ```
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}
