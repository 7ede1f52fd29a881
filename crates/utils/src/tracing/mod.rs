use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use voketag_core::VOKETAG_LOG_VAR;

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

/// Initialize the tracing system
///
/// The filter comes from `VOKETAG_LOG`, then `RUST_LOG`, then defaults to
/// `info`. Output goes to stderr so command output on stdout stays pipeable;
/// ANSI colors are only used on a TTY.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = std::env::var(VOKETAG_LOG_VAR)
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .map_or_else(|| EnvFilter::try_new("info"), Ok)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Span covering one batch workflow run
pub fn batch_span(batch_id: &str) -> Span {
    span!(Level::INFO, "batch", batch_id = %batch_id)
}

/// Span covering one HTTP call
pub fn request_span(method: &str, url: &str) -> Span {
    span!(Level::DEBUG, "request", method = %method, url = %url)
}
