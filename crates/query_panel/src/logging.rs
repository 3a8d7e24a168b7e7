//! tracing subscriber setup for the binary. Logs go to stderr so stdout
//! stays reserved for the answer display.

use tracing::Level;

/// Environment variable overriding `logging.level`.
pub const LOG_ENV: &str = "QUERY_PANEL_LOG";

/// Resolve the log level: `QUERY_PANEL_LOG`, then the configured level, then `warn`.
/// Unrecognised values fall through to the next source.
pub fn resolve_level(configured: Option<&str>) -> Level {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .or_else(|| configured.and_then(|v| v.parse().ok()))
        .unwrap_or(Level::WARN)
}

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
