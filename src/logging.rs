//! Logging setup.
//!
//! Logs go to **stderr**; stdout carries only the handshake line the host
//! reads to find the server.
//!
//! The filter comes from `PIPES_PROVIDER_LOG`, then `RUST_LOG`, then the
//! default level (`info`):
//!
//! ```bash
//! PIPES_PROVIDER_LOG=pipes_provider=debug ./pipes-provider
//! RUST_LOG=debug ./pipes-provider
//! ```

use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt, EnvFilter};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "PIPES_PROVIDER_LOG";

const DEFAULT_LEVEL: &str = "info";

/// Initialize the global subscriber at the default level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LEVEL);
}

/// Like [`init_logging`], with a custom level used when no filter variable is set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Try to initialize logging; returns false if a subscriber is already set.
pub fn try_init_logging() -> bool {
    subscriber(DEFAULT_LEVEL).try_init().is_ok()
}

fn subscriber(default_level: &str) -> impl SubscriberInitExt {
    let directives = [LOG_ENV, EnvFilter::DEFAULT_ENV]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()));

    tracing_subscriber::registry()
        .with(build_filter(directives.as_deref(), default_level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
}

/// Parse filter directives, falling back to `default_level` when they are absent or invalid.
fn build_filter(directives: Option<&str>, default_level: &str) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process.

    use super::*;

    #[test]
    fn test_directives_parse() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("pipes_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,pipes_provider::api=trace").is_ok());
    }

    #[test]
    fn test_build_filter_uses_directives() {
        let filter = build_filter(Some("pipes_provider=debug"), "info");
        assert_eq!(filter.to_string(), "pipes_provider=debug");
    }

    #[test]
    fn test_build_filter_falls_back_to_default() {
        assert_eq!(build_filter(None, "warn").to_string(), "warn");
        assert_eq!(build_filter(Some("[[invalid"), "info").to_string(), "info");
    }

    #[test]
    fn test_try_init_logging_only_installs_once() {
        try_init_logging();
        assert!(!try_init_logging());
    }
}
