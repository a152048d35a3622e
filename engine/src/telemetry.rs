//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` for structured logging. The level comes from
//! `RUST_LOG` when set, then the configured level, then `info`. Debug builds
//! log pretty-printed lines; release builds log JSON so the webhook's output
//! can be shipped to a log pipeline as-is.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a level: the level applies to dependencies and the engine alike
fn default_filter(log_level: &str) -> String {
    format!("{},persona_engine={}", log_level, log_level)
}

/// Initialize the tracing subscriber with the given log level from config.
///
/// Only the first call installs a subscriber; later calls are ignored.
pub fn init_telemetry_with_level(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(false))
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_scopes_engine() {
        assert_eq!(default_filter("debug"), "debug,persona_engine=debug");
    }
}
