#![forbid(unsafe_code)]

//! Subscriber setup for binaries and harnesses.
//!
//! Widgets only emit `tracing` events; installing a subscriber is the host's
//! job. This helper covers the common case: an `EnvFilter` read from
//! `RUST_LOG` (falling back to `default_directive`) with either the
//! human-readable or the JSON formatter.

use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install a global subscriber. Returns `false` if one was already set.
pub fn init(format: LogFormat, default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}
