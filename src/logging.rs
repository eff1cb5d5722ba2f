//! `tracing` setup for the sidecar.
//!
//! Stdout carries the protocol, so every event goes to stderr.

use tracing_subscriber::{fmt, EnvFilter};

use crate::settings::Settings;

fn build_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

pub fn init(settings: &Settings) -> anyhow::Result<()> {
    fmt()
        .with_env_filter(build_filter(&settings.log_filter))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("init logging: {e}"))
}

/// Routes events to the test harness; safe to call from every test.
pub fn init_test_logging() {
    let _ = fmt()
        .with_env_filter(build_filter("debug"))
        .with_test_writer()
        .try_init();
}
