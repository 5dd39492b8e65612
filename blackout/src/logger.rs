// blackout/src/logger.rs
//! Logger initialization for the blackout CLI.
//!
//! Logging is configured from `RUST_LOG` by default; the `--quiet` and
//! `--debug` flags override it for the run.

use log::LevelFilter;

/// Initializes the global `env_logger` instance.
///
/// Safe to call more than once (later calls are no-ops), which keeps
/// integration tests from panicking when they exercise the binary twice.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    let _ = builder.format_timestamp_secs().try_init();
}
