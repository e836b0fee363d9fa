//! Utilities: logging setup.
//!
//! Logs always go to stderr; stdout belongs to the MCP stream (serve) or to
//! command output (tools / call).
//!
//! Key items:
//!   derive_level  (-v / -vv / -q  ->  level filter)
//!   init_logging  (tracing-subscriber fmt layer, RUST_LOG overrides)

use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt};

/// Map CLI verbosity flags to a level. Quiet wins over verbose.
pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. Calling twice is harmless (second call is ignored).
pub fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
