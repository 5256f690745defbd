//! Logging setup for the CLI.
//!
//! Uses the `log` facade with an `env_logger` backend. The effective level
//! is chosen, in priority order, from the `RUST_LOG` environment variable,
//! the `--quiet` flag (errors only), or the `-v` count (debug, then trace);
//! the default is warnings. Library code only ever logs through the facade.

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize the logging subsystem from CLI verbosity flags.
///
/// Call once, before the first log statement. `RUST_LOG` takes precedence
/// over both flags when set.
///
/// # Panics
///
/// Panics if called twice; `env_logger` initializes once per process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(level_for(verbose, quiet));
    }

    // Release builds keep the output compact; debug builds carry the
    // timestamp and module for diagnosis.
    if cfg!(debug_assertions) {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{:<5} {}", record.level(), record.args()));
    }

    builder.init();
}

/// Map CLI flags to a level filter.
fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
