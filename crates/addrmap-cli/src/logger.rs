//! Stderr sink for the `log` facade.

use std::str::FromStr;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable that overrides the verbosity flags.
pub const LOG_ENV: &str = "ADDRMAP_LOG";

/// Writes `level: message` lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{}: {}",
                record.level().as_str().to_ascii_lowercase(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

/// Picks the log level from `-v` occurrences, unless `env_override`
/// names a valid level.
#[must_use]
pub fn level_for(verbosity: u8, env_override: Option<&str>) -> LevelFilter {
    if let Some(level) = env_override.and_then(|value| LevelFilter::from_str(value.trim()).ok()) {
        return level;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the stderr logger at `level`.
///
/// # Errors
///
/// Fails when another logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
