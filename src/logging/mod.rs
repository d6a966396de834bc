//! Logging setup
//!
//! Lines are written in logcat style, `D/<tag>(<thread>): message`, where the
//! tag is the log target. Pipeline stages log under their own tag by passing
//! `target:` to the `log` macros.

use std::io::Write;

use env_logger::{fmt::Formatter, Builder, Env};
use log::{Level, Record};

use crate::{
    config,
    core::{ErrorContext, StreamResult},
};

fn level_letter(level: Level) -> char {
    match level {
        Level::Error => 'E',
        Level::Warn => 'W',
        Level::Info => 'I',
        Level::Debug => 'D',
        Level::Trace => 'V',
    }
}

fn format_record(buf: &mut Formatter, record: &Record<'_>) -> std::io::Result<()> {
    let thread = std::thread::current();
    writeln!(
        buf,
        "{}/{}({}): {}",
        level_letter(record.level()),
        record.target(),
        thread.name().unwrap_or("unnamed"),
        record.args()
    )
}

/// Install the global logger. `RUST_LOG` still applies on top of the
/// configured level.
pub fn init_logger(config: &config::Log) -> StreamResult<()> {
    Builder::new()
        .filter(None, config.level.into())
        .parse_env(Env::default())
        .format(format_record)
        .try_init()
        .with_context("Failed to initialize logger")
}
