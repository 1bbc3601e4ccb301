//! Console backend for the [`log`] crate's facade.
//!
//! Each record carries its level, the uptime since the logger was
//! installed, the module that produced it, and the message:
//!
//! ```text
//! INFO [2s 123ms] gimbal_rs::gimbal - gimbal initialized at yaw 1.571 rad, pitch 0.785 rad
//! WARN [5s 2ms] gimbal_rs::indicator - yaw motor offline
//! ```

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use humantime::format_duration;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

pub struct ConsoleLogger {
    start: Instant,
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // whole milliseconds keep the stamp readable
            let uptime = Duration::from_millis(self.start.elapsed().as_millis() as u64);
            println!(
                "{} [{}] {} - {}",
                record.level(),
                format_duration(uptime),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

/// Installs the console logger. Call once at startup, before any logging
/// macro runs.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| ConsoleLogger {
        start: Instant::now(),
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}
