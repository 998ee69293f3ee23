//! Console and file logger behind the [`log`] facade.
//!
//! Every record is written as one line to stdout and to `log.txt` in the
//! working directory (the SD card root on the brain):
//!
//! ```text
//! INFO [12s 340ms] aviator::auton::script - step 3: Forward { inches: 23.0, max: 95.0 }
//! WARN [14s 2ms] aviator::motion::executor - forward timed out after 500 ticks
//! ```
//!
//! The file is truncated at [`init`]. Without an SD card the logger quietly
//! falls back to console output only.

use std::{
    fmt,
    fs::OpenOptions,
    io::{BufWriter, Write},
    sync::{Mutex, OnceLock},
    time::Duration,
};

use humantime::format_duration;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

const LOG_FILE: &str = "log.txt";

/// Writes log records to the console and `log.txt`.
pub struct RobotLogger {
    /// `None` when the file could not be opened.
    file_writer: Mutex<Option<BufWriter<std::fs::File>>>,
}

impl RobotLogger {
    fn new() -> Self {
        let file_writer = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(LOG_FILE)
            .ok()
            .map(BufWriter::new);

        Self {
            file_writer: Mutex::new(file_writer),
        }
    }
}

impl log::Log for RobotLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), uptime(), record.target(), record.args());
        print!("{line}");

        if let Ok(mut guard) = self.file_writer.lock()
            && let Some(writer) = guard.as_mut()
        {
            let _ = writer.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file_writer.lock()
            && let Some(writer) = guard.as_mut()
        {
            let _ = writer.flush();
        }
    }
}

static LOGGER: OnceLock<RobotLogger> = OnceLock::new();

/// Installs [`RobotLogger`] as the global logger, recording `level` and
/// above.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(RobotLogger::new);
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

fn format_line(level: Level, uptime: Duration, target: &str, args: &fmt::Arguments<'_>) -> String {
    // Sub-millisecond digits are noise at a 10 ms control tick.
    let uptime = Duration::from_millis(uptime.as_millis() as u64);
    format!("{} [{}] {} - {}\n", level, format_duration(uptime), target, args)
}

#[cfg(feature = "v5")]
fn uptime() -> Duration { vexide::time::user_uptime() }

#[cfg(not(feature = "v5"))]
fn uptime() -> Duration {
    static START: OnceLock<std::time::Instant> = OnceLock::new();
    START.get_or_init(std::time::Instant::now).elapsed()
}
