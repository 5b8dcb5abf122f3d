use std::env;
use log::{self, LevelFilter, Metadata, Record};

/// Environment variable that overrides the log level (`error`..`trace`).
pub const LOG_ENV: &str = "BATTLESHIPS_LOG";

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:>6}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

/// Install the stderr logger. The level comes from `BATTLESHIPS_LOG` when it
/// parses, `default` otherwise. Later calls keep the first logger.
pub fn init_logging(default: LevelFilter) {
    let level = env::var(LOG_ENV)
        .ok()
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(default);
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}
