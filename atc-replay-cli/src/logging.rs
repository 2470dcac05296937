//! Log capture for the replay view's log pane.
//!
//! Lines are stamped with the game time of the open replay, so a warning can
//! be matched against the timeline.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

const LOG_CAPACITY: usize = 500;
const ECHO_ENV: &str = "ATC_REPLAY_LOG_STDERR";
/// A NaN bit pattern; no cursor value ever stores it.
const NO_GAME_TIME: u64 = u64::MAX;

static GAME_TIME: AtomicU64 = AtomicU64::new(NO_GAME_TIME);

pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

struct SharedLogger {
    level: LevelFilter,
    buffer: LogBuffer,
    echo_stderr: bool,
}

impl Log for SharedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(record.level(), game_time(), record.args());
        if self.echo_stderr {
            eprintln!("{}", line);
        }

        if let Ok(mut buffer) = self.buffer.lock() {
            push_bounded(&mut buffer, line);
        }
    }

    fn flush(&self) {}
}

static LOG_BUFFER: OnceLock<LogBuffer> = OnceLock::new();
static LOGGER: OnceLock<SharedLogger> = OnceLock::new();

/// Stamp subsequent log lines with `time`, or stop stamping with `None`.
pub fn set_game_time(time: Option<f64>) {
    let bits = time
        .filter(|time| time.is_finite())
        .map_or(NO_GAME_TIME, f64::to_bits);
    GAME_TIME.store(bits, Ordering::Relaxed);
}

fn game_time() -> Option<f64> {
    match GAME_TIME.load(Ordering::Relaxed) {
        NO_GAME_TIME => None,
        bits => Some(f64::from_bits(bits)),
    }
}

fn format_line(level: Level, time: Option<f64>, message: impl fmt::Display) -> String {
    match time {
        Some(time) => format!("[{} t={:.1}] {}", level, time, message),
        None => format!("[{}] {}", level, message),
    }
}

fn push_bounded(buffer: &mut VecDeque<String>, line: String) {
    if buffer.len() >= LOG_CAPACITY {
        buffer.pop_front();
    }
    buffer.push_back(line);
}

fn level_from_env(value: Option<&str>) -> LevelFilter {
    match value.map(str::to_lowercase).as_deref() {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Install the process-wide logger and return its line buffer.
pub fn init() -> LogBuffer {
    let buffer = LOG_BUFFER
        .get_or_init(|| Arc::new(Mutex::new(VecDeque::with_capacity(LOG_CAPACITY))))
        .clone();

    let level = level_from_env(std::env::var("RUST_LOG").ok().as_deref());
    let echo_stderr = std::env::var(ECHO_ENV)
        .map(|value| value != "0")
        .unwrap_or(false);

    let logger = SharedLogger {
        level,
        buffer: buffer.clone(),
        echo_stderr,
    };

    let logger_ref = LOGGER.get_or_init(|| logger);
    if log::set_logger(logger_ref).is_ok() {
        log::set_max_level(level);
    }

    buffer
}

pub fn snapshot(buffer: &LogBuffer) -> Vec<String> {
    buffer
        .lock()
        .map(|buffer| buffer.iter().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_drops_oldest_lines() {
        let mut buffer = VecDeque::new();
        for index in 0..LOG_CAPACITY + 3 {
            push_bounded(&mut buffer, format!("line {}", index));
        }
        assert_eq!(buffer.len(), LOG_CAPACITY);
        assert_eq!(buffer.front().map(String::as_str), Some("line 3"));
    }

    #[test]
    fn lines_carry_game_time_when_replaying() {
        assert_eq!(
            format_line(Level::Warn, Some(42.0), "stale tick"),
            "[WARN t=42.0] stale tick"
        );
        assert_eq!(format_line(Level::Info, None, "ready"), "[INFO] ready");
    }

    #[test]
    fn game_time_stamp_can_be_cleared() {
        set_game_time(Some(12.5));
        assert_eq!(game_time(), Some(12.5));
        set_game_time(Some(f64::NAN));
        assert_eq!(game_time(), None);
        set_game_time(None);
        assert_eq!(game_time(), None);
    }

    #[test]
    fn level_parsing_defaults_to_info() {
        assert_eq!(level_from_env(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(level_from_env(Some("warn")), LevelFilter::Warn);
        assert_eq!(level_from_env(Some("atc=trace")), LevelFilter::Info);
        assert_eq!(level_from_env(None), LevelFilter::Info);
    }
}
