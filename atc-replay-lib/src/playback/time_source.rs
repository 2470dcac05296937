//! Injectable monotonic time sources.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic wall-clock time, measured from an arbitrary origin.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Real time, backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced time. Clones share the same underlying instant, so a test
/// can keep one handle and give another to the clock under test.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<Duration>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    /// Move time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    pub fn advance_secs(&self, seconds: f64) {
        self.advance(Duration::from_secs_f64(seconds.max(0.0)));
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clones_share_time() {
        let source = ManualTimeSource::new();
        let handle = source.clone();
        handle.advance(Duration::from_millis(250));
        assert_eq!(source.now(), Duration::from_millis(250));
        handle.set(Duration::from_secs(3));
        assert_eq!(source.now(), Duration::from_secs(3));
    }

    #[test]
    fn system_time_is_monotonic() {
        let source = SystemTimeSource::new();
        let first = source.now();
        let second = source.now();
        assert!(second >= first);
    }
}
