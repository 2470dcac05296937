//! Virtual playback clock.
//!
//! Advances a game-time cursor by real elapsed time scaled by a speed
//! multiplier, clamped to the session's bounds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::debug;

use super::time_source::{SystemTimeSource, TimeSource};
use crate::constants::{DEFAULT_FRAME_INTERVAL, DEFAULT_SPEED, MAX_SPEED, MIN_SPEED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Observable playback state of one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    /// Game time, always within `[0, max_time]`.
    pub cursor: f64,
    pub playing: bool,
    /// Always within `[MIN_SPEED, MAX_SPEED]`.
    pub speed_multiplier: f64,
    /// Wall-clock instant of the last advance while running.
    pub last_tick_wallclock: Option<Duration>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            cursor: 0.0,
            playing: false,
            speed_multiplier: DEFAULT_SPEED,
            last_tick_wallclock: None,
        }
    }
}

/// Permission to run one scheduled tick.
///
/// Only the most recently issued token of the issuing clock is honoured;
/// any other is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    owner: u64,
    generation: u64,
    due: Duration,
}

impl TickToken {
    /// Wall-clock time at which the tick should run.
    pub fn due(&self) -> Duration {
        self.due
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The cursor advanced and the next tick is scheduled.
    Rescheduled(TickToken),
    /// The cursor reached the end of the session and the clock stopped.
    Finished,
    /// The token was cancelled or superseded; nothing changed.
    Stale,
}

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct PlaybackClock<T: TimeSource = SystemTimeSource> {
    /// Process-unique id stamped on every token this clock issues.
    owner: u64,
    source: T,
    state: PlaybackState,
    max_time: f64,
    frame_interval: Duration,
    generation: u64,
    pending: Option<TickToken>,
}

impl<T: TimeSource> PlaybackClock<T> {
    /// Create a stopped clock at cursor 0 over `[0, max_time]`.
    pub fn new(source: T, max_time: f64) -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            source,
            state: PlaybackState::default(),
            max_time: sanitize_max_time(max_time),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            generation: 0,
            pending: None,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    pub fn cursor(&self) -> f64 {
        self.state.cursor
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn speed(&self) -> f64 {
        self.state.speed_multiplier
    }

    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    pub fn clock_state(&self) -> ClockState {
        if self.state.playing {
            ClockState::Running
        } else {
            ClockState::Stopped
        }
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.state
    }

    /// The outstanding tick, if one is scheduled.
    pub fn pending_tick(&self) -> Option<TickToken> {
        self.pending
    }

    /// Cursor position as a fraction of the session, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.max_time <= 0.0 {
            return 0.0;
        }
        (self.state.cursor / self.max_time).clamp(0.0, 1.0)
    }

    /// Start playback and schedule the first tick.
    ///
    /// Inert on an empty session. Starting from the end rewinds to 0.
    /// Calling this while running returns the already pending tick.
    pub fn play(&mut self) -> Option<TickToken> {
        if self.state.playing {
            return self.pending;
        }
        if self.max_time <= 0.0 {
            debug!("Ignoring play on an empty session");
            return None;
        }
        if self.state.cursor >= self.max_time {
            self.state.cursor = 0.0;
        }

        let now = self.source.now();
        self.state.playing = true;
        self.state.last_tick_wallclock = Some(now);
        Some(self.schedule(now))
    }

    /// Stop playback and cancel the pending tick.
    pub fn pause(&mut self) {
        self.cancel();
        self.state.playing = false;
        self.state.last_tick_wallclock = None;
    }

    /// Play if stopped, pause if running.
    pub fn toggle(&mut self) -> Option<TickToken> {
        if self.state.playing {
            self.pause();
            None
        } else {
            self.play()
        }
    }

    /// Run a scheduled tick.
    ///
    /// Advances the cursor by the real time elapsed since the previous tick
    /// multiplied by the current speed. Stale tokens change nothing.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        if token.owner != self.owner || self.pending != Some(token) || !self.state.playing {
            debug!("Dropping stale tick {}", token.generation);
            return TickOutcome::Stale;
        }
        self.pending = None;

        let now = self.source.now();
        let last = self.state.last_tick_wallclock.unwrap_or(now);
        let elapsed = now.saturating_sub(last).as_secs_f64();
        self.state.cursor =
            (self.state.cursor + elapsed * self.state.speed_multiplier).min(self.max_time);
        self.state.last_tick_wallclock = Some(now);

        if self.state.cursor >= self.max_time {
            self.state.cursor = self.max_time;
            self.state.playing = false;
            self.state.last_tick_wallclock = None;
            debug!("Reached end of session at {:.2}", self.max_time);
            return TickOutcome::Finished;
        }

        TickOutcome::Rescheduled(self.schedule(now))
    }

    /// Move the cursor, clamped into `[0, max_time]`. Playing state is kept.
    pub fn seek(&mut self, time: f64) {
        if time.is_nan() {
            return;
        }
        self.state.cursor = time.clamp(0.0, self.max_time);
    }

    /// Change the speed multiplier, clamped into `[MIN_SPEED, MAX_SPEED]`.
    ///
    /// Takes effect on the next tick.
    pub fn set_speed(&mut self, speed: f64) {
        if !speed.is_finite() {
            return;
        }
        self.state.speed_multiplier = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Stop, rewind to 0 and adopt new session bounds. Speed is kept.
    pub fn reset(&mut self, max_time: f64) {
        self.pause();
        self.state.cursor = 0.0;
        self.max_time = sanitize_max_time(max_time);
    }

    /// Invalidate the outstanding tick without changing playback state.
    pub(crate) fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
    }

    fn schedule(&mut self, now: Duration) -> TickToken {
        self.generation = self.generation.wrapping_add(1);
        let token = TickToken {
            owner: self.owner,
            generation: self.generation,
            due: now + self.frame_interval,
        };
        self.pending = Some(token);
        token
    }
}

impl<T: TimeSource> Drop for PlaybackClock<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn sanitize_max_time(max_time: f64) -> f64 {
    if max_time.is_finite() {
        max_time.max(0.0)
    } else {
        0.0
    }
}
