use std::time::Duration;

use crate::constants::{DEFAULT_FRAME_INTERVAL, DEFAULT_SEEK_STEP, DEFAULT_SPEED};

/// Tunables for a replay view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    /// Delay between two clock ticks.
    pub frame_interval: Duration,
    /// Game seconds covered by one seek-backward/forward input.
    pub seek_step: f64,
    /// Playback multiplier a new view starts with.
    pub initial_speed: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            seek_step: DEFAULT_SEEK_STEP,
            initial_speed: DEFAULT_SPEED,
        }
    }
}

impl PlaybackSettings {
    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    pub fn with_seek_step(mut self, seek_step: f64) -> Self {
        self.seek_step = seek_step.abs();
        self
    }

    pub fn with_initial_speed(mut self, speed: f64) -> Self {
        self.initial_speed = speed;
        self
    }
}
