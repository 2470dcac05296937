//! Shared constants for playback and transport defaults.

use std::time::Duration;

/// Slowest allowed playback multiplier.
pub const MIN_SPEED: f64 = 0.5;

/// Fastest allowed playback multiplier.
pub const MAX_SPEED: f64 = 10.0;

/// Default playback multiplier.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Distance (game seconds) covered by a single seek-backward/forward input.
pub const DEFAULT_SEEK_STEP: f64 = 5.0;

/// Delay between two clock ticks, roughly one frame at 60 fps.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);
