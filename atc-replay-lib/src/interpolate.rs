//! World-state interpolation between bracketing snapshots.

use std::collections::HashMap;

use crate::events::{Aircraft, Snapshot};

/// Compute the aircraft list at `time` from snapshots sorted by game time.
///
/// Before the first snapshot the first one is returned as-is, after the last
/// one the last is returned as-is. In between, every aircraft of the earlier
/// bracketing snapshot is interpolated towards its counterpart in the later
/// one; aircraft missing from the later snapshot are held, aircraft that
/// only appear in the later snapshot are not emitted yet.
pub fn state_at(snapshots: &[&Snapshot], time: f64) -> Vec<Aircraft> {
    if snapshots.is_empty() {
        return Vec::new();
    }
    let time = if time.is_nan() { 0.0 } else { time };

    let (before, after) = bracket(snapshots, time);
    let (before, after) = (snapshots[before], snapshots[after]);

    if std::ptr::eq(before, after)
        || before.aircraft.is_empty()
        || after.aircraft.is_empty()
        || before.game_time == after.game_time
    {
        return before.aircraft.clone();
    }

    let t = (time - before.game_time) / (after.game_time - before.game_time);
    let later: HashMap<&str, &Aircraft> = after
        .aircraft
        .iter()
        .map(|aircraft| (aircraft.callsign.as_str(), aircraft))
        .collect();

    before
        .aircraft
        .iter()
        .map(|from| match later.get(from.callsign.as_str()) {
            Some(to) => interpolate_aircraft(from, to, t),
            None => from.clone(),
        })
        .collect()
}

/// Indices of the `(before, after)` snapshots bracketing `time`.
///
/// `before` is the last snapshot at or before `time` (the first snapshot if
/// none is), `after` the first snapshot at or after `time` no earlier than
/// `before` (`before` itself if none is).
pub fn bracket(snapshots: &[&Snapshot], time: f64) -> (usize, usize) {
    let before = snapshots
        .partition_point(|snapshot| snapshot.game_time <= time)
        .saturating_sub(1);
    let after = before
        + snapshots[before..].partition_point(|snapshot| snapshot.game_time < time);
    if after >= snapshots.len() {
        (before, before)
    } else {
        (before, after)
    }
}

fn interpolate_aircraft(from: &Aircraft, to: &Aircraft, t: f64) -> Aircraft {
    Aircraft {
        callsign: from.callsign.clone(),
        position: (
            lerp(from.position.0, to.position.0, t),
            lerp(from.position.1, to.position.1, t),
        ),
        altitude: lerp(from.altitude, to.altitude, t),
        heading: interpolate_heading(from.heading, to.heading, t),
        speed: lerp(from.speed, to.speed, t),
        phase: from.phase.clone(),
    }
}

/// Linear interpolation from `a` to `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolate a heading along the shortest arc, result in `[0, 360)`.
pub fn interpolate_heading(from: f64, to: f64, t: f64) -> f64 {
    let mut delta = to - from;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    let heading = (from + delta * t + 360.0).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if heading >= 360.0 {
        0.0
    } else {
        heading
    }
}
