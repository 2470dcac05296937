//! Timeline markers for scrubber annotation.

use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Conflict,
    Ils,
}

impl MarkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Conflict => "conflict",
            MarkerKind::Ils => "ils",
        }
    }
}

/// A notable moment on the session timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub time: f64,
    pub kind: MarkerKind,
    pub label: String,
}

impl Marker {
    /// Position of the marker along a scrubber track, in `[0, 1]`.
    pub fn fraction(&self, max_time: f64) -> f64 {
        if max_time <= 0.0 {
            return 0.0;
        }
        (self.time / max_time).clamp(0.0, 1.0)
    }
}

/// Extract markers from conflicts and ILS clearances, sorted by time.
///
/// Equal times keep a deterministic order: conflicts first, then
/// clearances, each in log order.
pub fn build_markers(events: &[Event]) -> Vec<Marker> {
    let conflicts = events.iter().filter_map(|event| match event {
        Event::Conflict(conflict) => Some(Marker {
            time: conflict.game_time,
            kind: MarkerKind::Conflict,
            label: format!(
                "{}/{} {:.1}nm < {:.1}nm",
                conflict.aircraft1,
                conflict.aircraft2,
                conflict.separation_nm,
                conflict.required_nm
            ),
        }),
        _ => None,
    });
    let clearances = events.iter().filter_map(|event| match event {
        Event::IlsClearance(clearance) => Some(Marker {
            time: clearance.game_time,
            kind: MarkerKind::Ils,
            label: format!("{} ILS {}", clearance.callsign, clearance.runway),
        }),
        _ => None,
    });

    let mut markers: Vec<Marker> = conflicts.chain(clearances).collect();
    // sort_by is stable
    markers.sort_by(|a, b| a.time.total_cmp(&b.time));
    markers
}

/// First marker strictly after `time`.
pub fn next_marker(markers: &[Marker], time: f64) -> Option<&Marker> {
    let index = markers.partition_point(|marker| marker.time <= time);
    markers.get(index)
}

/// Last marker strictly before `time`.
pub fn previous_marker(markers: &[Marker], time: f64) -> Option<&Marker> {
    let index = markers.partition_point(|marker| marker.time < time);
    index.checked_sub(1).and_then(|index| markers.get(index))
}
