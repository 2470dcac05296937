//! Immutable per-session event store with typed views.

use log::{debug, info};
use serde_json::Value;

use crate::error::ReplayResult;
use crate::events::{
    parse_event, Aircraft, Conflict, Decision, Event, IlsClearance, Landing, Outcome, SessionEnd,
    SessionStart, Snapshot,
};
use crate::interpolate;
use crate::timeline::{self, Marker};

/// The ordered event list of one session.
///
/// Construction validates every event; a store therefore never holds partial
/// data. Derived data (the time-sorted snapshot index and the timeline
/// markers) is built here once and dropped together with the store, so a
/// reload can never observe stale derivations.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
    /// Indices into `events` of every snapshot, stably sorted by game time.
    snapshot_order: Vec<usize>,
    markers: Vec<Marker>,
    max_time: f64,
}

impl EventStore {
    /// Validate and load a session's raw events.
    ///
    /// # Errors
    /// Returns [`crate::ReplayError::MalformedEvent`] for the first event that
    /// fails validation. Nothing is kept from a failed load.
    pub fn load(raw_events: &[Value]) -> ReplayResult<Self> {
        let events = raw_events
            .iter()
            .enumerate()
            .map(|(index, value)| parse_event(index, value))
            .collect::<ReplayResult<Vec<_>>>()?;

        Ok(Self::from_events(events))
    }

    /// Build a store from already-typed events.
    pub fn from_events(events: Vec<Event>) -> Self {
        let max_time = events
            .iter()
            .filter_map(Event::game_time)
            .fold(0.0_f64, f64::max);

        let mut snapshot_order: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, event)| matches!(event, Event::Snapshot(_)))
            .map(|(index, _)| index)
            .collect();
        snapshot_order.sort_by(|a, b| {
            let (a, b) = (events[*a].game_time(), events[*b].game_time());
            a.unwrap_or_default().total_cmp(&b.unwrap_or_default())
        });

        let markers = timeline::build_markers(&events);

        info!(
            "Loaded {} events ({} snapshots, {} markers), max time {:.1}s",
            events.len(),
            snapshot_order.len(),
            markers.len(),
            max_time
        );

        Self {
            events,
            snapshot_order,
            markers,
            max_time,
        }
    }

    /// Number of events in the session.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Largest game time across all events, or 0 for an empty log.
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// All events in log order.
    pub fn events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }

    /// Snapshots in log order.
    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Snapshot(snapshot) => Some(snapshot),
            _ => None,
        })
    }

    /// Snapshots ordered by game time; ties keep log order.
    pub fn snapshots_by_time(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        self.snapshot_order
            .iter()
            .filter_map(|index| match &self.events[*index] {
                Event::Snapshot(snapshot) => Some(snapshot),
                _ => None,
            })
    }

    pub fn decisions(&self) -> impl Iterator<Item = &Decision> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Decision(decision) => Some(decision),
            _ => None,
        })
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Outcome(outcome) => Some(outcome),
            _ => None,
        })
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &Conflict> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Conflict(conflict) => Some(conflict),
            _ => None,
        })
    }

    pub fn ils_clearances(&self) -> impl Iterator<Item = &IlsClearance> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::IlsClearance(clearance) => Some(clearance),
            _ => None,
        })
    }

    pub fn landings(&self) -> impl Iterator<Item = &Landing> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::Landing(landing) => Some(landing),
            _ => None,
        })
    }

    /// First `session_start` in the log.
    pub fn session_start(&self) -> Option<&SessionStart> {
        self.events.iter().find_map(|event| match event {
            Event::SessionStart(start) => Some(start),
            _ => None,
        })
    }

    /// Last `session_end` in the log.
    pub fn session_end(&self) -> Option<&SessionEnd> {
        self.events.iter().rev().find_map(|event| match event {
            Event::SessionEnd(end) => Some(end),
            _ => None,
        })
    }

    /// Timeline markers, ascending by time.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Interpolated aircraft state at `time`.
    pub fn state_at(&self, time: f64) -> Vec<Aircraft> {
        let snapshots: Vec<&Snapshot> = self.snapshots_by_time().collect();
        let aircraft = interpolate::state_at(&snapshots, time);
        debug!("state_at({:.2}) -> {} aircraft", time, aircraft.len());
        aircraft
    }
}
