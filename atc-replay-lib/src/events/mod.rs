//! Event model for recorded agent sessions.
//!
//! Raw session logs are heterogeneous JSON records tagged by `event_type`.
//! They are converted exactly once, at load, into the closed [`Event`] sum
//! type; everything downstream matches on variants instead of probing
//! fields.

use serde::{Deserialize, Serialize};

mod parse;

pub use parse::parse_event;

/// Every event kind the replay engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SessionStart,
    SessionEnd,
    StateSnapshot,
    Decision,
    Outcome,
    Conflict,
    IlsClearance,
    Landing,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::SessionStart,
        EventKind::SessionEnd,
        EventKind::StateSnapshot,
        EventKind::Decision,
        EventKind::Outcome,
        EventKind::Conflict,
        EventKind::IlsClearance,
        EventKind::Landing,
    ];

    /// Look up a kind by its wire name (`"state_snapshot"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SessionStart => "session_start",
            EventKind::SessionEnd => "session_end",
            EventKind::StateSnapshot => "state_snapshot",
            EventKind::Decision => "decision",
            EventKind::Outcome => "outcome",
            EventKind::Conflict => "conflict",
            EventKind::IlsClearance => "ils_clearance",
            EventKind::Landing => "landing",
        }
    }

    /// Whether events of this kind must carry a numeric `game_time`.
    pub fn requires_game_time(&self) -> bool {
        matches!(
            self,
            EventKind::StateSnapshot
                | EventKind::Decision
                | EventKind::Conflict
                | EventKind::IlsClearance
                | EventKind::Landing
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single aircraft as captured in a world-state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub callsign: String,
    /// Session-local planar coordinates `(x, y)`.
    pub position: (f64, f64),
    /// Feet.
    pub altitude: f64,
    /// Degrees in `[0, 360)`.
    pub heading: f64,
    /// Knots.
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

/// Full world state at one instant of game time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub game_time: f64,
    #[serde(default)]
    pub aircraft: Vec<Aircraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A command the agent decided to issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub game_time: f64,
    #[serde(default)]
    pub callsign: String,
    #[serde(default)]
    pub command_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_value: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "parse::string_or_number")]
    pub correlation_id: Option<String>,
}

impl Decision {
    /// Human-readable command, e.g. `"ALTITUDE 4000"`.
    pub fn command_text(&self) -> String {
        let value = match &self.command_value {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        };
        format!("{} {}", self.command_type.to_uppercase(), value)
            .trim()
            .to_string()
    }
}

/// Result of executing a [`Decision`], linked by `correlation_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_time: Option<f64>,
    #[serde(default, deserialize_with = "parse::string_or_number")]
    pub correlation_id: Option<String>,
    /// `None` when the executor did not report a result.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Loss of separation between two aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub game_time: f64,
    #[serde(default)]
    pub aircraft1: String,
    #[serde(default)]
    pub aircraft2: String,
    #[serde(default)]
    pub separation_nm: f64,
    #[serde(default)]
    pub required_nm: f64,
}

/// Clearance for an ILS approach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IlsClearance {
    pub game_time: f64,
    #[serde(default)]
    pub callsign: String,
    #[serde(default)]
    pub runway: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landing {
    pub game_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub airport: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStart {
    #[serde(default)]
    pub game_time: Option<f64>,
    /// Wall-clock start time as recorded by the agent.
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionEndSummary {
    #[serde(default)]
    pub game_score: Option<f64>,
    #[serde(default)]
    pub arrivals_landed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEnd {
    /// Game time at which the session ended, i.e. its duration.
    #[serde(default)]
    pub game_time: Option<f64>,
    #[serde(default)]
    pub summary: SessionEndSummary,
}

/// One entry of a session log.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SessionStart(SessionStart),
    SessionEnd(SessionEnd),
    Snapshot(Snapshot),
    Decision(Decision),
    Outcome(Outcome),
    Conflict(Conflict),
    IlsClearance(IlsClearance),
    Landing(Landing),
    /// A kind this version does not know about. Kept so event counts and
    /// time bounds stay faithful to the log.
    Unknown {
        kind: String,
        game_time: Option<f64>,
    },
}

impl Event {
    /// The event's kind, or `None` for unknown kinds.
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            Event::SessionStart(_) => Some(EventKind::SessionStart),
            Event::SessionEnd(_) => Some(EventKind::SessionEnd),
            Event::Snapshot(_) => Some(EventKind::StateSnapshot),
            Event::Decision(_) => Some(EventKind::Decision),
            Event::Outcome(_) => Some(EventKind::Outcome),
            Event::Conflict(_) => Some(EventKind::Conflict),
            Event::IlsClearance(_) => Some(EventKind::IlsClearance),
            Event::Landing(_) => Some(EventKind::Landing),
            Event::Unknown { .. } => None,
        }
    }

    /// Wire name of the event's kind, including unknown ones.
    pub fn kind_name(&self) -> &str {
        match self {
            Event::Unknown { kind, .. } => kind,
            other => other.kind().map(|kind| kind.as_str()).unwrap_or_default(),
        }
    }

    /// Game time of the event, if it carries one.
    pub fn game_time(&self) -> Option<f64> {
        match self {
            Event::SessionStart(event) => event.game_time,
            Event::SessionEnd(event) => event.game_time,
            Event::Snapshot(event) => Some(event.game_time),
            Event::Decision(event) => Some(event.game_time),
            Event::Outcome(event) => event.game_time,
            Event::Conflict(event) => Some(event.game_time),
            Event::IlsClearance(event) => Some(event.game_time),
            Event::Landing(event) => Some(event.game_time),
            Event::Unknown { game_time, .. } => *game_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::from_name("conflict_detected"), None);
    }

    #[test]
    fn session_markers_do_not_require_game_time() {
        assert!(!EventKind::SessionStart.requires_game_time());
        assert!(!EventKind::SessionEnd.requires_game_time());
        assert!(!EventKind::Outcome.requires_game_time());
        assert!(EventKind::StateSnapshot.requires_game_time());
        assert!(EventKind::Landing.requires_game_time());
    }

    #[test]
    fn command_text_uppercases_type_and_appends_value() {
        let mut decision = Decision {
            game_time: 1.0,
            callsign: "AAL12".to_string(),
            command_type: "altitude".to_string(),
            command_value: Some(serde_json::json!(4000)),
            correlation_id: None,
        };
        assert_eq!(decision.command_text(), "ALTITUDE 4000");

        decision.command_value = Some(serde_json::json!("28R"));
        assert_eq!(decision.command_text(), "ALTITUDE 28R");

        decision.command_value = None;
        assert_eq!(decision.command_text(), "ALTITUDE");
    }
}
