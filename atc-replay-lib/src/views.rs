//! Derived, recompute-on-demand views over a session.
//!
//! Nothing here is cached: every function is a pure read of an
//! [`EventStore`], so results can never outlive a reload.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::events::Outcome;
use crate::store::EventStore;

/// A decision joined with its outcome, if one was logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEntry {
    pub game_time: f64,
    pub callsign: String,
    /// e.g. `"ALTITUDE 4000"`.
    pub command: String,
    /// `None` while the outcome is still pending.
    pub success: Option<bool>,
    pub error: String,
}

impl DecisionEntry {
    pub fn status_glyph(&self) -> &'static str {
        match self.success {
            Some(true) => "✓",
            Some(false) => "✗",
            None => "⋯",
        }
    }
}

/// Session metrics up to a point in game time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub landings: usize,
    pub decisions: usize,
    /// Percentage of resolved decisions that succeeded.
    pub success_rate: f64,
    pub score: f64,
    pub conflicts: usize,
}

/// Headline facts about a recorded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub timestamp: Option<String>,
    pub model: Option<String>,
    pub airport: Option<String>,
    pub duration_s: Option<f64>,
    pub score: Option<f64>,
    pub landings: Option<u32>,
    pub event_count: usize,
}

impl SessionSummary {
    pub fn from_store(session_id: impl Into<String>, store: &EventStore) -> Self {
        let start = store.session_start();
        let end = store.session_end();

        Self {
            session_id: session_id.into(),
            timestamp: start.and_then(|start| start.timestamp.clone()),
            model: start.and_then(|start| start.metadata.model.clone()),
            airport: start.and_then(|start| start.metadata.airport.clone()),
            duration_s: end.map(|end| end.game_time.unwrap_or_default()),
            score: end.and_then(|end| end.summary.game_score),
            landings: end.map(|end| end.summary.arrivals_landed.unwrap_or_default()),
            event_count: store.len(),
        }
    }
}

/// Outcomes visible at `time`; outcomes logged without a game time are
/// always visible.
fn outcomes_until(store: &EventStore, time: f64) -> impl Iterator<Item = &Outcome> + '_ {
    store
        .outcomes()
        .filter(move |outcome| outcome.game_time.map_or(true, |at| at <= time))
}

fn outcomes_by_correlation(store: &EventStore, time: f64) -> HashMap<&str, &Outcome> {
    outcomes_until(store, time)
        .filter_map(|outcome| {
            outcome
                .correlation_id
                .as_deref()
                .map(|correlation_id| (correlation_id, outcome))
        })
        .collect()
}

/// Every decision made at or before `time`, in log order.
pub fn decisions_until(store: &EventStore, time: f64) -> Vec<DecisionEntry> {
    let outcomes = outcomes_by_correlation(store, time);

    store
        .decisions()
        .filter(|decision| decision.game_time <= time)
        .map(|decision| {
            let outcome = decision
                .correlation_id
                .as_deref()
                .and_then(|correlation_id| outcomes.get(correlation_id));
            DecisionEntry {
                game_time: decision.game_time,
                callsign: if decision.callsign.is_empty() {
                    "???".to_string()
                } else {
                    decision.callsign.clone()
                },
                command: decision.command_text(),
                success: outcome.and_then(|outcome| outcome.success),
                error: outcome
                    .and_then(|outcome| outcome.error.clone())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// Metrics over everything that happened at or before `time`.
pub fn metrics_until(store: &EventStore, time: f64) -> Metrics {
    let landings = store
        .landings()
        .filter(|landing| landing.game_time <= time)
        .count();
    let conflicts = store
        .conflicts()
        .filter(|conflict| conflict.game_time <= time)
        .count();

    let decided: HashSet<&str> = store
        .decisions()
        .filter(|decision| decision.game_time <= time)
        .filter_map(|decision| decision.correlation_id.as_deref())
        .collect();
    let decisions = store
        .decisions()
        .filter(|decision| decision.game_time <= time)
        .count();

    let (resolved, successes) = outcomes_until(store, time)
        .filter(|outcome| {
            outcome
                .correlation_id
                .as_deref()
                .is_some_and(|correlation_id| decided.contains(correlation_id))
        })
        .fold((0_usize, 0_usize), |(resolved, successes), outcome| {
            (resolved + 1, successes + usize::from(outcome.success == Some(true)))
        });
    let success_rate = if resolved > 0 {
        successes as f64 / resolved as f64 * 100.0
    } else {
        0.0
    };

    let score = store
        .snapshots_by_time()
        .take_while(|snapshot| snapshot.game_time <= time)
        .last()
        .and_then(|snapshot| snapshot.score)
        .unwrap_or_default();

    Metrics {
        landings,
        decisions,
        success_rate,
        score,
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn events() -> Vec<Value> {
        vec![
            json!({"event_type": "session_start", "timestamp": "2026-01-12T22:29:18",
                   "metadata": {"model": "qwen2.5", "airport": "KSFO"}}),
            json!({"event_type": "state_snapshot", "game_time": 0.0, "score": 0}),
            json!({"event_type": "decision", "game_time": 1.0, "callsign": "AAL1",
                   "command_type": "altitude", "command_value": 4000, "correlation_id": "a"}),
            json!({"event_type": "decision", "game_time": 2.0, "callsign": "UAL2",
                   "command_type": "heading", "command_value": 270, "correlation_id": "b"}),
            json!({"event_type": "outcome", "correlation_id": "a", "success": true}),
            json!({"event_type": "outcome", "correlation_id": "b", "success": false,
                   "error": "unknown aircraft"}),
            json!({"event_type": "decision", "game_time": 8.0, "callsign": "",
                   "command_type": "land", "correlation_id": "c"}),
            json!({"event_type": "state_snapshot", "game_time": 5.0, "score": 25}),
            json!({"event_type": "conflict", "game_time": 6.0, "aircraft1": "AAL1",
                   "aircraft2": "UAL2", "separation_nm": 2.5, "required_nm": 3.0}),
            json!({"event_type": "landing", "game_time": 9.0}),
            json!({"event_type": "session_end", "game_time": 10.0,
                   "summary": {"game_score": 40, "arrivals_landed": 1}}),
        ]
    }

    #[test]
    fn decisions_join_outcomes() {
        let store = EventStore::load(&events()).expect("load");
        let decisions = decisions_until(&store, 100.0);
        assert_eq!(decisions.len(), 3);
        assert_eq!(decisions[0].command, "ALTITUDE 4000");
        assert_eq!(decisions[0].success, Some(true));
        assert_eq!(decisions[0].status_glyph(), "✓");
        assert_eq!(decisions[1].success, Some(false));
        assert_eq!(decisions[1].error, "unknown aircraft");
        assert_eq!(decisions[2].callsign, "???");
        assert_eq!(decisions[2].command, "LAND");
        assert_eq!(decisions[2].status_glyph(), "⋯");
    }

    #[test]
    fn outcomes_are_hidden_until_logged() {
        let events = vec![
            json!({"event_type": "decision", "game_time": 1.0, "callsign": "AAL1",
                   "command_type": "heading", "command_value": 90, "correlation_id": "x"}),
            json!({"event_type": "outcome", "game_time": 50.0, "correlation_id": "x",
                   "success": false, "error": "late"}),
        ];
        let store = EventStore::load(&events).expect("load");

        let early = decisions_until(&store, 2.0);
        assert_eq!(early[0].success, None);
        assert_eq!(early[0].error, "");
        assert_eq!(early[0].status_glyph(), "⋯");
        assert_eq!(metrics_until(&store, 2.0).success_rate, 0.0);

        let late = decisions_until(&store, 50.0);
        assert_eq!(late[0].success, Some(false));
        assert_eq!(late[0].error, "late");
    }

    #[test]
    fn outcome_without_success_stays_pending() {
        let events = vec![
            json!({"event_type": "decision", "game_time": 1.0, "callsign": "AAL1",
                   "command_type": "land", "correlation_id": 7}),
            json!({"event_type": "outcome", "correlation_id": 7}),
        ];
        let store = EventStore::load(&events).expect("load");
        let decisions = decisions_until(&store, 5.0);
        assert_eq!(decisions[0].success, None);
        assert_eq!(metrics_until(&store, 5.0).success_rate, 0.0);
    }

    #[test]
    fn decisions_are_cut_at_time() {
        let store = EventStore::load(&events()).expect("load");
        assert_eq!(decisions_until(&store, 1.5).len(), 1);
        assert!(decisions_until(&store, 0.5).is_empty());
    }

    #[test]
    fn metrics_track_the_cursor() {
        let store = EventStore::load(&events()).expect("load");

        let early = metrics_until(&store, 3.0);
        assert_eq!(early.decisions, 2);
        assert_eq!(early.success_rate, 50.0);
        assert_eq!(early.score, 0.0);
        assert_eq!(early.conflicts, 0);
        assert_eq!(early.landings, 0);

        let late = metrics_until(&store, 10.0);
        assert_eq!(late.decisions, 3);
        assert_eq!(late.score, 25.0);
        assert_eq!(late.conflicts, 1);
        assert_eq!(late.landings, 1);
    }

    #[test]
    fn metrics_of_empty_session_are_zero() {
        let store = EventStore::load(&[]).expect("load");
        assert_eq!(metrics_until(&store, 10.0), Metrics::default());
    }

    #[test]
    fn summary_reads_session_boundaries() {
        let store = EventStore::load(&events()).expect("load");
        let summary = SessionSummary::from_store("atc_20260112_222918", &store);
        assert_eq!(summary.model.as_deref(), Some("qwen2.5"));
        assert_eq!(summary.airport.as_deref(), Some("KSFO"));
        assert_eq!(summary.timestamp.as_deref(), Some("2026-01-12T22:29:18"));
        assert_eq!(summary.duration_s, Some(10.0));
        assert_eq!(summary.score, Some(40.0));
        assert_eq!(summary.landings, Some(1));
        assert_eq!(summary.event_count, 11);
    }
}
