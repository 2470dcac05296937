//! CLI helpers for printing session data without the interactive view.

use std::io::Write;
use std::path::Path;

use atc_replay_lib::views::{self, SessionSummary};
use log::info;
use serde_json::json;

use crate::controls::{aircraft_line, format_time};
use crate::error::AppError;
use crate::log_service;

/// Print the interpolated aircraft at `time`.
pub fn run_inspect(path: &Path, time: f64, as_json: bool, out: &mut impl Write) -> Result<i32, AppError> {
    let (session_id, store) = log_service::load_session(path)?;
    let aircraft = store.state_at(time);
    info!("Inspecting {} at {:.2}s", session_id, time);

    if as_json {
        writeln!(out, "{}", serde_json::to_string_pretty(&aircraft)?)?;
        return Ok(0);
    }

    writeln!(
        out,
        "{} @ {} ({} aircraft)",
        session_id,
        format_time(time.clamp(0.0, store.max_time())),
        aircraft.len()
    )?;
    for entry in &aircraft {
        writeln!(out, "{}", aircraft_line(entry))?;
    }
    Ok(0)
}

/// Print timeline markers, one per line.
pub fn run_markers(path: &Path, out: &mut impl Write) -> Result<i32, AppError> {
    let (_, store) = log_service::load_session(path)?;
    for marker in store.markers() {
        writeln!(
            out,
            "{:>8.1}  {:<8}  {}",
            marker.time,
            marker.kind.as_str().to_uppercase(),
            marker.label
        )?;
    }
    Ok(0)
}

/// Print session metadata and the metrics at the end of the session.
pub fn run_summary(path: &Path, as_json: bool, out: &mut impl Write) -> Result<i32, AppError> {
    let (session_id, store) = log_service::load_session(path)?;
    let summary = SessionSummary::from_store(session_id, &store);
    let metrics = views::metrics_until(&store, store.max_time());

    if as_json {
        let payload = json!({ "summary": summary, "metrics": metrics });
        writeln!(out, "{}", serde_json::to_string_pretty(&payload)?)?;
        return Ok(0);
    }

    writeln!(out, "Session:   {}", summary.session_id)?;
    writeln!(out, "Started:   {}", summary.timestamp.as_deref().unwrap_or("-"))?;
    writeln!(out, "Model:     {}", summary.model.as_deref().unwrap_or("-"))?;
    writeln!(out, "Airport:   {}", summary.airport.as_deref().unwrap_or("-"))?;
    writeln!(out, "Duration:  {}", format_time(store.max_time()))?;
    let unrecognised = store.events().filter(|event| event.kind().is_none()).count();
    if unrecognised > 0 {
        writeln!(out, "Events:    {} ({} unrecognised)", summary.event_count, unrecognised)?;
    } else {
        writeln!(out, "Events:    {}", summary.event_count)?;
    }
    writeln!(out, "Landings:  {}", metrics.landings)?;
    writeln!(out, "Decisions: {} ({:.0}% success)", metrics.decisions, metrics.success_rate)?;
    writeln!(out, "Conflicts: {}", metrics.conflicts)?;
    writeln!(out, "Score:     {}", metrics.score)?;
    Ok(0)
}

/// List the sessions found in `log_dir`.
pub fn run_sessions(log_dir: &Path, as_json: bool, out: &mut impl Write) -> Result<i32, AppError> {
    let sessions = log_service::list_sessions(log_dir)?;

    if as_json {
        writeln!(out, "{}", serde_json::to_string_pretty(&sessions)?)?;
        return Ok(0);
    }

    if sessions.is_empty() {
        writeln!(out, "No sessions in {}", log_dir.display())?;
        return Ok(0);
    }

    for session in &sessions {
        writeln!(
            out,
            "{:<28} {:<20} {:<16} score={:<6} landed={:<3} events={}",
            session.session_id,
            session.timestamp.as_deref().unwrap_or("-"),
            session.model.as_deref().unwrap_or("-"),
            session
                .score
                .map(|score| score.to_string())
                .unwrap_or_else(|| "-".to_string()),
            session
                .landings
                .map(|landings| landings.to_string())
                .unwrap_or_else(|| "-".to_string()),
            session.event_count
        )?;
    }
    Ok(0)
}
