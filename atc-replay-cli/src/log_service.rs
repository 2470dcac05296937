//! Session logs on disk: one `events_<session_id>.jsonl` file per session.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use atc_replay_lib::views::SessionSummary;
use atc_replay_lib::EventStore;
use log::{debug, warn};
use serde_json::Value;

use crate::error::AppError;

const SESSION_PREFIX: &str = "events_";
const SESSION_SUFFIX: &str = ".jsonl";

/// Extract the session id from a file name like `events_atc_20260112_222918.jsonl`.
pub fn parse_session_id(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(SESSION_PREFIX)?
        .strip_suffix(SESSION_SUFFIX)
        .filter(|id| !id.is_empty())
}

pub fn session_path(log_dir: &Path, session_id: &str) -> PathBuf {
    log_dir.join(format!("{}{}{}", SESSION_PREFIX, session_id, SESSION_SUFFIX))
}

/// Session id for an arbitrary log path, falling back to the file stem.
pub fn session_id_for(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match parse_session_id(&file_name) {
        Some(id) => id.to_string(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or(file_name),
    }
}

/// Resolve a CLI input: an existing file path, or a session id in `log_dir`.
pub fn resolve_input(input: &str, log_dir: &Path) -> Result<PathBuf, AppError> {
    let direct = PathBuf::from(input);
    if direct.is_file() {
        return Ok(direct);
    }

    let by_id = session_path(log_dir, input);
    if by_id.is_file() {
        return Ok(by_id);
    }

    Err(AppError::SessionNotFound(input.to_string()))
}

/// Read every JSON record of a session log.
///
/// Blank lines are ignored and lines that are not valid JSON are skipped
/// with a warning; the agent may be mid-write on the last line.
pub fn read_events(path: &Path) -> Result<Vec<Value>, AppError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut events = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(event) => events.push(event),
            Err(err) => warn!(
                "Skipping unreadable line {} of {}: {}",
                line_number + 1,
                path.display(),
                err
            ),
        }
    }

    debug!("Read {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Read and validate a session log.
pub fn load_session(path: &Path) -> Result<(String, EventStore), AppError> {
    let events = read_events(path)?;
    let store = EventStore::load(&events)?;
    Ok((session_id_for(path), store))
}

/// Summaries of every session in `log_dir`, newest first.
///
/// A missing directory has no sessions. Logs that cannot be read or
/// validated are skipped.
pub fn list_sessions(log_dir: &Path) -> Result<Vec<SessionSummary>, AppError> {
    if !log_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(session_id) = parse_session_id(file_name) else {
            continue;
        };
        let session_id = session_id.to_string();

        let loaded = read_events(&path)
            .and_then(|events| EventStore::load(&events).map_err(AppError::from));
        match loaded {
            Ok(store) => sessions.push(SessionSummary::from_store(session_id, &store)),
            Err(err) => warn!("Skipping session {}: {}", session_id, err),
        }
    }

    // Option orders None first, so descending puts sessions without a
    // timestamp last.
    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(sessions)
}
