use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const SESSION: &str = r#"{"event_type": "session_start", "timestamp": "2026-01-12T22:29:18", "metadata": {"model": "qwen2.5", "airport": "KSFO"}}
{"event_type": "state_snapshot", "game_time": 0, "score": 0, "aircraft": [{"callsign": "AC1", "position": [0, 0], "altitude": 1000, "heading": 90, "speed": 180}]}
{"event_type": "decision", "game_time": 2, "callsign": "AC1", "command_type": "altitude", "command_value": 2000, "correlation_id": "c1"}
{"event_type": "outcome", "correlation_id": "c1", "success": true}
{"event_type": "conflict", "game_time": 4, "aircraft1": "AC1", "aircraft2": "AC2", "separation_nm": 2.1, "required_nm": 3}
{"event_type": "ils_clearance", "game_time": 8, "callsign": "AC1", "runway": "28R"}
{"event_type": "state_snapshot", "game_time": 10, "score": 15, "aircraft": [{"callsign": "AC1", "position": [10, 0], "altitude": 2000, "heading": 90, "speed": 180}]}
{"event_type": "session_end", "game_time": 10, "summary": {"game_score": 15, "arrivals_landed": 0}}
"#;

fn write_session(dir: &Path, session_id: &str, contents: &str) -> PathBuf {
    let path = dir.join(format!("events_{}.jsonl", session_id));
    fs::write(&path, contents).expect("write session");
    path
}

fn atcr() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("atcr"));
    cmd.env_remove("ATC_REPLAY_LOG_DIR")
        .env_remove("ATC_REPLAY_LOG_STDERR");
    cmd
}

#[test]
fn inspect_prints_interpolated_state_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_session(dir.path(), "demo", SESSION);

    atcr()
        .args(["inspect", path.to_str().expect("utf8"), "--at", "5", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"callsign\": \"AC1\""))
        .stdout(predicate::str::contains("1500"));
}

#[test]
fn markers_are_listed_by_session_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_session(dir.path(), "demo", SESSION);

    atcr()
        .args(["markers", "demo", "--log-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFLICT"))
        .stdout(predicate::str::contains("AC1/AC2 2.1nm < 3.0nm"))
        .stdout(predicate::str::contains("AC1 ILS 28R"));
}

#[test]
fn sessions_lists_logs_in_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_session(dir.path(), "atc_20260112_222918", SESSION);

    atcr()
        .args(["sessions", "--json", "--log-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("atc_20260112_222918"))
        .stdout(predicate::str::contains("qwen2.5"));
}

#[test]
fn summary_reports_final_metrics() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_session(dir.path(), "demo", SESSION);

    atcr()
        .arg("summary")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Airport:   KSFO"))
        .stdout(predicate::str::contains("Decisions: 1 (100% success)"))
        .stdout(predicate::str::contains("Score:     15"));
}

#[test]
fn malformed_log_fails_to_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_session(
        dir.path(),
        "broken",
        "{\"event_type\": \"state_snapshot\", \"aircraft\": []}\n",
    );

    atcr()
        .arg("markers")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("malformed event at index 0"));
}

#[test]
fn unknown_session_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");

    atcr()
        .args(["summary", "nope", "--log-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("session not found: nope"));
}

#[test]
fn quiet_play_runs_to_the_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_session(dir.path(), "demo", SESSION);

    atcr()
        .args(["play", path.to_str().expect("utf8"), "--quiet", "--speed", "10"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success();
}
