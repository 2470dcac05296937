use std::time::Duration;

use atc_replay_lib::views::{DecisionEntry, Metrics};
use atc_replay_lib::{Aircraft, Marker, MarkerKind, TransportInput};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

/// Maximum decisions shown in the feed, newest first.
pub const DECISION_FEED_LEN: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    Quit,
    Transport(TransportInput),
}

pub struct StatusSnapshot {
    pub text: String,
}

pub struct StatusArgs<'a> {
    pub time: f64,
    pub duration: f64,
    pub playing: bool,
    pub speed: f64,
    pub metrics: &'a Metrics,
}

pub fn status_text(args: StatusArgs) -> StatusSnapshot {
    let state = if args.playing { "▶ Playing" } else { "⏸ Paused" };
    let percent = if args.duration > 0.0 {
        (args.time / args.duration * 100.0).min(100.0)
    } else {
        0.0
    };
    let text = format!(
        "{}   {} / {}   ({:>5.1}%)   speed {}x\nLandings: {} | Decisions: {} ({:.0}% ok) | Conflicts: {} | Score: {}",
        state,
        format_time(args.time),
        format_time(args.duration),
        percent,
        args.speed,
        args.metrics.landings,
        args.metrics.decisions,
        args.metrics.success_rate,
        args.metrics.conflicts,
        args.metrics.score
    );

    StatusSnapshot { text }
}

pub fn help_text(seek_step: f64) -> String {
    format!(
        "space=play/pause  ←/→=seek {}s  +/-=speed  Home/End=jump  [/]=prev/next marker  q=quit",
        seek_step
    )
}

/// Translate one key press into an action.
pub fn map_key(key: KeyEvent) -> Option<ControlAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let input = match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Some(ControlAction::Quit),
        KeyCode::Left => TransportInput::SeekBackward,
        KeyCode::Right => TransportInput::SeekForward,
        KeyCode::Home => TransportInput::JumpToStart,
        KeyCode::End => TransportInput::JumpToEnd,
        KeyCode::Char(c) => TransportInput::from_char(c)?,
        _ => return None,
    };
    Some(ControlAction::Transport(input))
}

/// Wait up to `timeout` for a key press.
pub fn poll_action(timeout: Duration) -> Option<ControlAction> {
    if !event::poll(timeout).unwrap_or(false) {
        return None;
    }
    match event::read() {
        Ok(Event::Key(key)) => map_key(key),
        _ => None,
    }
}

/// Game seconds as `HH:MM:SS`.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() {
        seconds.max(0.0).floor() as u64
    } else {
        0
    };
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// One-line track of `width` cells: `!` for conflicts, `i` for ILS
/// clearances and `|` at the cursor.
pub fn marker_strip(markers: &[Marker], max_time: f64, cursor: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut cells = vec!['─'; width];
    let cell_for = |fraction: f64| ((fraction * (width - 1) as f64).round() as usize).min(width - 1);

    for marker in markers {
        let cell = cell_for(marker.fraction(max_time));
        // Conflicts win over clearances sharing a cell.
        cells[cell] = match (marker.kind, cells[cell]) {
            (MarkerKind::Conflict, _) | (MarkerKind::Ils, '!') => '!',
            (MarkerKind::Ils, _) => 'i',
        };
    }

    let fraction = if max_time > 0.0 {
        (cursor / max_time).clamp(0.0, 1.0)
    } else {
        0.0
    };
    cells[cell_for(fraction)] = '|';
    cells.into_iter().collect()
}

pub fn aircraft_line(aircraft: &Aircraft) -> String {
    format!(
        "{:<8} x {:>7.1}  y {:>7.1}  alt {:>5.0}  hdg {:03.0}  spd {:>3.0}  {}",
        aircraft.callsign,
        aircraft.position.0,
        aircraft.position.1,
        aircraft.altitude,
        aircraft.heading,
        aircraft.speed,
        aircraft.phase.as_deref().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

/// Feed lines for the most recent decisions, newest first.
pub fn decision_lines(decisions: &[DecisionEntry], limit: usize) -> Vec<String> {
    decisions
        .iter()
        .rev()
        .take(limit)
        .map(|entry| {
            let status = match entry.success {
                Some(false) => {
                    let reason: String = if entry.error.is_empty() {
                        "rejected".to_string()
                    } else {
                        entry.error.chars().take(20).collect()
                    };
                    format!("{} ({})", entry.status_glyph(), reason)
                }
                _ => entry.status_glyph().to_string(),
            };
            format!(
                "{} {:<8} {} {}",
                format_time(entry.game_time),
                entry.callsign,
                entry.command,
                status
            )
        })
        .collect()
}
