use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, Paragraph},
    Terminal,
};

use atc_replay_lib::Marker;

use crate::controls::{self, StatusSnapshot};

/// Everything one frame of the replay view shows.
pub struct ReplayFrame<'a> {
    pub title: &'a str,
    pub help: &'a str,
    pub status: &'a StatusSnapshot,
    pub progress: f64,
    pub cursor: f64,
    pub max_time: f64,
    pub markers: &'a [Marker],
    pub aircraft: &'a [String],
    pub decisions: &'a [String],
    pub log_lines: &'a [String],
}

fn list_text(lines: &[String], empty: &str) -> String {
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}

pub fn draw_replay(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, frame: &ReplayFrame) {
    let _ = terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(8),
            ])
            .split(f.size());

        let title = Paragraph::new(frame.title).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(title, chunks[0]);

        let controls = Paragraph::new(frame.help)
            .style(Style::default().fg(Color::Blue))
            .block(Block::default().borders(Borders::ALL).title("Controls"));
        f.render_widget(controls, chunks[1]);

        let status_widget = Paragraph::new(frame.status.text.as_str())
            .style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL).title("Playback"));
        f.render_widget(status_widget, chunks[2]);

        let track_width = chunks[3].width.saturating_sub(2) as usize;
        let strip = controls::marker_strip(frame.markers, frame.max_time, frame.cursor, track_width);
        let track = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Timeline  ! conflict  i ILS"))
            .gauge_style(Style::default().fg(Color::Yellow).bg(Color::Black))
            .ratio(frame.progress.clamp(0.0, 1.0))
            .label(strip);
        f.render_widget(track, chunks[3]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[4]);

        let aircraft = Paragraph::new(list_text(frame.aircraft, "No aircraft."))
            .style(Style::default().fg(Color::White))
            .block(Block::default().borders(Borders::ALL).title("Aircraft"));
        f.render_widget(aircraft, columns[0]);

        let decisions = Paragraph::new(list_text(frame.decisions, "No decisions yet."))
            .style(Style::default().fg(Color::Magenta))
            .block(Block::default().borders(Borders::ALL).title("Decisions"));
        f.render_widget(decisions, columns[1]);

        let log_height = chunks[5].height.saturating_sub(2) as usize;
        let start = frame.log_lines.len().saturating_sub(log_height);
        let log_widget = Paragraph::new(list_text(&frame.log_lines[start..], "No logs yet."))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Logs"));
        f.render_widget(log_widget, chunks[5]);
    });
}
