use std::{
    io::{self, Write},
    path::PathBuf,
    thread::sleep,
    time::Duration,
};

use atc_replay_lib::{
    ReplayView, SystemTimeSource, TickOutcome, TimeSource, TransportInput, ViewState,
};
use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::cli::{config::CliConfig, report};
use crate::controls::{self, ControlAction};
use crate::error::AppError;
use crate::logging::{self, LogBuffer};
use crate::{log_service, ui};

const IDLE_POLL: Duration = Duration::from_millis(100);

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> Result<i32, AppError> {
    info!("Starting ATC replay CLI");

    match args.subcommand() {
        Some(("play", sub)) => play(sub, &log_buffer),
        Some(("inspect", sub)) => {
            let (_, path) = input_path(sub)?;
            let at = sub.get_one::<f64>("at").copied().unwrap_or_default();
            report::run_inspect(&path, at, sub.get_flag("json"), &mut io::stdout().lock())
        }
        Some(("markers", sub)) => {
            let (_, path) = input_path(sub)?;
            report::run_markers(&path, &mut io::stdout().lock())
        }
        Some(("summary", sub)) => {
            let (_, path) = input_path(sub)?;
            report::run_summary(&path, sub.get_flag("json"), &mut io::stdout().lock())
        }
        Some(("sessions", sub)) => {
            let config = CliConfig::from_args(sub);
            report::run_sessions(&config.log_dir, sub.get_flag("json"), &mut io::stdout().lock())
        }
        _ => play(args, &log_buffer),
    }
}

fn input_path(args: &ArgMatches) -> Result<(CliConfig, PathBuf), AppError> {
    let config = CliConfig::from_args(args);
    let input = args.get_one::<String>("INPUT").ok_or(AppError::MissingInput)?;
    let path = log_service::resolve_input(input, &config.log_dir)?;
    Ok((config, path))
}

fn play(args: &ArgMatches, log_buffer: &LogBuffer) -> Result<i32, AppError> {
    let (config, path) = input_path(args)?;
    let session_id = log_service::session_id_for(&path);
    let time = SystemTimeSource::new();
    let mut view = ReplayView::new(time, config.playback);

    view.begin_load();
    let raw_events = log_service::read_events(&path)?;
    view.finish_load(&raw_events)?;
    info!("Opened session {} from {}", session_id, path.display());

    if config.quiet {
        let result = play_headless(&mut view, &time);
        logging::set_game_time(None);
        view.close();
        result?;
        return Ok(0);
    }

    let _raw_mode = RawModeGuard::enable().ok();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, EnterAlternateScreen, cursor::Hide);
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = replay_loop(&mut view, &time, &mut terminal, &session_id, log_buffer);

    // Restore the terminal state before exiting.
    let _ = terminal.show_cursor();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show);
    let _ = terminal.backend_mut().flush();
    logging::set_game_time(None);
    view.close();

    result.map(|_| 0)
}

/// Run due ticks until playback stops on its own.
fn play_headless(view: &mut ReplayView, time: &SystemTimeSource) -> Result<(), AppError> {
    view.play()?;
    while let Some(token) = view.pending_tick() {
        let wait = token.due().saturating_sub(time.now());
        if !wait.is_zero() {
            sleep(wait);
        }
        let outcome = view.tick(token);
        logging::set_game_time(Some(view.cursor()));
        if outcome == TickOutcome::Finished {
            info!("Reached the end of the session at {:.1}s", view.cursor());
        }
    }
    Ok(())
}

fn replay_loop(
    view: &mut ReplayView,
    time: &SystemTimeSource,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session_id: &str,
    log_buffer: &LogBuffer,
) -> Result<(), AppError> {
    let title = format!("ATC Replay  {}", session_id);
    let help = controls::help_text(view.settings().seek_step);

    loop {
        if let Some(token) = view.pending_tick() {
            if token.due() <= time.now() {
                view.tick(token);
            }
        }
        logging::set_game_time(Some(view.cursor()));

        draw(view, terminal, &title, &help, log_buffer);

        let timeout = view
            .pending_tick()
            .map(|token| token.due().saturating_sub(time.now()).min(IDLE_POLL))
            .unwrap_or(IDLE_POLL);

        match controls::poll_action(timeout) {
            Some(ControlAction::Quit) => return Ok(()),
            Some(ControlAction::Transport(input)) => apply_input(view, input),
            None => {}
        }

        if *view.state() != ViewState::Ready {
            warn!("Replay view is no longer ready: {:?}", view.state());
            return Ok(());
        }
    }
}

fn apply_input(view: &mut ReplayView, input: TransportInput) {
    if let Err(err) = view.apply(input) {
        warn!("Ignoring {:?}: {}", input, err);
    }
}

fn draw(
    view: &ReplayView,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    title: &str,
    help: &str,
    log_buffer: &LogBuffer,
) {
    let metrics = view.metrics_to_date();
    let status = controls::status_text(controls::StatusArgs {
        time: view.cursor(),
        duration: view.max_time(),
        playing: view.is_playing(),
        speed: view.speed(),
        metrics: &metrics,
    });
    let aircraft: Vec<String> = view
        .current_aircraft()
        .iter()
        .map(controls::aircraft_line)
        .collect();
    let decisions = controls::decision_lines(&view.decisions_to_date(), controls::DECISION_FEED_LEN);
    let log_lines = logging::snapshot(log_buffer);

    ui::draw_replay(
        terminal,
        &ui::ReplayFrame {
            title,
            help,
            status: &status,
            progress: view.progress(),
            cursor: view.cursor(),
            max_time: view.max_time(),
            markers: view.markers(),
            aircraft: &aircraft,
            decisions: &decisions,
            log_lines: &log_lines,
        },
    );
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
