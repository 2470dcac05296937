//! Transport controller for one replay view.

use log::{info, warn};
use serde_json::Value;

use super::clock::{PlaybackClock, PlaybackState, TickOutcome, TickToken};
use super::settings::PlaybackSettings;
use super::time_source::{SystemTimeSource, TimeSource};
use crate::constants::{MAX_SPEED, MIN_SPEED};
use crate::error::{ReplayError, ReplayResult};
use crate::events::Aircraft;
use crate::store::EventStore;
use crate::timeline::{self, Marker};
use crate::views::{self, DecisionEntry, Metrics};

/// A discrete user intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportInput {
    TogglePlay,
    SeekBackward,
    SeekForward,
    SpeedUp,
    SlowDown,
    /// Scrubber drag, as a fraction of the track in `[0, 1]`.
    Scrub(f64),
    JumpToStart,
    JumpToEnd,
    NextMarker,
    PreviousMarker,
}

impl TransportInput {
    /// Map a printable keyboard shortcut.
    pub fn from_char(key: char) -> Option<Self> {
        match key {
            ' ' => Some(Self::TogglePlay),
            '+' | '=' => Some(Self::SpeedUp),
            '-' => Some(Self::SlowDown),
            '[' => Some(Self::PreviousMarker),
            ']' => Some(Self::NextMarker),
            _ => None,
        }
    }
}

/// Load lifecycle of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// No session has been opened yet, or the view was closed.
    Idle,
    /// Events are being fetched; transport commands are rejected.
    Loading,
    Ready,
    /// The last load failed; no session data is held.
    Failed(String),
}

/// An open replay view: one session, one cursor, one clock.
///
/// Views share nothing; two views over the same session advance
/// independently.
#[derive(Debug)]
pub struct ReplayView<T: TimeSource = SystemTimeSource> {
    state: ViewState,
    store: Option<EventStore>,
    clock: PlaybackClock<T>,
    settings: PlaybackSettings,
}

impl<T: TimeSource> ReplayView<T> {
    pub fn new(source: T, settings: PlaybackSettings) -> Self {
        let mut clock = PlaybackClock::new(source, 0.0).with_frame_interval(settings.frame_interval);
        clock.set_speed(settings.initial_speed);
        Self {
            state: ViewState::Idle,
            store: None,
            clock,
            settings,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ViewState::Ready
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// The loaded session, once ready.
    pub fn store(&self) -> Option<&EventStore> {
        self.store.as_ref()
    }

    /// Enter the loading state, dropping the current session and any
    /// pending tick.
    pub fn begin_load(&mut self) {
        self.clock.reset(0.0);
        self.store = None;
        self.state = ViewState::Loading;
    }

    /// Validate `raw_events` and make them the view's session.
    ///
    /// Playback restarts at cursor 0, paused; the speed is kept.
    ///
    /// # Errors
    /// Returns [`ReplayError::MalformedEvent`] if validation fails. The view
    /// is then left in [`ViewState::Failed`] without session data.
    pub fn finish_load(&mut self, raw_events: &[Value]) -> ReplayResult<()> {
        match EventStore::load(raw_events) {
            Ok(store) => {
                self.install(store);
                Ok(())
            }
            Err(err) => {
                warn!("Session load failed: {}", err);
                self.clock.reset(0.0);
                self.store = None;
                self.state = ViewState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Load a session in one step.
    pub fn load(&mut self, raw_events: &[Value]) -> ReplayResult<()> {
        self.begin_load();
        self.finish_load(raw_events)
    }

    /// Cancel the pending tick and release the session.
    pub fn close(&mut self) {
        self.clock.reset(0.0);
        self.store = None;
        self.state = ViewState::Idle;
    }

    fn install(&mut self, store: EventStore) {
        self.clock.reset(store.max_time());
        info!(
            "Session ready: {} events, {:.1}s",
            store.len(),
            store.max_time()
        );
        self.store = Some(store);
        self.state = ViewState::Ready;
    }

    fn ensure_ready(&self) -> ReplayResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ReplayError::NotReady)
        }
    }

    pub fn cursor(&self) -> f64 {
        self.clock.cursor()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }

    pub fn max_time(&self) -> f64 {
        self.clock.max_time()
    }

    pub fn progress(&self) -> f64 {
        self.clock.progress()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.clock.playback_state()
    }

    pub fn pending_tick(&self) -> Option<TickToken> {
        self.clock.pending_tick()
    }

    /// Start playback. Returns the first scheduled tick, if any.
    pub fn play(&mut self) -> ReplayResult<Option<TickToken>> {
        self.ensure_ready()?;
        Ok(self.clock.play())
    }

    pub fn pause(&mut self) -> ReplayResult<()> {
        self.ensure_ready()?;
        self.clock.pause();
        Ok(())
    }

    pub fn toggle(&mut self) -> ReplayResult<Option<TickToken>> {
        self.ensure_ready()?;
        Ok(self.clock.toggle())
    }

    /// Move the cursor; out-of-range times are clamped.
    pub fn seek(&mut self, time: f64) -> ReplayResult<()> {
        self.ensure_ready()?;
        self.clock.seek(time);
        Ok(())
    }

    /// Change the playback multiplier; clamped into `[0.5, 10]`.
    ///
    /// Accepted in every state, so a chosen speed survives reloads.
    pub fn set_speed(&mut self, speed: f64) {
        self.clock.set_speed(speed);
    }

    /// Run a scheduled tick. Stale tokens are ignored.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        self.clock.tick(token)
    }

    /// Apply a user intent. Returns a newly scheduled tick when the input
    /// started playback.
    pub fn apply(&mut self, input: TransportInput) -> ReplayResult<Option<TickToken>> {
        match input {
            TransportInput::SpeedUp => {
                self.set_speed((self.speed() * 2.0).min(MAX_SPEED));
                return Ok(None);
            }
            TransportInput::SlowDown => {
                self.set_speed((self.speed() / 2.0).max(MIN_SPEED));
                return Ok(None);
            }
            _ => {}
        }

        self.ensure_ready()?;
        let cursor = self.cursor();
        let target = match input {
            TransportInput::TogglePlay => return self.toggle(),
            TransportInput::SeekBackward => Some(cursor - self.settings.seek_step),
            TransportInput::SeekForward => Some(cursor + self.settings.seek_step),
            TransportInput::Scrub(fraction) => {
                let fraction = if fraction.is_nan() { 0.0 } else { fraction };
                Some(fraction.clamp(0.0, 1.0) * self.max_time())
            }
            TransportInput::JumpToStart => Some(0.0),
            TransportInput::JumpToEnd => Some(self.max_time()),
            TransportInput::NextMarker => {
                timeline::next_marker(self.markers(), cursor).map(|marker| marker.time)
            }
            TransportInput::PreviousMarker => {
                timeline::previous_marker(self.markers(), cursor).map(|marker| marker.time)
            }
            TransportInput::SpeedUp | TransportInput::SlowDown => None,
        };

        if let Some(target) = target {
            self.clock.seek(target);
        }
        Ok(None)
    }

    /// Timeline markers of the loaded session.
    pub fn markers(&self) -> &[Marker] {
        self.store.as_ref().map(EventStore::markers).unwrap_or(&[])
    }

    /// Interpolated aircraft at `time`; empty when nothing is loaded.
    pub fn state_at(&self, time: f64) -> Vec<Aircraft> {
        self.store
            .as_ref()
            .map(|store| store.state_at(time))
            .unwrap_or_default()
    }

    /// Interpolated aircraft at the cursor.
    pub fn current_aircraft(&self) -> Vec<Aircraft> {
        self.state_at(self.cursor())
    }

    /// Decisions made up to the cursor, joined with their outcomes.
    pub fn decisions_to_date(&self) -> Vec<DecisionEntry> {
        self.store
            .as_ref()
            .map(|store| views::decisions_until(store, self.cursor()))
            .unwrap_or_default()
    }

    /// Session metrics up to the cursor.
    pub fn metrics_to_date(&self) -> Metrics {
        self.store
            .as_ref()
            .map(|store| views::metrics_until(store, self.cursor()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::ManualTimeSource;
    use serde_json::json;

    fn session() -> Vec<Value> {
        vec![
            json!({"event_type": "session_start", "metadata": {"model": "m"}}),
            json!({"event_type": "state_snapshot", "game_time": 0.0, "aircraft": [
                {"callsign": "AC1", "position": [0, 0], "altitude": 1000, "heading": 350, "speed": 200}
            ]}),
            json!({"event_type": "conflict", "game_time": 20.0, "aircraft1": "AC1",
                   "aircraft2": "AC2", "separation_nm": 2.0, "required_nm": 3.0}),
            json!({"event_type": "ils_clearance", "game_time": 45.0, "callsign": "AC1",
                   "runway": "09"}),
            json!({"event_type": "state_snapshot", "game_time": 10.0, "aircraft": [
                {"callsign": "AC1", "position": [10, 0], "altitude": 2000, "heading": 10, "speed": 200}
            ]}),
            json!({"event_type": "landing", "game_time": 60.0}),
        ]
    }

    fn ready_view() -> (ReplayView<ManualTimeSource>, ManualTimeSource) {
        let source = ManualTimeSource::new();
        let mut view = ReplayView::new(source.clone(), PlaybackSettings::default());
        view.load(&session()).expect("load");
        (view, source)
    }

    #[test]
    fn seek_outside_bounds_clamps() {
        let (mut view, _) = ready_view();
        view.seek(-10.0).expect("seek");
        assert_eq!(view.cursor(), 0.0);
        view.seek(1_000.0).expect("seek");
        assert_eq!(view.cursor(), 60.0);
    }

    #[test]
    fn keyboard_shortcuts_drive_transport() {
        let (mut view, _) = ready_view();
        view.seek(30.0).expect("seek");

        view.apply(TransportInput::SeekBackward).expect("left");
        assert_eq!(view.cursor(), 25.0);
        view.apply(TransportInput::SeekForward).expect("right");
        view.apply(TransportInput::SeekForward).expect("right");
        assert_eq!(view.cursor(), 35.0);

        let token = view
            .apply(TransportInput::from_char(' ').expect("space"))
            .expect("toggle");
        assert!(token.is_some());
        assert!(view.is_playing());
        view.apply(TransportInput::TogglePlay).expect("toggle");
        assert!(!view.is_playing());
    }

    #[test]
    fn speed_shortcuts_double_and_halve_within_bounds() {
        let (mut view, _) = ready_view();
        for _ in 0..6 {
            view.apply(TransportInput::from_char('+').expect("plus")).expect("faster");
        }
        assert_eq!(view.speed(), 10.0);
        view.apply(TransportInput::from_char('=').expect("equals")).expect("faster");
        assert_eq!(view.speed(), 10.0);
        for _ in 0..6 {
            view.apply(TransportInput::SlowDown).expect("slower");
        }
        assert_eq!(view.speed(), 0.5);
    }

    #[test]
    fn scrub_maps_fraction_to_time() {
        let (mut view, _) = ready_view();
        view.apply(TransportInput::Scrub(0.25)).expect("scrub");
        assert_eq!(view.cursor(), 15.0);
        view.apply(TransportInput::Scrub(1.7)).expect("scrub");
        assert_eq!(view.cursor(), 60.0);
        view.apply(TransportInput::Scrub(-0.2)).expect("scrub");
        assert_eq!(view.cursor(), 0.0);
    }

    #[test]
    fn marker_jumps_follow_timeline() {
        let (mut view, _) = ready_view();
        view.apply(TransportInput::NextMarker).expect("next");
        assert_eq!(view.cursor(), 20.0);
        view.apply(TransportInput::NextMarker).expect("next");
        assert_eq!(view.cursor(), 45.0);
        view.apply(TransportInput::NextMarker).expect("next");
        assert_eq!(view.cursor(), 45.0);
        view.apply(TransportInput::PreviousMarker).expect("previous");
        assert_eq!(view.cursor(), 20.0);
        view.apply(TransportInput::JumpToEnd).expect("end");
        assert_eq!(view.cursor(), 60.0);
        view.apply(TransportInput::JumpToStart).expect("start");
        assert_eq!(view.cursor(), 0.0);
    }

    #[test]
    fn playback_advances_interpolated_state() {
        let (mut view, time) = ready_view();
        view.set_speed(2.0);
        let token = view.play().expect("play").expect("token");
        time.advance_secs(2.5);
        view.tick(token);
        assert!((view.cursor() - 5.0).abs() < 1e-9);

        let aircraft = view.current_aircraft();
        assert_eq!(aircraft.len(), 1);
        assert!((aircraft[0].altitude - 1500.0).abs() < 1e-9);
        assert!(aircraft[0].heading.abs() < 1e-9);
        assert_eq!(aircraft[0].position, (5.0, 0.0));
    }

    #[test]
    fn commands_are_rejected_while_loading() {
        let (mut view, _) = ready_view();
        view.begin_load();
        assert_eq!(view.state(), &ViewState::Loading);
        assert_eq!(view.play(), Err(ReplayError::NotReady));
        assert_eq!(view.seek(3.0), Err(ReplayError::NotReady));
        assert_eq!(
            view.apply(TransportInput::SeekForward),
            Err(ReplayError::NotReady)
        );
        assert!(view.current_aircraft().is_empty());
        assert!(view.markers().is_empty());

        view.finish_load(&session()).expect("load");
        assert!(view.is_ready());
        assert!(view.play().expect("play").is_some());
    }

    #[test]
    fn reload_cancels_pending_tick_and_resets_cursor() {
        let (mut view, time) = ready_view();
        view.set_speed(4.0);
        view.seek(30.0).expect("seek");
        let token = view.play().expect("play").expect("token");

        view.load(&session()).expect("reload");
        time.advance_secs(1.0);
        assert_eq!(view.tick(token), TickOutcome::Stale);
        assert_eq!(view.cursor(), 0.0);
        assert!(!view.is_playing());
        assert_eq!(view.speed(), 4.0);
    }

    #[test]
    fn failed_load_leaves_no_session() {
        let (mut view, _) = ready_view();
        let err = view
            .load(&[json!({"event_type": "decision"})])
            .expect_err("malformed");
        assert!(matches!(err, ReplayError::MalformedEvent { index: 0, .. }));
        assert!(matches!(view.state(), ViewState::Failed(_)));
        assert!(view.store().is_none());
        assert_eq!(view.max_time(), 0.0);
    }

    #[test]
    fn empty_session_is_inert() {
        let source = ManualTimeSource::new();
        let mut view = ReplayView::new(source, PlaybackSettings::default());
        view.load(&[]).expect("empty load");
        assert_eq!(view.max_time(), 0.0);
        assert!(view.state_at(12.0).is_empty());
        assert_eq!(view.play(), Ok(None));
        assert!(!view.is_playing());
        view.apply(TransportInput::SeekForward).expect("seek");
        assert_eq!(view.cursor(), 0.0);
    }

    #[test]
    fn close_cancels_pending_tick() {
        let (mut view, time) = ready_view();
        let token = view.play().expect("play").expect("token");
        view.close();
        time.advance_secs(1.0);
        assert_eq!(view.tick(token), TickOutcome::Stale);
        assert_eq!(view.state(), &ViewState::Idle);
        assert_eq!(view.pending_tick(), None);
    }

    #[test]
    fn tick_from_another_view_is_stale() {
        let (mut first, first_time) = ready_view();
        let (mut second, second_time) = ready_view();
        let first_token = first.play().expect("play").expect("token");
        second.play().expect("play");
        first_time.advance_secs(1.0);
        second_time.advance_secs(1.0);

        assert_eq!(second.tick(first_token), TickOutcome::Stale);
        assert_eq!(second.cursor(), 0.0);
        assert!(matches!(first.tick(first_token), TickOutcome::Rescheduled(_)));
        assert!((first.cursor() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn views_are_independent() {
        let (mut first, _) = ready_view();
        let (second, _) = ready_view();
        first.seek(40.0).expect("seek");
        assert_eq!(second.cursor(), 0.0);
    }
}
