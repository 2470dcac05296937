//! Playback clock and transport controls for replay views.
//!
//! The clock is a single-threaded cooperative state machine: starting
//! playback hands out a [`TickToken`] and the driver calls
//! [`PlaybackClock::tick`] with it once the token is due. Every tick that
//! keeps playing hands out the next token. Pausing, reloading or dropping
//! the clock invalidates the outstanding token, so a late tick is a no-op.

mod clock;
mod settings;
mod time_source;
mod transport;

pub use clock::{ClockState, PlaybackClock, PlaybackState, TickOutcome, TickToken};
pub use settings::PlaybackSettings;
pub use time_source::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use transport::{ReplayView, TransportInput, ViewState};
