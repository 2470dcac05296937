//! # ATC Replay Library
//!
//! This library provides the session replay engine for recorded runs of the
//! AI air-traffic-control agent. It turns a session's event log into a
//! scrubbable, time-indexed view of the world: interpolated aircraft state,
//! timeline markers, decisions to date, and a virtual playback clock with
//! transport controls.

pub mod constants;
pub mod error;
pub mod events;
pub mod interpolate;
pub mod playback;
pub mod store;
pub mod timeline;
pub mod views;

pub use error::{ReplayError, ReplayResult};
pub use events::{Aircraft, Event, EventKind, Snapshot};
pub use playback::{
    ManualTimeSource, PlaybackClock, PlaybackSettings, PlaybackState, ReplayView,
    SystemTimeSource, TickOutcome, TickToken, TimeSource, TransportInput, ViewState,
};
pub use store::EventStore;
pub use timeline::{Marker, MarkerKind};
