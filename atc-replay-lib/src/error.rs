//! Error type shared across the replay engine.

/// Result alias for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Errors surfaced by the replay engine.
///
/// Once a session is loaded, playback is arithmetic over validated data and
/// cannot fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplayError {
    /// An event in the raw log is missing a required field or has a payload
    /// that does not match its kind.
    #[error("malformed event at index {index}: {reason}")]
    MalformedEvent { index: usize, reason: String },

    /// A transport command arrived while no session is loaded.
    #[error("session is not ready")]
    NotReady,
}

impl ReplayError {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            index,
            reason: reason.into(),
        }
    }
}
