use atc_replay_lib::ReplayError;

/// Errors surfaced by the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("missing input: pass an events file or a session id")]
    MissingInput,
}
