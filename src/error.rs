use thiserror::Error;

/// Errors raised by the catalog database, the object store and capture import
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Photo not found: {0}")]
    PhotoNotFound(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Could not determine a directory for {0}")]
    NoDirectory(&'static str),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

/// Outcome of a failed vote.
///
/// `AlreadyVoted` is the expected answer for a repeat vote and carries no
/// mutation. `TransientFailure` is never retried by the coordinator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoteError {
    #[error("Voter already voted for this photo")]
    AlreadyVoted,

    #[error("Photo does not exist: {0}")]
    PhotoNotFound(String),

    #[error("Vote could not be recorded: {0}")]
    TransientFailure(String),
}

impl From<rusqlite::Error> for VoteError {
    fn from(err: rusqlite::Error) -> Self {
        VoteError::TransientFailure(err.to_string())
    }
}

impl From<LibraryError> for VoteError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::PhotoNotFound(id) => VoteError::PhotoNotFound(id),
            other => VoteError::TransientFailure(other.to_string()),
        }
    }
}

/// Errors raised while loading a recorded motion trace
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Trace file not found: {0}")]
    NotFound(String),

    #[error("Trace format error at sample {index}: {message}")]
    Format { index: usize, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
