use std::path::PathBuf;
use thiserror::Error;

/// Fatal, setup-time failures. Anything here aborts the process before
/// polling starts; once directories or configuration are unusable there is
/// nothing to recover.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("File I/O Error: {0}")]
    Io(String),
}

// Allow conversion from std::io::Error to AppError::Io
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

/// Per-cycle snapshot fetch failures. A poll loop logs these with the
/// camera identity and proceeds to its next scheduled cycle; they never
/// escalate past the loop.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("failed to write snapshot to '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
