// Error taxonomy shared by the library modules. The binary wraps these in
// `anyhow` at the edge; everything below `main` returns typed errors so a
// batch can stop on a rejected token instead of failing every account.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Authentication failed: {0}. Regenerate your token with the `user:follow` scope.")]
    Authentication(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Rate limited by GitHub: {0}")]
    RateLimit(String),
    #[error("GitHub API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("Could not decode GitHub response: {0}")]
    Decode(String),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Errors that end the run instead of being recorded against one account.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Configuration(_) | SyncError::Authentication(_))
    }

    /// The user pressed Ctrl-C while a prompt was waiting.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, SyncError::Io(e) if e.kind() == std::io::ErrorKind::Interrupted)
    }
}

/// Rejected selection expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionParseError {
    #[error("'{0}' is not a number or a range like 3-7")]
    Invalid(String),
    #[error("index {index} is out of range (1-{max})")]
    OutOfRange { index: usize, max: usize },
    #[error("range {start}-{end} is inverted")]
    InvertedRange { start: usize, end: usize },
}
