use std::fmt;

/// Errors returned by [`crate::SpotifyClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network or transport failure.
    Transport(String),
    /// The API answered with a non-success status.
    Api { status: u16, message: String },
    /// A response payload could not be decoded.
    Decode(String),
    /// Still rate limited after the configured number of retries.
    RateLimited { retry_after_secs: u64 },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Api { status, message } => {
                write!(f, "spotify api error status={status}: {message}")
            }
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
            ApiError::RateLimited { retry_after_secs } => {
                write!(f, "rate limited (retry after {retry_after_secs}s)")
            }
        }
    }
}

impl std::error::Error for ApiError {}
