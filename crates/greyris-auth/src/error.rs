use std::fmt;

/// Errors from the authorization flow and the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The redirect URL cannot be served locally.
    InvalidRedirect(String),
    /// The callback listener could not bind.
    Bind(String),
    /// No callback arrived in time.
    Timeout { secs: u64 },
    /// The caller cancelled the wait (e.g. Ctrl-C).
    Cancelled,
    /// Callback `state` did not match the one we issued.
    StateMismatch,
    /// The user (or Spotify) refused authorization.
    Denied(String),
    /// Callback had neither `code` nor `error`.
    MissingCode,
    /// Network or transport failure talking to the token endpoint.
    Transport(String),
    /// Token endpoint answered with an error.
    Token { status: u16, message: String },
    /// A response payload could not be decoded.
    Decode(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidRedirect(msg) => write!(f, "invalid redirect url: {msg}"),
            AuthError::Bind(msg) => write!(f, "callback server bind failed: {msg}"),
            AuthError::Timeout { secs } => {
                write!(f, "authorization not completed within {secs}s")
            }
            AuthError::Cancelled => write!(f, "authorization cancelled"),
            AuthError::StateMismatch => write!(f, "authorization state mismatch"),
            AuthError::Denied(reason) => write!(f, "authorization denied: {reason}"),
            AuthError::MissingCode => write!(f, "callback carried no authorization code"),
            AuthError::Transport(msg) => write!(f, "transport error: {msg}"),
            AuthError::Token { status, message } => {
                write!(f, "token endpoint error status={status}: {message}")
            }
            AuthError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}
