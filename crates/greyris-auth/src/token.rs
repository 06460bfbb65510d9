use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// OAuth token as persisted between runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<REDACTED>")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<REDACTED>"),
            )
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Token {
    /// `true` once `now + skew` reaches the expiry.
    pub fn is_expired(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        now + skew >= self.expires_at
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Token endpoint success body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// A refresh response may omit `refresh_token`; the previous one stays valid.
    /// An `expires_in` that does not fit a timestamp is a decode error.
    pub(crate) fn into_token(
        self,
        now: DateTime<Utc>,
        previous_refresh: Option<String>,
    ) -> Result<Token, AuthError> {
        let expires_at = Duration::try_seconds(self.expires_in)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| AuthError::Decode(format!("expires_in out of range: {}", self.expires_in)))?;
        Ok(Token {
            access_token: self.access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token.or(previous_refresh),
            scope: self.scope,
            expires_at,
        })
    }
}

/// Token endpoint error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TokenErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenErrorResponse {
    pub(crate) fn message(&self) -> String {
        match (&self.error, &self.error_description) {
            (Some(e), Some(d)) => format!("{e}: {d}"),
            (Some(e), None) => e.clone(),
            (None, Some(d)) => d.clone(),
            (None, None) => "unknown".to_string(),
        }
    }
}
