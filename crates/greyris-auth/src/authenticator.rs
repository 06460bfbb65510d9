use chrono::Utc;
use reqwest::Url;
use tracing::{debug, info};

use crate::token::{TokenErrorResponse, TokenResponse};
use crate::{AuthError, Token};

/// Scopes needed to read and reorder private and public playlists.
pub const SCOPES: &[&str] = &[
    "playlist-read-private",
    "playlist-modify-private",
    "playlist-modify-public",
];

/// Fresh random value for the OAuth `state` parameter.
pub fn new_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Client credentials plus endpoints. Secrets are never logged.
#[derive(Clone)]
pub struct Authenticator {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    accounts_base_url: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("client_id", &"<REDACTED>")
            .field("client_secret", &"<REDACTED>")
            .field("redirect_url", &self.redirect_url)
            .field("accounts_base_url", &self.accounts_base_url)
            .finish()
    }
}

impl Authenticator {
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self::new_with_base_url(
            client_id,
            client_secret,
            redirect_url,
            "https://accounts.spotify.com".to_string(),
        )
    }

    pub fn new_with_base_url(
        client_id: String,
        client_secret: String,
        redirect_url: String,
        accounts_base_url: String,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_url,
            accounts_base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    fn base(&self) -> &str {
        self.accounts_base_url.trim_end_matches('/')
    }

    /// URL the user opens in a browser to grant access.
    pub fn authorize_url(&self, state: &str) -> Result<String, AuthError> {
        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            &format!("{}/authorize", self.base()),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_url.as_str()),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| AuthError::InvalidRedirect(e.to_string()))?;
        Ok(url.to_string())
    }

    /// Trade an authorization code for a token.
    pub async fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        info!("exchanging authorization code");
        self.token_request(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_url.as_str()),
            ],
            None,
        )
        .await
    }

    /// Get a new access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, AuthError> {
        info!("refreshing access token");
        self.token_request(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            Some(refresh_token.to_string()),
        )
        .await
    }

    async fn token_request(
        &self,
        form: &[(&str, &str)],
        previous_refresh: Option<String>,
    ) -> Result<Token, AuthError> {
        let url = format!("{}/api/token", self.base());
        let resp = self
            .http
            .post(url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            return Err(AuthError::Token {
                status: status.as_u16(),
                message: err.message(),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Decode(e.to_string()))?;
        debug!(expires_in = parsed.expires_in, "token issued");
        parsed.into_token(Utc::now(), previous_refresh)
    }
}
