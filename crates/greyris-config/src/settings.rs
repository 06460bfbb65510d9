//! Typed settings. Every field has a default so a missing file, section or key
//! falls back cleanly.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSection,
    pub auth: AuthSection,
    pub spotify: SpotifySection,
    pub sort: SortSection,
}

/// `[storage]`: where the local database lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// `None` means [`default_data_dir`].
    pub data_dir: Option<PathBuf>,
}

/// `[auth]`: OAuth redirect + where client credentials come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub redirect_url: String,
    /// How long to wait for the browser callback.
    pub timeout_secs: u64,
    pub keys_env: KeysEnv,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            redirect_url: "http://localhost:8080/callback".to_string(),
            timeout_secs: 300,
            keys_env: KeysEnv::default(),
        }
    }
}

/// Env var NAMES holding the Spotify client credentials. Never the values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysEnv {
    pub client_id: String,
    pub client_secret: String,
}

impl Default for KeysEnv {
    fn default() -> Self {
        Self {
            client_id: "GREYRIS_CLIENT_ID".to_string(),
            client_secret: "GREYRIS_CLIENT_SECRET".to_string(),
        }
    }
}

/// `[spotify]`: Web API endpoints and HTTP behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifySection {
    pub api_base_url: String,
    pub accounts_base_url: String,
    /// Items per page when fetching a playlist (API maximum is 100).
    pub page_limit: u32,
    pub request_timeout_secs: u64,
    /// Attempts after a 429 before giving up.
    pub max_retries: u32,
}

impl Default for SpotifySection {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spotify.com/v1".to_string(),
            accounts_base_url: "https://accounts.spotify.com".to_string(),
            page_limit: 100,
            request_timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// `[sort]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSection {
    /// Leading words ignored when ordering by artist (matched case-insensitively).
    pub strip_prefixes: Vec<String>,
}

impl Default for SortSection {
    fn default() -> Self {
        Self {
            strip_prefixes: vec!["the ".to_string()],
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.spotify.page_limit == 0 || self.spotify.page_limit > 100 {
            bail!(
                "CONFIG_INVALID spotify.page_limit={} (expected 1..=100)",
                self.spotify.page_limit
            );
        }
        if self.auth.timeout_secs == 0 {
            bail!("CONFIG_INVALID auth.timeout_secs must be >= 1");
        }
        if !self.auth.redirect_url.starts_with("http://") {
            bail!(
                "CONFIG_INVALID auth.redirect_url='{}' (expected a local http:// URL)",
                self.auth.redirect_url
            );
        }
        Ok(())
    }

    /// Configured data dir, or [`default_data_dir`].
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(default_data_dir)
    }
}

/// `$GREYRIS_HOME`, else `$HOME/.greyris`, else `./.greyris`.
pub fn default_data_dir() -> PathBuf {
    if let Some(p) = env::var_os("GREYRIS_HOME") {
        return PathBuf::from(p);
    }
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".greyris"),
        None => PathBuf::from(".greyris"),
    }
}
