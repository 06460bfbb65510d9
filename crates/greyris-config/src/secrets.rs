//! Runtime secret resolution.
//!
//! # Contract
//! - Config stores only **env var NAMES** (`auth.keys_env.*`).
//! - Callers invoke [`resolve_secrets`] once at startup and pass the result
//!   into constructors; `std::env::var` is not scattered across the codebase.
//! - `Debug` redacts values.
//! - Both credentials are optional here: the CLI falls back to the local
//!   credential store and finally to an interactive prompt.

use crate::AppConfig;

/// Spotify client credentials resolved from the environment.
#[derive(Clone, Default)]
pub struct ResolvedSecrets {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("client_id", &self.client_id.as_ref().map(|_| "<REDACTED>"))
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// Resolve a named environment variable.
/// Returns `None` if the variable is unset or its value is blank.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

pub fn resolve_secrets(config: &AppConfig) -> ResolvedSecrets {
    let names = &config.auth.keys_env;
    let resolved = ResolvedSecrets {
        client_id: resolve_env(&names.client_id),
        client_secret: resolve_env(&names.client_secret),
    };
    tracing::debug!(
        client_id_env = %names.client_id,
        client_id_set = resolved.client_id.is_some(),
        client_secret_env = %names.client_secret,
        client_secret_set = resolved.client_secret.is_some(),
        "resolved secrets from env"
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_values() {
        let s = ResolvedSecrets {
            client_id: Some("0123456789abcdef0123456789abcdef".to_string()),
            client_secret: None,
        };
        let dbg = format!("{s:?}");
        assert!(dbg.contains("<REDACTED>"));
        assert!(!dbg.contains("0123456789abcdef"));
        assert!(dbg.contains("client_secret: None"));
    }
}
