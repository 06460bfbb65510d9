//! Client credentials and the OAuth token.
//!
//! Credentials: env vars named by config, then the credential store, then an
//! interactive prompt (stored afterwards). Token: stored token if still
//! valid, refreshed if expired, else the browser flow.

use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use greyris_auth::{new_state, Authenticator, CallbackServer, Token};
use greyris_config::{resolve_secrets, AppConfig, ResolvedSecrets};
use greyris_db::{KEY_CLIENT_ID, KEY_CLIENT_SECRET, KEY_TOKEN_JSON};
use sqlx::SqlitePool;
use tracing::{info, warn};

const CREDENTIAL_LEN: usize = 32;

/// Refresh this long before the real expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub async fn login(cfg: &AppConfig, pool: &SqlitePool) -> Result<()> {
    let auth = authenticator(cfg, pool).await?;
    let token = authorize(cfg, &auth).await?;
    store_token(pool, &token).await?;
    println!("logged_in=true expires_at={}", token.expires_at.to_rfc3339());
    Ok(())
}

pub async fn logout(pool: &SqlitePool) -> Result<()> {
    let existed = greyris_db::delete_credential(pool, KEY_TOKEN_JSON).await?;
    println!("logged_out={existed}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Usable access token for API calls.
pub async fn access_token(cfg: &AppConfig, pool: &SqlitePool) -> Result<Token> {
    let auth = authenticator(cfg, pool).await?;

    if let Some(token) = stored_token(pool).await? {
        if !token.is_expired(Utc::now(), chrono::Duration::seconds(EXPIRY_SKEW_SECS)) {
            return Ok(token);
        }
        if let Some(rt) = token.refresh_token.as_deref() {
            match auth.refresh(rt).await {
                Ok(fresh) => {
                    store_token(pool, &fresh).await?;
                    return Ok(fresh);
                }
                Err(e) => warn!(error = %e, "token refresh failed; authorizing again"),
            }
        }
    }

    let token = authorize(cfg, &auth).await?;
    store_token(pool, &token).await?;
    Ok(token)
}

async fn authenticator(cfg: &AppConfig, pool: &SqlitePool) -> Result<Authenticator> {
    let secrets = resolve_secrets(cfg);
    let (client_id, client_secret) = credentials(pool, &secrets).await?;
    Ok(Authenticator::new_with_base_url(
        client_id,
        client_secret,
        cfg.auth.redirect_url.clone(),
        cfg.spotify.accounts_base_url.clone(),
    ))
}

/// Browser flow: print the URL, wait for the callback, exchange the code.
async fn authorize(cfg: &AppConfig, auth: &Authenticator) -> Result<Token> {
    let state = new_state();
    let server = CallbackServer::bind(auth.redirect_url()).await?;
    let url = auth.authorize_url(&state)?;

    eprintln!("Open this URL in your browser to authorize greyris:\n\n  {url}\n");

    let code = server
        .wait(&state, Duration::from_secs(cfg.auth.timeout_secs), async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    let token = auth.exchange_code(&code).await?;
    info!("authorized");
    Ok(token)
}

async fn stored_token(pool: &SqlitePool) -> Result<Option<Token>> {
    let Some(raw) = greyris_db::get_credential(pool, KEY_TOKEN_JSON).await? else {
        return Ok(None);
    };
    match Token::from_json(&raw) {
        Ok(t) => Ok(Some(t)),
        Err(e) => {
            warn!(error = %e, "stored token is unreadable; ignoring it");
            Ok(None)
        }
    }
}

async fn store_token(pool: &SqlitePool, token: &Token) -> Result<()> {
    let raw = token.to_json().context("token serialize failed")?;
    greyris_db::put_credential(pool, KEY_TOKEN_JSON, &raw).await
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

async fn credentials(pool: &SqlitePool, secrets: &ResolvedSecrets) -> Result<(String, String)> {
    let id = credential(pool, KEY_CLIENT_ID, "Client ID", secrets.client_id.as_deref()).await?;
    let secret = credential(
        pool,
        KEY_CLIENT_SECRET,
        "Client Secret",
        secrets.client_secret.as_deref(),
    )
    .await?;
    Ok((id, secret))
}

async fn credential(pool: &SqlitePool, key: &str, label: &str, from_env: Option<&str>) -> Result<String> {
    if let Some(v) = from_env {
        return Ok(v.to_string());
    }
    if let Some(v) = greyris_db::get_credential(pool, key).await? {
        return Ok(v);
    }
    let stdin = std::io::stdin();
    let v = prompt_credential(label, &mut stdin.lock(), &mut std::io::stderr())?;
    greyris_db::put_credential(pool, key, &v).await?;
    Ok(v)
}

/// Ask until a 32-character value is entered. EOF is an error.
pub fn prompt_credential<R: BufRead, W: Write>(label: &str, input: &mut R, out: &mut W) -> Result<String> {
    loop {
        write!(out, "Enter your {label}: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no {label} provided (stdin closed)");
        }
        let v = line.trim();
        if v.chars().count() == CREDENTIAL_LEN {
            return Ok(v.to_string());
        }
        writeln!(
            out,
            "error: invalid {label} (length of it must be {CREDENTIAL_LEN} characters)"
        )?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const GOOD: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn prompt_retries_until_valid_length() {
        let mut input = Cursor::new(format!("short\n{GOOD}\n"));
        let mut out = Vec::new();
        let v = prompt_credential("Client ID", &mut input, &mut out).unwrap();
        assert_eq!(v, GOOD);

        let shown = String::from_utf8(out).unwrap();
        assert_eq!(shown.matches("Enter your Client ID: ").count(), 2);
        assert!(shown.contains("must be 32 characters"));
    }

    #[test]
    fn prompt_fails_on_eof() {
        let mut input = Cursor::new("nope\n");
        let mut out = Vec::new();
        let err = prompt_credential("Client Secret", &mut input, &mut out).unwrap_err();
        assert!(err.to_string().contains("stdin closed"));
    }

    #[tokio::test]
    async fn env_and_store_take_precedence_over_prompt() {
        let pool = greyris_db::connect_in_memory().await.unwrap();
        greyris_db::put_credential(&pool, KEY_CLIENT_SECRET, "stored-secret")
            .await
            .unwrap();

        let secrets = ResolvedSecrets {
            client_id: Some("env-id".to_string()),
            client_secret: None,
        };
        let (id, secret) = credentials(&pool, &secrets).await.unwrap();
        assert_eq!(id, "env-id");
        assert_eq!(secret, "stored-secret");
    }

    #[tokio::test]
    async fn unreadable_stored_token_is_ignored() {
        let pool = greyris_db::connect_in_memory().await.unwrap();
        greyris_db::put_credential(&pool, KEY_TOKEN_JSON, "{not json")
            .await
            .unwrap();
        assert!(stored_token(&pool).await.unwrap().is_none());
    }
}
