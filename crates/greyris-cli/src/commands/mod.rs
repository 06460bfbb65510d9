//! Command handlers for the `greyris` binary.
//!
//! Shared helpers live here; command logic lives in the submodules.

pub mod alias;
pub mod session;
pub mod sort;

use anyhow::{Context, Result};
use greyris_spotify::PlaylistId;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// A link, URI or id resolves directly; anything else is looked up as an alias.
pub async fn resolve_playlist(pool: &SqlitePool, arg: &str) -> Result<PlaylistId> {
    if let Ok(id) = PlaylistId::parse(arg) {
        return Ok(id);
    }
    let link = greyris_db::get_alias(pool, arg)
        .await?
        .with_context(|| format!("unknown playlist or alias: {arg}"))?;
    PlaylistId::parse(&link).with_context(|| format!("alias {arg} holds an invalid link"))
}

/// Explicit arguments first (in order), then every alias when `all` is set.
/// Duplicates are dropped so a playlist is never sorted twice in one run.
pub async fn resolve_targets(pool: &SqlitePool, args: &[String], all: bool) -> Result<Vec<PlaylistId>> {
    let mut out: Vec<PlaylistId> = Vec::new();
    for a in args {
        let id = resolve_playlist(pool, a).await?;
        if !out.contains(&id) {
            out.push(id);
        }
    }
    if all {
        for row in greyris_db::list_aliases(pool).await? {
            let id = PlaylistId::parse(&row.link)
                .with_context(|| format!("alias {} holds an invalid link", row.name))?;
            if !out.contains(&id) {
                out.push(id);
            }
        }
    }
    Ok(out)
}
