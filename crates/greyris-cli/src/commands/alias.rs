//! Alias commands: `add`, `remove`, `list`.

use anyhow::{bail, Result};
use greyris_spotify::PlaylistId;
use sqlx::SqlitePool;
use tracing::warn;

/// Store `alias -> canonical link`. Overwrites an existing alias.
pub async fn add(pool: &SqlitePool, alias: &str, link: &str) -> Result<()> {
    let alias = alias.trim();
    if alias.is_empty() {
        bail!("alias must not be empty");
    }
    // Would be shadowed: arguments that parse as a playlist never hit the alias store.
    if PlaylistId::parse(alias).is_ok() {
        bail!("alias '{alias}' looks like a playlist id; pick another name");
    }
    let id = PlaylistId::parse(link)?;
    let canonical = id.canonical_link();

    greyris_db::put_alias(pool, alias, &canonical).await?;
    println!("added=true alias={alias} link={canonical}");
    Ok(())
}

pub async fn remove(pool: &SqlitePool, aliases: &[String]) -> Result<()> {
    for a in aliases {
        let existed = greyris_db::delete_alias(pool, a).await?;
        if !existed {
            warn!(alias = %a, "alias not found");
        }
        println!("removed={existed} alias={a}");
    }
    Ok(())
}

pub async fn list(pool: &SqlitePool) -> Result<()> {
    for row in greyris_db::list_aliases(pool).await? {
        println!("{}: {}", row.name, row.link);
    }
    Ok(())
}
