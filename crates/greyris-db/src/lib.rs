//! greyris-db
//!
//! Local key-value storage: client credentials, the cached OAuth token and
//! playlist aliases. One SQLite file under the data dir; schema is applied
//! with embedded migrations on connect.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

pub const DB_FILE_NAME: &str = "greyris.db";

/// Credential store keys.
pub const KEY_CLIENT_ID: &str = "client_id";
pub const KEY_CLIENT_SECRET: &str = "client_secret";
pub const KEY_TOKEN_JSON: &str = "token_json";

pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

/// Open (creating if needed) `<data_dir>/greyris.db` and apply migrations.
pub async fn connect(data_dir: &Path) -> Result<SqlitePool> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

    let path = db_path(data_dir);
    let opts = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(opts)
        .await
        .with_context(|| format!("failed to open sqlite db {}", path.display()))?;

    migrate(&pool).await?;
    debug!(path = %path.display(), "db ready");
    Ok(pool)
}

/// In-memory database with the schema applied. A single connection, because
/// every SQLite in-memory connection is its own database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("failed to open in-memory sqlite")?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

pub async fn get_credential(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("select value from credentials where key = ?1")
        .bind(key)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("get_credential({key}) failed"))?;
    Ok(row.map(|(v,)| v))
}

/// Insert or overwrite.
pub async fn put_credential(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        insert into credentials (key, value) values (?1, ?2)
        on conflict(key) do update set value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .with_context(|| format!("put_credential({key}) failed"))?;
    Ok(())
}

/// Returns whether a row was removed.
pub async fn delete_credential(pool: &SqlitePool, key: &str) -> Result<bool> {
    let res = sqlx::query("delete from credentials where key = ?1")
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("delete_credential({key}) failed"))?;
    Ok(res.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRow {
    pub name: String,
    pub link: String,
}

/// Add or update an alias.
pub async fn put_alias(pool: &SqlitePool, name: &str, link: &str) -> Result<()> {
    sqlx::query(
        r#"
        insert into aliases (name, link) values (?1, ?2)
        on conflict(name) do update set
          link = excluded.link,
          updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
        "#,
    )
    .bind(name)
    .bind(link)
    .execute(pool)
    .await
    .with_context(|| format!("put_alias({name}) failed"))?;
    Ok(())
}

pub async fn get_alias(pool: &SqlitePool, name: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("select link from aliases where name = ?1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("get_alias({name}) failed"))?;
    Ok(row.map(|(l,)| l))
}

/// Returns whether the alias existed.
pub async fn delete_alias(pool: &SqlitePool, name: &str) -> Result<bool> {
    let res = sqlx::query("delete from aliases where name = ?1")
        .bind(name)
        .execute(pool)
        .await
        .with_context(|| format!("delete_alias({name}) failed"))?;
    Ok(res.rows_affected() > 0)
}

/// All aliases, sorted by name.
pub async fn list_aliases(pool: &SqlitePool) -> Result<Vec<AliasRow>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("select name, link from aliases order by name asc")
            .fetch_all(pool)
            .await
            .context("list_aliases failed")?;
    Ok(rows
        .into_iter()
        .map(|(name, link)| AliasRow { name, link })
        .collect())
}
