use std::time::Duration;

use anyhow::{bail, Context, Result};
use greyris_config::AppConfig;
use greyris_reconcile::{sort_collection, Normalizer, ReconcileReport, SortOptions};
use greyris_spotify::SpotifyClient;
use sqlx::SqlitePool;
use tracing::info;

use super::{resolve_targets, session};

/// Resolve targets, authenticate, then sort each playlist in turn.
/// The first failing playlist aborts the run; earlier ones stay sorted.
pub async fn run(
    cfg: &AppConfig,
    pool: &SqlitePool,
    args: &[String],
    all: bool,
    dry_run: bool,
) -> Result<()> {
    let targets = resolve_targets(pool, args, all).await?;
    if targets.is_empty() {
        bail!("nothing to sort: pass a playlist link or alias, or use --all");
    }

    let token = session::access_token(cfg, pool).await?;
    let client = SpotifyClient::new_with_base_url(
        token.access_token,
        cfg.spotify.api_base_url.clone(),
        Duration::from_secs(cfg.spotify.request_timeout_secs),
    )?
    .with_page_limit(cfg.spotify.page_limit)
    .with_max_retries(cfg.spotify.max_retries)
    .with_normalizer(Normalizer::new(&cfg.sort.strip_prefixes));

    let opts = SortOptions { dry_run };
    for id in &targets {
        let report = sort_collection(id.as_str(), &client, &client, opts)
            .await
            .with_context(|| format!("sorting playlist {id} failed"))?;
        print_report(&report);
    }

    info!(playlists = targets.len(), dry_run, "done");
    Ok(())
}

fn print_report(report: &ReconcileReport) {
    println!(
        "playlist={} tracks={} moves={}",
        report.collection,
        report.total,
        report.moves.len()
    );
    if report.dry_run {
        for m in &report.moves {
            println!("move from={} to={}", m.from, m.to);
        }
    }
}
