use std::collections::HashMap;
use std::time::Duration;

use greyris_reconcile::{BoxError, CollectionFetcher, Element, MoveExecutor, Normalizer};
use reqwest::{header::RETRY_AFTER, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::model::{ErrorEnvelope, Page, PlaylistItem, ReorderBody, SnapshotResponse};
use crate::{ApiError, PlaylistId};

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_PAGE_LIMIT: u32 = 100;
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Longer `Retry-After` waits are reported instead of slept through.
const MAX_RETRY_WAIT_SECS: u64 = 60;
const TRACK_FIELDS: &str =
    "items(track(uri,artists(name),album(release_date),disc_number,track_number)),next,total";

/// Identity of one playlist entry. A track can appear several times in the
/// same playlist, so the URI alone is not unique; `occurrence` counts earlier
/// entries with the same URI in fetch order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    pub uri: String,
    pub occurrence: u32,
}

/// Convert fetched items (in playlist order) into reconciler elements.
///
/// Key: first artist, album release date, then `disc * 1000 + track`.
/// Unavailable items (`track: null`) get an empty key and sort first.
pub fn items_to_elements(items: &[PlaylistItem], normalizer: &Normalizer) -> Vec<Element<ItemId>> {
    let mut seen: HashMap<&str, u32> = HashMap::new();
    items
        .iter()
        .map(|item| {
            let (uri, key) = match &item.track {
                Some(t) => {
                    let artist = t.artists.first().map(|a| a.name.as_str()).unwrap_or("");
                    let released = t
                        .album
                        .as_ref()
                        .and_then(|a| a.release_date.clone())
                        .unwrap_or_default();
                    let tie = t
                        .disc_number
                        .saturating_mul(1000)
                        .saturating_add(t.track_number);
                    (
                        t.uri.as_deref().unwrap_or(""),
                        normalizer.key(artist, released, tie),
                    )
                }
                None => ("", normalizer.key("", "", 0)),
            };
            let n = seen.entry(uri).or_insert(0);
            let id = ItemId {
                uri: uri.to_string(),
                occurrence: *n,
            };
            *n += 1;
            Element::new(id, key)
        })
        .collect()
}

/// Authenticated Web API client.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    page_limit: u32,
    max_retries: u32,
    normalizer: Normalizer,
}

impl std::fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"<REDACTED>")
            .field("page_limit", &self.page_limit)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl SpotifyClient {
    pub fn new(access_token: String) -> Result<Self, ApiError> {
        Self::new_with_base_url(access_token, DEFAULT_API_BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    pub fn new_with_base_url(
        access_token: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            access_token,
            page_limit: MAX_PAGE_LIMIT,
            max_retries: DEFAULT_MAX_RETRIES,
            normalizer: Normalizer::default(),
        })
    }

    /// Items per page, clamped to the API's 1..=100.
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn tracks_url(&self, playlist: &PlaylistId) -> String {
        format!("{}/playlists/{}/tracks", self.base(), playlist)
    }

    /// Every item of the playlist in its current order.
    pub async fn fetch_items(&self, playlist: &PlaylistId) -> Result<Vec<Element<ItemId>>, ApiError> {
        let limit = self.page_limit.to_string();
        let first = Url::parse_with_params(
            &self.tracks_url(playlist),
            &[
                ("limit", limit.as_str()),
                ("offset", "0"),
                ("fields", TRACK_FIELDS),
            ],
        )
        .map_err(|e| ApiError::Transport(e.to_string()))?;

        let mut items = Vec::new();
        let mut next = Some(first.to_string());
        let mut pages = 0usize;
        while let Some(url) = next {
            let page: Page = self.get_json(&url).await?;
            pages += 1;
            debug!(playlist = %playlist, page = pages, items = page.items.len(), "page fetched");
            items.extend(page.items);
            next = page.next;
        }

        info!(playlist = %playlist, pages, items = items.len(), "playlist fetched");
        Ok(items_to_elements(&items, &self.normalizer))
    }

    /// Move the item at `from` so that it ends up at `to`.
    ///
    /// The reorder endpoint takes an `insert_before` position measured before
    /// the item is removed, so a forward move targets `to + 1`.
    pub async fn move_item(&self, playlist: &PlaylistId, from: usize, to: usize) -> Result<(), ApiError> {
        if from == to {
            return Ok(());
        }
        let body = ReorderBody {
            range_start: from,
            insert_before: if to > from { to + 1 } else { to },
            range_length: 1,
        };
        let url = self.tracks_url(playlist);
        let resp = self.send(|| self.http.put(&url).json(&body)).await?;
        let snap: SnapshotResponse = decode(resp).await?;
        debug!(
            playlist = %playlist,
            from,
            to,
            snapshot = snap.snapshot_id.as_deref().unwrap_or("-"),
            "moved"
        );
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let resp = self.send(|| self.http.get(url)).await?;
        decode(resp).await
    }

    /// Send with bearer auth; 429 answers are retried after `Retry-After`
    /// seconds, at most `max_retries` times. A wait above
    /// `MAX_RETRY_WAIT_SECS` fails at once with `RateLimited`.
    async fn send<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            let resp = build()
                .bearer_auth(&self.access_token)
                .send()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            let status = resp.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry_after_secs(&resp);
                if attempt >= self.max_retries || wait > MAX_RETRY_WAIT_SECS {
                    return Err(ApiError::RateLimited {
                        retry_after_secs: wait,
                    });
                }
                attempt += 1;
                warn!(attempt, wait_secs = wait, "rate limited; retrying");
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorEnvelope>(&body)
                    .ok()
                    .map(|e| e.error.message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(body);
                return Err(ApiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(resp);
        }
    }
}

fn retry_after_secs(resp: &Response) -> u64 {
    resp.headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let body = resp
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Reconciler collaborators
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl CollectionFetcher for SpotifyClient {
    type Id = ItemId;

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Element<ItemId>>, BoxError> {
        let playlist = PlaylistId::parse(collection)?;
        Ok(self.fetch_items(&playlist).await?)
    }
}

#[async_trait::async_trait]
impl MoveExecutor for SpotifyClient {
    async fn move_one(&self, collection: &str, from: usize, to: usize) -> Result<(), BoxError> {
        let playlist = PlaylistId::parse(collection)?;
        Ok(self.move_item(&playlist, from, to).await?)
    }
}
