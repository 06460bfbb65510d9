//! Wire types for the subset of the Web API the client touches.

use serde::{Deserialize, Serialize};

/// One page of `GET /playlists/{id}/tracks`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    /// Absolute URL of the next page; `None` on the last page.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaylistItem {
    /// Null for removed or unavailable tracks.
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default)]
    pub disc_number: i64,
    #[serde(default)]
    pub track_number: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Body of `PUT /playlists/{id}/tracks` (reorder form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct ReorderBody {
    pub range_start: usize,
    pub insert_before: usize,
    pub range_length: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SnapshotResponse {
    #[serde(default)]
    pub snapshot_id: Option<String>,
}

/// `{"error": {"status": 404, "message": "..."}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_tolerates_null_track_and_missing_fields() {
        let raw = r#"{
            "items": [
                {"track": null},
                {"track": {"uri": "spotify:track:1", "artists": [{"name": "ABBA"}],
                           "album": {"release_date": "1976"}, "track_number": 2}}
            ],
            "next": null
        }"#;
        let page: Page = serde_json::from_str(raw).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].track.is_none());

        let t = page.items[1].track.as_ref().unwrap();
        assert_eq!(t.disc_number, 0);
        assert_eq!(t.track_number, 2);
        assert!(page.next.is_none());
    }
}
