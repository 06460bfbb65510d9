//! greyris-spotify
//!
//! Spotify Web API collaborators for the reconciler:
//! - [`SpotifyClient`] fetches every playlist item (following `next` links)
//!   and performs single-item moves via the reorder endpoint.
//! - [`PlaylistId`] parses share links, `spotify:` URIs and bare ids.
//!
//! Transient retry (HTTP 429 with `Retry-After`) lives in the client, never in
//! the reconciler.

mod client;
mod error;
mod link;
mod model;

pub use client::{items_to_elements, ItemId, SpotifyClient, DEFAULT_API_BASE_URL};
pub use error::ApiError;
pub use link::{InvalidLink, PlaylistId};
pub use model::{Album, Artist, Page, PlaylistItem, Track};
