//! Playlist provider capability

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw playlist entry as reported by an extractor
///
/// Every field is optional; [`super::normalize_entry`] decides the final artist
/// and title.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Explicit artist metadata
    #[serde(default)]
    pub artist: Option<String>,
    /// Entry title, often "Artist - Title" in auto-generated listings
    #[serde(default)]
    pub title: Option<String>,
    /// Length in seconds; extractors report fractional values
    #[serde(default)]
    pub duration: Option<f64>,
    /// Locator of the entry
    #[serde(default)]
    pub url: Option<String>,
    /// Page URL, used when `url` is missing
    #[serde(default)]
    pub webpage_url: Option<String>,
    /// Uploader name
    #[serde(default)]
    pub uploader: Option<String>,
    /// Channel name
    #[serde(default)]
    pub channel: Option<String>,
}

/// Lists the entries of a remote playlist
///
/// This is the only network-facing lookup for playlist contents. Implementations
/// report any failure as an error; the caller turns it into
/// [`crate::Error::SourceUnavailable`].
#[async_trait]
pub trait PlaylistProvider: Send + Sync {
    /// Extract all entries of the playlist at `url`
    async fn extract(&self, url: &str) -> crate::Result<Vec<PlaylistEntry>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
