//! Playlist fetching and track extraction
//!
//! [`PlaylistSource`] wraps a [`PlaylistProvider`] and turns its raw entries into
//! [`Track`]s. It does not retry: a failed fetch is reported once and the
//! orchestrator decides when to try again.
//!
//! ## Artist and title
//!
//! The artist is the explicit artist field, else the uploader or channel name,
//! else "Unknown Artist". When the title has the form `"Artist - Title"` the part
//! before the first `" - "` replaces that artist and the rest becomes the title.
//!
//! ```
//! use playlist_relay::playlist::{PlaylistEntry, normalize_entry};
//!
//! let entry = PlaylistEntry {
//!     title: Some("A - B - C".into()),
//!     uploader: Some("Some Channel".into()),
//!     ..Default::default()
//! };
//! let track = normalize_entry(&entry);
//! assert_eq!(track.artist, "A");
//! assert_eq!(track.title, "B - C");
//! ```

mod cli;
mod traits;

pub use cli::YtDlpPlaylistProvider;
pub use traits::{PlaylistEntry, PlaylistProvider};

use crate::error::{Error, Result};
use crate::types::Track;
use std::sync::Arc;

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_TITLE: &str = "Unknown Track";
const TITLE_SEPARATOR: &str = " - ";

/// Fetches the current candidate tracks of a playlist
#[derive(Clone)]
pub struct PlaylistSource {
    provider: Arc<dyn PlaylistProvider>,
}

impl PlaylistSource {
    /// Create a source backed by the given provider
    pub fn new(provider: Arc<dyn PlaylistProvider>) -> Self {
        Self { provider }
    }

    /// Fetch the playlist and extract its tracks
    ///
    /// # Errors
    ///
    /// - [`Error::SourceUnavailable`] if the provider fails
    /// - [`Error::EmptyPlaylist`] if the playlist has no entries
    pub async fn fetch(&self, playlist_ref: &str) -> Result<Vec<Track>> {
        let entries = self.provider.extract(playlist_ref).await.map_err(|e| {
            tracing::error!(
                url = playlist_ref,
                provider = self.provider.name(),
                error = %e,
                "Failed to fetch playlist"
            );
            Error::SourceUnavailable {
                url: playlist_ref.to_string(),
                reason: e.to_string(),
            }
        })?;

        if entries.is_empty() {
            tracing::warn!(url = playlist_ref, "Playlist is empty");
            return Err(Error::EmptyPlaylist {
                url: playlist_ref.to_string(),
            });
        }

        let tracks: Vec<Track> = entries.iter().map(normalize_entry).collect();
        tracing::info!(url = playlist_ref, count = tracks.len(), "Fetched playlist");
        Ok(tracks)
    }
}

/// Turn a raw playlist entry into a track
pub fn normalize_entry(entry: &PlaylistEntry) -> Track {
    let mut artist = [&entry.artist, &entry.uploader, &entry.channel]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_ARTIST)
        .to_string();

    let mut title = entry
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_TITLE)
        .to_string();

    if let Some((head, rest)) = title.split_once(TITLE_SEPARATOR) {
        let (head, rest) = (head.trim().to_string(), rest.trim().to_string());
        artist = head;
        title = rest;
    }

    let source_ref = entry
        .url
        .as_deref()
        .or(entry.webpage_url.as_deref())
        .unwrap_or_default()
        .to_string();

    Track {
        artist,
        title,
        duration_seconds: entry
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d.round() as u32)
            .unwrap_or(0),
        source_ref,
    }
}
