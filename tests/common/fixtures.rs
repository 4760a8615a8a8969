//! Scripted capabilities standing in for yt-dlp

use async_trait::async_trait;
use playlist_relay::media::{FetchRequest, MediaFetcher};
use playlist_relay::playlist::{PlaylistEntry, PlaylistProvider};
use std::sync::atomic::{AtomicU32, Ordering};

/// Playlist provider returning a fixed list of entries
pub struct StaticPlaylist {
    entries: Vec<PlaylistEntry>,
    calls: AtomicU32,
}

impl StaticPlaylist {
    /// One entry per `(title, duration)` pair
    pub fn new(items: &[(&str, f64)]) -> Self {
        Self {
            entries: items
                .iter()
                .map(|(title, duration)| PlaylistEntry {
                    title: Some(title.to_string()),
                    duration: Some(*duration),
                    ..Default::default()
                })
                .collect(),
            calls: AtomicU32::new(0),
        }
    }

    /// Number of extractions so far
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistProvider for StaticPlaylist {
    async fn extract(&self, _url: &str) -> playlist_relay::Result<Vec<PlaylistEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Fetcher that writes `<prefix>.mp3` and `<prefix>.webp`, like a yt-dlp run with thumbnails
pub struct WritingFetcher {
    calls: AtomicU32,
}

impl WritingFetcher {
    /// Create a fetcher
    pub fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }

    /// Number of fetches so far
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaFetcher for WritingFetcher {
    async fn fetch_to_file(&self, request: &FetchRequest) -> playlist_relay::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prefix = &request.name_prefix;
        tokio::fs::write(request.dest_dir.join(format!("{prefix}.mp3")), b"ID3 test audio").await?;
        tokio::fs::write(request.dest_dir.join(format!("{prefix}.webp")), b"RIFF test image")
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "writing"
    }
}
