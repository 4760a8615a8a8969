//! yt-dlp based playlist provider

use super::traits::{PlaylistEntry, PlaylistProvider};
use crate::config::Config;
use crate::ytdlp::{YtDlp, common_args};
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;

/// Lists playlist entries with `yt-dlp --flat-playlist`
///
/// Nothing is downloaded; yt-dlp prints the playlist as one JSON document whose
/// `entries` array is returned as-is.
pub struct YtDlpPlaylistProvider {
    ytdlp: YtDlp,
    config: Config,
}

#[derive(Deserialize)]
struct FlatPlaylist {
    #[serde(default)]
    entries: Vec<Option<PlaylistEntry>>,
}

impl YtDlpPlaylistProvider {
    /// Create a provider; the config supplies cookies, user agent and timeout
    pub fn new(ytdlp: YtDlp, config: Config) -> Self {
        Self { ytdlp, config }
    }

    fn args(&self, url: &str) -> Vec<OsString> {
        let mut args = common_args(&self.config);
        args.extend(
            ["--flat-playlist", "--dump-single-json", "--ignore-errors", url]
                .into_iter()
                .map(OsString::from),
        );
        args
    }
}

/// Parse the JSON document printed by `--dump-single-json`
///
/// Unavailable videos show up as `null` entries and are skipped.
pub(crate) fn parse_flat_playlist(stdout: &[u8]) -> crate::Result<Vec<PlaylistEntry>> {
    let playlist: FlatPlaylist = serde_json::from_slice(stdout)?;
    Ok(playlist.entries.into_iter().flatten().collect())
}

#[async_trait]
impl PlaylistProvider for YtDlpPlaylistProvider {
    async fn extract(&self, url: &str) -> crate::Result<Vec<PlaylistEntry>> {
        let output = self.ytdlp.run(&self.args(url)).await?;
        parse_flat_playlist(&output.stdout)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
