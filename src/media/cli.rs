//! yt-dlp based media fetcher

use super::traits::{FetchRequest, MediaFetcher, MediaTarget};
use crate::config::Config;
use crate::ytdlp::{YtDlp, common_args};
use async_trait::async_trait;
use std::ffi::OsString;

/// Downloads the best available audio with yt-dlp and transcodes it
///
/// The thumbnail is written next to the audio file. Transcoding needs ffmpeg on
/// the PATH, which yt-dlp locates on its own.
pub struct YtDlpMediaFetcher {
    ytdlp: YtDlp,
    config: Config,
}

impl YtDlpMediaFetcher {
    /// Create a fetcher; the config supplies format, bitrate, cookies and timeout
    pub fn new(ytdlp: YtDlp, config: Config) -> Self {
        Self { ytdlp, config }
    }

    fn args(&self, request: &FetchRequest) -> Vec<OsString> {
        let download = &self.config.download;
        let mut args = common_args(&self.config);

        args.extend(
            [
                "--format".to_string(),
                "bestaudio/best".to_string(),
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                download.audio_format.clone(),
                "--audio-quality".to_string(),
                format!("{}K", download.audio_quality),
                "--embed-metadata".to_string(),
                "--write-thumbnail".to_string(),
                "--no-playlist".to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );

        let mut template = request.dest_dir.clone().into_os_string();
        template.push(std::path::MAIN_SEPARATOR_STR);
        template.push(&request.name_prefix);
        template.push(".%(ext)s");
        args.push("--output".into());
        args.push(template);

        args.push(match &request.target {
            MediaTarget::Url(url) => url.into(),
            MediaTarget::Search(query) => format!("ytsearch1:{query}").into(),
        });

        args
    }
}

#[async_trait]
impl MediaFetcher for YtDlpMediaFetcher {
    async fn fetch_to_file(&self, request: &FetchRequest) -> crate::Result<()> {
        self.ytdlp.run(&self.args(request)).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
