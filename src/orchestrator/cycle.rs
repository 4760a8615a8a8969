//! One fetch → select → download → deliver pass.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{DeliveryOutcome, EventKind};
use tokio_util::sync::CancellationToken;

use super::Orchestrator;

impl Orchestrator {
    /// Send one random track right now, outside the periodic loop
    ///
    /// Works while idle or running and may overlap with the loop or with other
    /// calls; it never changes the lifecycle state. The configuration is checked
    /// before anything touches the network.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the configuration is invalid (nothing is fetched)
    /// - [`Error::SourceUnavailable`] / [`Error::EmptyPlaylist`] if there is nothing to pick from
    /// - [`Error::DownloadFailed`] / [`Error::DeliveryFailed`] from the later steps
    pub async fn run_once(&self) -> Result<DeliveryOutcome> {
        let config = self.config().await;
        if let Err(e) = config.validate() {
            self.events
                .error(EventKind::Notice, format!("Test send rejected: {}", e));
            return Err(e);
        }
        self.run_pipeline(&config, &CancellationToken::new()).await
    }

    /// Run every step once, emitting an event as each one completes
    ///
    /// `cancel` only shortens the download retry pauses; the step in flight is
    /// never interrupted.
    pub(crate) async fn run_pipeline(
        &self,
        config: &Config,
        cancel: &CancellationToken,
    ) -> Result<DeliveryOutcome> {
        let playlist_url = &config.source.playlist_url;
        self.events.info(
            EventKind::CycleStarted,
            format!("Fetching playlist {}", playlist_url),
        );

        let tracks = match self.pipeline.source.fetch(playlist_url).await {
            Ok(tracks) => tracks,
            Err(e) => {
                self.events.warn(
                    EventKind::PlaylistUnavailable,
                    format!("Playlist unavailable: {}", e),
                );
                return Err(e);
            }
        };
        self.events.info(
            EventKind::PlaylistFetched {
                tracks: tracks.len(),
            },
            format!("Found {} tracks", tracks.len()),
        );

        let track = self
            .pipeline
            .selector
            .select(&tracks)
            .cloned()
            .ok_or_else(|| Error::EmptyPlaylist {
                url: playlist_url.clone(),
            })?;

        *self.last_track.write().await = Some(track.clone());
        self.events.info(
            EventKind::TrackSelected {
                track: track.clone(),
            },
            format!("Selected: {}", track.display_line()),
        );

        let result = match self.pipeline.downloader.resolve(&track, config, cancel).await {
            Ok(result) => result,
            Err(e) => {
                self.events.error(EventKind::DownloadFailed, e.to_string());
                return Err(e);
            }
        };
        self.events
            .info(EventKind::Downloaded, format!("Downloaded: {}", track));

        match self.pipeline.dispatcher.deliver(&result, config).await {
            Ok(outcome) => {
                self.events.info(
                    EventKind::Delivered { outcome },
                    format!("Sent to channel: {}", track),
                );
                Ok(outcome)
            }
            Err(e) => {
                self.events.error(EventKind::DeliveryFailed, e.to_string());
                Err(e)
            }
        }
    }
}
