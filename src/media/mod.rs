//! Track download with retry
//!
//! [`Downloader::resolve`] turns a [`Track`] into local files. Each attempt asks
//! the [`MediaFetcher`] for the track, then scans the scratch directory for the
//! artifacts carrying the job's filename prefix. An attempt that reports success
//! but leaves no audio file counts as a failure, so callers only ever see a
//! result with audio or [`Error::DownloadFailed`].

mod cli;
mod traits;

pub use cli::YtDlpMediaFetcher;
pub use traits::{FetchRequest, MediaFetcher, MediaTarget};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::retry::{RetryPolicy, retry_fixed};
use crate::temp_store::{files_with_prefix, sanitize_filename};
use crate::types::{DownloadResult, Track};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Resolves tracks to local media files
#[derive(Clone)]
pub struct Downloader {
    fetcher: Arc<dyn MediaFetcher>,
}

impl Downloader {
    /// Create a downloader backed by the given fetcher
    pub fn new(fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { fetcher }
    }

    /// Download a track, retrying up to `download.max_retries` attempts
    ///
    /// Attempts are separated by `download.retry_delay`. Cancelling `cancel` ends
    /// the retry loop at the next pause; an attempt already running is never
    /// interrupted.
    ///
    /// # Errors
    ///
    /// [`Error::DownloadFailed`] once every attempt failed.
    pub async fn resolve(
        &self,
        track: &Track,
        config: &Config,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult> {
        let query = track.query();
        let prefix = sanitize_filename(&query);
        let request = FetchRequest {
            target: if track.source_ref.is_empty() {
                MediaTarget::Search(query.clone())
            } else {
                MediaTarget::Url(track.source_ref.clone())
            },
            dest_dir: config.temp_dir().clone(),
            name_prefix: prefix.clone(),
        };

        let policy = RetryPolicy::new(config.download.max_retries, config.download.retry_delay);

        let outcome = retry_fixed(&policy, cancel, |attempt| {
            let (request, query) = (&request, &query);
            async move {
                tracing::debug!(
                    query = %query,
                    attempt = attempt + 1,
                    fetcher = self.fetcher.name(),
                    "Downloading track"
                );
                tokio::fs::create_dir_all(&request.dest_dir).await?;
                self.fetcher.fetch_to_file(request).await?;

                let files = files_with_prefix(&request.dest_dir, &request.name_prefix).await?;
                match files.audio {
                    Some(audio) => Ok((audio, files.thumbnail)),
                    None => Err(Error::MissingArtifact {
                        dir: request.dest_dir.clone(),
                        prefix: request.name_prefix.clone(),
                    }),
                }
            }
        })
        .await;

        match outcome {
            Ok((audio, thumbnail)) => {
                tracing::info!(query = %query, audio = ?audio, "Track downloaded");
                Ok(DownloadResult {
                    audio_path: Some(audio),
                    thumbnail_path: thumbnail,
                    artist: track.artist.clone(),
                    title: track.title.clone(),
                    duration_seconds: track.duration_seconds,
                    source_ref: track.source_ref.clone(),
                })
            }
            Err(failure) => Err(Error::DownloadFailed {
                query,
                attempts: failure.attempts,
                reason: failure.last_error.to_string(),
            }),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FakeFetcher, FetchBehavior, test_config};
    use std::time::{Duration, Instant};

    fn track(source_ref: &str) -> Track {
        Track {
            artist: "AC/DC".into(),
            title: "What?".into(),
            duration_seconds: 200,
            source_ref: source_ref.into(),
        }
    }

    #[tokio::test]
    async fn success_returns_audio_and_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let fetcher = Arc::new(FakeFetcher::new(FetchBehavior::AudioAndThumbnail));
        let downloader = Downloader::new(fetcher.clone());

        let result = downloader
            .resolve(&track(""), &config, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            result.audio_path,
            Some(dir.path().join("AC_DC - What_.mp3"))
        );
        assert_eq!(
            result.thumbnail_path,
            Some(dir.path().join("AC_DC - What_.jpg"))
        );
        assert_eq!(result.artist, "AC/DC");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn empty_source_ref_searches_by_query() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let fetcher = Arc::new(FakeFetcher::new(FetchBehavior::AudioOnly));
        let downloader = Downloader::new(fetcher.clone());

        downloader
            .resolve(&track(""), &config, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            fetcher.targets(),
            vec![MediaTarget::Search("AC/DC - What?".into())]
        );

        downloader
            .resolve(&track("https://x/watch?v=1"), &config, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            fetcher.targets()[1],
            MediaTarget::Url("https://x/watch?v=1".into())
        );
    }

    #[tokio::test]
    async fn persistent_failure_uses_whole_budget() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.download.max_retries = 3;
        config.download.retry_delay = Duration::from_millis(40);
        let fetcher = Arc::new(FakeFetcher::new(FetchBehavior::Fail));
        let downloader = Downloader::new(fetcher.clone());

        let start = Instant::now();
        let err = downloader
            .resolve(&track(""), &config, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(fetcher.calls(), 3);
        assert!(start.elapsed() >= Duration::from_millis(80), "two pauses");
        match err {
            Error::DownloadFailed { attempts, query, .. } => {
                assert_eq!(attempts, 3);
                assert_eq!(query, "AC/DC - What?");
            }
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_without_audio_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.download.max_retries = 2;
        let fetcher = Arc::new(FakeFetcher::new(FetchBehavior::NothingWritten));
        let downloader = Downloader::new(fetcher.clone());

        let err = downloader
            .resolve(&track(""), &config, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(fetcher.calls(), 2, "missing audio must be retried");
        match err {
            Error::DownloadFailed { reason, .. } => assert!(reason.contains("no audio file")),
            other => panic!("expected DownloadFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let fetcher = Arc::new(FakeFetcher::new(FetchBehavior::FailThenAudio(2)));
        let downloader = Downloader::new(fetcher.clone());

        let result = downloader
            .resolve(&track(""), &config, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 3);
        assert!(result.audio_path.is_some());
    }

    #[tokio::test]
    async fn cancellation_stops_between_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.download.max_retries = 10;
        config.download.retry_delay = Duration::from_secs(30);
        let fetcher = Arc::new(FakeFetcher::new(FetchBehavior::Fail));
        let downloader = Downloader::new(fetcher.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let start = Instant::now();
        let err = downloader
            .resolve(&track(""), &config, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DownloadFailed { attempts: 1, .. }));
        assert_eq!(fetcher.calls(), 1, "the in-flight attempt still runs");
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
