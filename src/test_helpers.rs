//! Shared test helpers: a ready-to-use config and fakes for the three capabilities.

use crate::config::Config;
use crate::delivery::{AudioMessage, MessagingTransport};
use crate::error::{Error, Result};
use crate::media::{FetchRequest, MediaFetcher, MediaTarget};
use crate::playlist::{PlaylistEntry, PlaylistProvider};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Valid config writing into `dir`, with short delays so tests stay fast
pub(crate) fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.telegram.token = "123456:test-secret".into();
    config.telegram.channel = "@test_channel".into();
    config.source.playlist_url = "https://music.youtube.com/playlist?list=TEST".into();
    config.source.use_cookies = false;
    config.download.temp_dir = dir.to_path_buf();
    config.download.retry_delay = Duration::from_millis(10);
    config.schedule.poll_interval = Duration::from_millis(50);
    config.schedule.fetch_cooldown = Duration::from_millis(50);
    config.schedule.recovery_cooldown = Duration::from_millis(50);
    config
}

/// Playlist provider returning canned entries or a canned failure
pub(crate) struct FakeProvider {
    result: std::result::Result<Vec<PlaylistEntry>, String>,
    delay: Duration,
    calls: AtomicU32,
}

impl FakeProvider {
    pub(crate) fn with_entries(entries: Vec<PlaylistEntry>) -> Self {
        Self {
            result: Ok(entries),
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn with_titles(titles: &[&str]) -> Self {
        Self::with_entries(
            titles
                .iter()
                .map(|t| PlaylistEntry {
                    title: Some(t.to_string()),
                    duration: Some(185.0),
                    ..Default::default()
                })
                .collect(),
        )
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }

    /// Every extraction takes this long before answering
    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistProvider for FakeProvider {
    async fn extract(&self, _url: &str) -> Result<Vec<PlaylistEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone().map_err(Error::ExternalTool)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// What [`FakeFetcher`] does on each call
#[derive(Clone, Copy, Debug)]
pub(crate) enum FetchBehavior {
    AudioOnly,
    AudioAndThumbnail,
    /// Report success without writing anything
    NothingWritten,
    Fail,
    /// Fail this many times, then write audio
    FailThenAudio(u32),
}

/// Media fetcher writing placeholder files into the scratch directory
pub(crate) struct FakeFetcher {
    behavior: FetchBehavior,
    calls: AtomicU32,
    targets: Mutex<Vec<MediaTarget>>,
}

impl FakeFetcher {
    pub(crate) fn new(behavior: FetchBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicU32::new(0),
            targets: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn targets(&self) -> Vec<MediaTarget> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch_to_file(&self, request: &FetchRequest) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(request.target.clone());

        let audio = request.dest_dir.join(format!("{}.mp3", request.name_prefix));
        let thumbnail = request.dest_dir.join(format!("{}.jpg", request.name_prefix));

        match self.behavior {
            FetchBehavior::AudioOnly => tokio::fs::write(&audio, b"audio").await?,
            FetchBehavior::AudioAndThumbnail => {
                tokio::fs::write(&audio, b"audio").await?;
                tokio::fs::write(&thumbnail, b"jpeg").await?;
            }
            FetchBehavior::NothingWritten => {}
            FetchBehavior::Fail => {
                return Err(Error::ExternalTool("HTTP Error 403: Forbidden".into()));
            }
            FetchBehavior::FailThenAudio(failures) => {
                if call < failures {
                    return Err(Error::ExternalTool("connection reset".into()));
                }
                tokio::fs::write(&audio, b"audio").await?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// A message recorded by [`FakeTransport`]
#[derive(Clone, Debug)]
pub(crate) enum SentMessage {
    Audio {
        channel: String,
        message: AudioMessage,
    },
    Text {
        channel: String,
        caption: String,
    },
}

/// Transport recording every message, accepting or rejecting all of them
pub(crate) struct FakeTransport {
    reject_with: Option<String>,
    sent: Mutex<Vec<SentMessage>>,
}

impl FakeTransport {
    pub(crate) fn accepting() -> Self {
        Self {
            reject_with: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn rejecting(reason: &str) -> Self {
        Self {
            reject_with: Some(reason.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    fn outcome(&self) -> Result<()> {
        match &self.reject_with {
            Some(reason) => Err(Error::DeliveryFailed {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MessagingTransport for FakeTransport {
    async fn send_audio(&self, _token: &str, channel: &str, message: AudioMessage) -> Result<()> {
        self.sent.lock().unwrap().push(SentMessage::Audio {
            channel: channel.to_string(),
            message,
        });
        self.outcome()
    }

    async fn send_text(&self, _token: &str, channel: &str, caption: &str) -> Result<()> {
        self.sent.lock().unwrap().push(SentMessage::Text {
            channel: channel.to_string(),
            caption: caption.to_string(),
        });
        self.outcome()
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
