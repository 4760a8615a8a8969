//! The scheduler: state machine, background loop and run-once.
//!
//! The `Orchestrator` struct and its methods are organized by concern:
//! - [`lifecycle`] - start/stop/shutdown and the background worker loop
//! - [`cycle`] - one fetch → select → download → deliver pass, shared by the
//!   loop and [`Orchestrator::run_once`]
//!
//! Observers follow progress through [`Orchestrator::subscribe`] and
//! [`Orchestrator::last_track`]; neither blocks the worker.

mod cycle;
mod lifecycle;


use crate::config::Config;
use crate::delivery::{Dispatcher, MessagingTransport, TelegramTransport};
use crate::error::{Error, Result};
use crate::events::{EventBus, EventReceiver};
use crate::media::{Downloader, MediaFetcher, YtDlpMediaFetcher};
use crate::playlist::{PlaylistProvider, PlaylistSource, YtDlpPlaylistProvider};
use crate::selection::{RandomSelector, TrackSelector};
use crate::temp_store::cleanup_all;
use crate::types::{EventKind, OrchestratorState, Track};
use crate::ytdlp::YtDlp;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The external capabilities an orchestrator drives
pub struct Components {
    /// Lists playlist entries
    pub provider: Arc<dyn PlaylistProvider>,
    /// Downloads media files
    pub fetcher: Arc<dyn MediaFetcher>,
    /// Sends messages
    pub transport: Arc<dyn MessagingTransport>,
    /// Picks the track of each cycle
    pub selector: Arc<dyn TrackSelector>,
}

impl Components {
    /// Bundle the capabilities with an entropy-seeded random selector
    pub fn new(
        provider: Arc<dyn PlaylistProvider>,
        fetcher: Arc<dyn MediaFetcher>,
        transport: Arc<dyn MessagingTransport>,
    ) -> Self {
        Self {
            provider,
            fetcher,
            transport,
            selector: Arc::new(RandomSelector::from_entropy()),
        }
    }

    /// Replace the track selector
    pub fn with_selector(mut self, selector: Arc<dyn TrackSelector>) -> Self {
        self.selector = selector;
        self
    }
}

/// Pipeline stages, fixed for the lifetime of the orchestrator
#[derive(Clone)]
pub(crate) struct Pipeline {
    pub(crate) source: PlaylistSource,
    pub(crate) downloader: Downloader,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) selector: Arc<dyn TrackSelector>,
}

/// State guarded by the lifecycle lock; only start/stop and the worker's exit touch it
#[derive(Default)]
pub(crate) struct Lifecycle {
    pub(crate) state: OrchestratorState,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) worker: Option<JoinHandle<()>>,
}

/// Periodic playlist-to-channel relay (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Orchestrator {
    /// Current configuration; each cycle works on the snapshot it took at its start
    pub(crate) config: Arc<RwLock<Arc<Config>>>,
    pub(crate) lifecycle: Arc<Mutex<Lifecycle>>,
    pub(crate) last_track: Arc<RwLock<Option<Track>>>,
    pub(crate) events: EventBus,
    pub(crate) pipeline: Pipeline,
}

impl Orchestrator {
    /// Create an orchestrator backed by yt-dlp and the Telegram Bot API
    ///
    /// Locates the yt-dlp binary, builds the HTTP client, creates the scratch
    /// directory and sweeps whatever a previous run left in it.
    ///
    /// # Errors
    ///
    /// - [`Error::NotSupported`] if yt-dlp cannot be found
    /// - [`Error::Io`] if the scratch directory cannot be created
    pub async fn new(config: Config) -> Result<Self> {
        let ytdlp = YtDlp::from_config(&config.tools)?;
        tracing::info!(binary = ?ytdlp.binary_path(), "Using yt-dlp");

        let components = Components::new(
            Arc::new(YtDlpPlaylistProvider::new(ytdlp.clone(), config.clone())),
            Arc::new(YtDlpMediaFetcher::new(ytdlp, config.clone())),
            Arc::new(TelegramTransport::new(&config.telegram)?),
        );
        Self::with_components(config, components).await
    }

    /// Create an orchestrator with explicit capabilities
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the scratch directory cannot be created or listed.
    pub async fn with_components(config: Config, components: Components) -> Result<Self> {
        let temp_dir = config.temp_dir();
        tokio::fs::create_dir_all(temp_dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create temp directory '{}': {}",
                    temp_dir.display(),
                    e
                ),
            ))
        })?;

        let report = cleanup_all(temp_dir).await?;
        tracing::info!(
            deleted = report.deleted,
            failed = report.failed,
            "Swept scratch directory"
        );

        tracing::info!(
            provider = components.provider.name(),
            fetcher = components.fetcher.name(),
            transport = components.transport.name(),
            "Orchestrator initialized"
        );

        Ok(Self {
            config: Arc::new(RwLock::new(Arc::new(config))),
            lifecycle: Arc::new(Mutex::new(Lifecycle::default())),
            last_track: Arc::new(RwLock::new(None)),
            events: EventBus::new(),
            pipeline: Pipeline {
                source: PlaylistSource::new(components.provider),
                downloader: Downloader::new(components.fetcher),
                dispatcher: Dispatcher::new(components.transport),
                selector: components.selector,
            },
        })
    }

    /// Subscribe to the log event stream
    ///
    /// Every subscriber has its own unbounded queue; a subscriber that stops
    /// reading never slows the worker or the other subscribers.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Current lifecycle state
    pub async fn state(&self) -> OrchestratorState {
        self.lifecycle.lock().await.state
    }

    /// Track picked by the most recent cycle or run-once, if any
    pub async fn last_track(&self) -> Option<Track> {
        self.last_track.read().await.clone()
    }

    /// Snapshot of the current configuration
    pub async fn config(&self) -> Arc<Config> {
        self.config.read().await.clone()
    }

    /// Replace the configuration
    ///
    /// The next cycle picks up the new values; a cycle already in progress finishes
    /// with the snapshot it started with. The yt-dlp invocation settings are fixed
    /// when the orchestrator is created.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the new configuration is invalid; the old one stays.
    pub async fn update_config(&self, config: Config) -> Result<()> {
        config.validate()?;
        *self.config.write().await = Arc::new(config);
        self.events.info(EventKind::Notice, "Configuration updated");
        Ok(())
    }
}
