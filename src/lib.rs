//! # playlist-relay
//!
//! Periodically picks a random track from a remote playlist, downloads it with
//! retry and posts it to a Telegram channel, then removes the local files.
//!
//! ## Design Philosophy
//!
//! playlist-relay is designed to be:
//! - **Library-first** - The binary is a thin CLI over [`Orchestrator`]
//! - **Pluggable** - Playlist extraction, media download and messaging are traits
//!   with yt-dlp and Telegram implementations
//! - **Non-blocking** - Observers read an unbounded event stream at their own pace
//! - **Resilient** - No single failed cycle stops the background loop
//!
//! ## Quick Start
//!
//! ```no_run
//! use playlist_relay::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.telegram.token = "123456789:ABCdefGHIjklMnOpQRSTuvwxyz".to_string();
//!     config.telegram.channel = "@my_channel".to_string();
//!
//!     let orchestrator = Orchestrator::new(config).await?;
//!
//!     // Follow progress
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Some(event) = events.recv().await {
//!             println!("{:?}: {}", event.severity, event.message);
//!         }
//!     });
//!
//!     orchestrator.start().await?;
//!     playlist_relay::run_with_shutdown(orchestrator).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Delivery to the messaging channel
pub mod delivery;
/// Error types
pub mod error;
/// Log event fan-out
pub mod events;
/// Track download with retry
pub mod media;
/// State machine and background loop
pub mod orchestrator;
/// Playlist fetching and track extraction
pub mod playlist;
/// Retry logic with a fixed delay
pub mod retry;
/// Random track selection
pub mod selection;
/// Scratch directory management
pub mod temp_store;
/// Core types and events
pub mod types;
/// yt-dlp invocation
pub mod ytdlp;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::Config;
pub use delivery::{Dispatcher, MessagingTransport, TelegramTransport};
pub use error::{Error, Result};
pub use events::{EventBus, EventReceiver};
pub use media::{Downloader, MediaFetcher, YtDlpMediaFetcher};
pub use orchestrator::{Components, Orchestrator};
pub use playlist::{PlaylistProvider, PlaylistSource, YtDlpPlaylistProvider};
pub use selection::{RandomSelector, TrackSelector};
pub use types::{
    DeliveryOutcome, DownloadResult, EventKind, LogEvent, OrchestratorState, Severity, Track,
};

/// Helper function to run the orchestrator with graceful signal handling.
///
/// Waits for a termination signal and then calls the orchestrator's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use playlist_relay::{Config, Orchestrator, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::from_json_file(std::path::Path::new("relay.json"))?;
///     let orchestrator = Orchestrator::new(config).await?;
///     orchestrator.start().await?;
///
///     // Run until SIGINT/SIGTERM
///     run_with_shutdown(orchestrator).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(orchestrator: Orchestrator) -> Result<()> {
    wait_for_signal().await;
    orchestrator.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
