//! Error types for playlist-relay
//!
//! Every failure the pipeline can produce is a variant of [`Error`]. The variants
//! map onto the decisions the orchestrator makes about a cycle:
//! - [`Error::SourceUnavailable`] / [`Error::EmptyPlaylist`] skip the cycle and cool down
//! - [`Error::DownloadFailed`] / [`Error::DeliveryFailed`] are logged, the cycle still ends normally
//! - [`Error::Config`] rejects `start()` and `run_once()` before any network access
//! - everything else is an unexpected failure handled by the recovery cooldown

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for playlist-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for playlist-relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "telegram.token")
        key: Option<String>,
    },

    /// The remote playlist could not be reached or parsed
    #[error("playlist source unavailable ({url}): {reason}")]
    SourceUnavailable {
        /// Playlist URL that was requested
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// The playlist resolved but contained no entries
    #[error("playlist {url} is empty")]
    EmptyPlaylist {
        /// Playlist URL that was requested
        url: String,
    },

    /// Every download attempt for a track failed
    #[error("download of '{query}' failed after {attempts} attempt(s): {reason}")]
    DownloadFailed {
        /// The "artist - title" query of the track
        query: String,
        /// Number of attempts that were made
        attempts: u32,
        /// Failure of the last attempt
        reason: String,
    },

    /// The messaging endpoint did not accept the message
    #[error("delivery failed: {reason}")]
    DeliveryFailed {
        /// Why delivery failed (invalid token, API error, transport error)
        reason: String,
    },

    /// A download attempt reported success but left no audio file behind
    #[error("no audio file with prefix '{prefix}' in {dir}")]
    MissingArtifact {
        /// Scratch directory that was scanned
        dir: PathBuf,
        /// Sanitized filename prefix of the job
        prefix: String,
    },

    /// Operation not valid in the orchestrator's current state
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// The operation that was attempted (e.g., "start")
        operation: String,
        /// The state that prevents it (e.g., "stopping")
        state: String,
    },

    /// External tool execution failed (yt-dlp)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error on a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Short, stable label for log events and metrics
    pub fn kind_label(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_invalid",
            Error::SourceUnavailable { .. } => "source_unavailable",
            Error::EmptyPlaylist { .. } => "empty_playlist",
            Error::DownloadFailed { .. } => "download_failed",
            Error::DeliveryFailed { .. } => "delivery_failed",
            Error::MissingArtifact { .. } => "missing_artifact",
            Error::InvalidState { .. } => "invalid_state",
            Error::ExternalTool(_) => "external_tool",
            Error::NotSupported(_) => "not_supported",
            Error::Io(_) => "io",
            Error::Network(_) => "network",
            Error::Serialization(_) => "serialization",
        }
    }

    /// Whether the error means "nothing to pick from this cycle"
    ///
    /// Both playlist failures send the loop into the fetch cooldown instead of the
    /// regular poll interval.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Error::SourceUnavailable { .. } | Error::EmptyPlaylist { .. }
        )
    }
}
