//! Core types for playlist-relay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One playlist entry, immutable once the playlist source has produced it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Performing artist
    pub artist: String,
    /// Track title
    pub title: String,
    /// Length in seconds (0 = unknown)
    pub duration_seconds: u32,
    /// Locator of the exact resource; empty means "search by artist and title"
    pub source_ref: String,
}

impl Track {
    /// Search query used both for "first result" lookups and for naming files
    pub fn query(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    /// `artist - title (M:SS)` for status displays
    pub fn display_line(&self) -> String {
        format!("{} ({})", self.query(), format_duration(self.duration_seconds))
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Files produced for one track by the downloader
///
/// The paths are handed from the downloader to the dispatcher; after a successful
/// send the dispatcher deletes them, otherwise they stay until the next sweep of
/// the scratch directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadResult {
    /// Audio file; `None` means the media could not be resolved
    pub audio_path: Option<PathBuf>,
    /// Optional thumbnail image
    pub thumbnail_path: Option<PathBuf>,
    /// Performing artist
    pub artist: String,
    /// Track title
    pub title: String,
    /// Length in seconds (0 = unknown)
    pub duration_seconds: u32,
    /// Link back to the source, may be empty
    pub source_ref: String,
}

impl DownloadResult {
    /// Result without media, delivered as a text-only notification
    pub fn text_only(track: &Track) -> Self {
        Self {
            audio_path: None,
            thumbnail_path: None,
            artist: track.artist.clone(),
            title: track.title.clone(),
            duration_seconds: track.duration_seconds,
            source_ref: track.source_ref.clone(),
        }
    }
}

/// How a delivery reached the channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Sent as an audio message with caption
    Audio,
    /// Sent as a text-only message
    TextOnly,
}

/// Lifecycle state of the orchestrator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestratorState {
    /// Not running (initial state)
    #[default]
    Idle,
    /// Background loop active
    Running,
    /// Stop requested, waiting for the current step to finish
    Stopping,
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrchestratorState::Idle => "idle",
            OrchestratorState::Running => "running",
            OrchestratorState::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

/// Severity of a log event
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Step detail
    Debug,
    /// Normal progress
    Info,
    /// Skipped or retried work
    Warning,
    /// Failed step
    Error,
}

/// What a log event reports
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Background loop entered `Running`
    Started,
    /// Stop requested
    StopRequested,
    /// Background loop returned to `Idle`
    Stopped,
    /// A cycle (or run-once) began fetching the playlist
    CycleStarted,
    /// Playlist fetched
    PlaylistFetched {
        /// Number of tracks in the playlist
        tracks: usize,
    },
    /// Playlist could not be used this cycle
    PlaylistUnavailable,
    /// A track was picked, before its download begins
    TrackSelected {
        /// The selected track
        track: Track,
    },
    /// Audio file is ready for delivery
    Downloaded,
    /// All download attempts failed
    DownloadFailed,
    /// Message accepted by the channel
    Delivered {
        /// Audio or text-only
        outcome: DeliveryOutcome,
    },
    /// Message not accepted
    DeliveryFailed,
    /// Scratch directory swept
    Cleanup {
        /// Files removed
        deleted: usize,
        /// Files that could not be removed
        failed: usize,
    },
    /// Loop is waiting before the next cycle
    Waiting {
        /// Seconds until the next cycle
        seconds: u64,
    },
    /// Unexpected failure inside a cycle
    CycleError,
    /// Free-form warning (e.g. start while already running)
    Notice,
}

/// Record delivered to observers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// When the event was emitted
    pub timestamp: DateTime<Utc>,
    /// Severity
    pub severity: Severity,
    /// Structured kind
    pub kind: EventKind,
    /// Human-readable message
    pub message: String,
}

impl LogEvent {
    /// Create an event stamped with the current time
    pub fn now(severity: Severity, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            kind,
            message: message.into(),
        }
    }
}

/// Render seconds as `M:SS`; an unknown duration (0) renders as the raw value
pub fn format_duration(seconds: u32) -> String {
    if seconds == 0 {
        return seconds.to_string();
    }
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
