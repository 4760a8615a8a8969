//! Messaging transport capability

use async_trait::async_trait;

/// A file to upload, already read into memory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaPayload {
    /// Name reported to the endpoint
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// An audio message with caption and optional cover image
#[derive(Clone, Debug)]
pub struct AudioMessage {
    /// The audio file
    pub audio: MediaPayload,
    /// Cover image shown by clients that support it
    pub thumbnail: Option<MediaPayload>,
    /// HTML caption
    pub caption: String,
    /// Performer tag
    pub performer: String,
    /// Title tag
    pub title: String,
    /// Length in seconds (0 = unknown)
    pub duration: u32,
}

/// Sends messages to a channel
///
/// Credentials are passed on every call so a configuration update takes effect on
/// the next message without rebuilding the transport.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Send an audio message
    async fn send_audio(&self, token: &str, channel: &str, message: AudioMessage)
    -> crate::Result<()>;

    /// Send a text-only message
    async fn send_text(&self, token: &str, channel: &str, caption: &str) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
