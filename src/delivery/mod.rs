//! Delivery of downloaded tracks to the messaging channel
//!
//! [`Dispatcher::deliver`] validates the bot token, builds the caption and sends
//! either an audio message (when the download produced a file) or a text-only
//! message. After a successful audio send the job's files are removed; after a
//! failed one they are left in place for the next sweep of the scratch directory.

mod telegram;
mod traits;

pub use telegram::TelegramTransport;
pub use traits::{AudioMessage, MediaPayload, MessagingTransport};

use crate::config::{Config, validate_token};
use crate::error::{Error, Result};
use crate::temp_store::remove_job_files;
use crate::types::{DeliveryOutcome, DownloadResult, format_duration};
use chrono::{DateTime, Local};
use std::path::Path;
use std::sync::Arc;

const CAPTION_HEADER: &str = "🎧 <b>Random track from YouTube Music</b>";
const CAPTION_HASHTAGS: &str = "#music #youtubemusic #randomtrack";

/// Sends download results to the configured channel
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn MessagingTransport>,
}

impl Dispatcher {
    /// Create a dispatcher backed by the given transport
    pub fn new(transport: Arc<dyn MessagingTransport>) -> Self {
        Self { transport }
    }

    /// Deliver a result as an audio message, or as text when there is no audio
    ///
    /// # Errors
    ///
    /// [`Error::DeliveryFailed`] when the token is malformed (nothing is sent),
    /// when the audio file cannot be read, or when the endpoint rejects the message.
    pub async fn deliver(&self, result: &DownloadResult, config: &Config) -> Result<DeliveryOutcome> {
        let telegram = &config.telegram;
        validate_token(&telegram.token).map_err(|e| Error::DeliveryFailed {
            reason: e.to_string(),
        })?;

        let caption = build_caption(result, Local::now());

        let Some(audio_path) = result.audio_path.as_deref() else {
            self.transport
                .send_text(&telegram.token, &telegram.channel, &caption)
                .await
                .map_err(into_delivery_failed)?;
            tracing::info!(artist = %result.artist, title = %result.title, "Sent text-only message");
            return Ok(DeliveryOutcome::TextOnly);
        };

        let audio = read_payload(audio_path).await.map_err(|e| Error::DeliveryFailed {
            reason: format!("cannot read audio file {}: {}", audio_path.display(), e),
        })?;

        let thumbnail = match result.thumbnail_path.as_deref() {
            Some(path) => match read_payload(path).await {
                Ok(payload) => Some(payload),
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Thumbnail unreadable, sending without it");
                    None
                }
            },
            None => None,
        };

        let message = AudioMessage {
            audio,
            thumbnail,
            caption,
            performer: result.artist.clone(),
            title: result.title.clone(),
            duration: result.duration_seconds,
        };

        if let Err(e) = self
            .transport
            .send_audio(&telegram.token, &telegram.channel, message)
            .await
        {
            tracing::error!(
                transport = self.transport.name(),
                audio = ?audio_path,
                error = %e,
                "Audio delivery failed, keeping files for the next cleanup"
            );
            return Err(into_delivery_failed(e));
        }

        let mut sent_files = vec![audio_path];
        sent_files.extend(result.thumbnail_path.as_deref());
        remove_job_files(&sent_files).await;

        tracing::info!(artist = %result.artist, title = %result.title, "Sent audio message");
        Ok(DeliveryOutcome::Audio)
    }
}

fn into_delivery_failed(error: Error) -> Error {
    match error {
        Error::DeliveryFailed { .. } => error,
        other => Error::DeliveryFailed {
            reason: other.to_string(),
        },
    }
}

async fn read_payload(path: &Path) -> std::io::Result<MediaPayload> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    Ok(MediaPayload { file_name, bytes })
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Build the HTML caption for a delivery
///
/// The link line is omitted when the result has no source reference.
pub fn build_caption(result: &DownloadResult, sent_at: DateTime<Local>) -> String {
    let mut lines = vec![
        CAPTION_HEADER.to_string(),
        String::new(),
        format!(
            "🎵 <b>{} - {}</b>",
            escape_html(&result.artist),
            escape_html(&result.title)
        ),
        format!(
            "⏳ <i>Duration:</i> {}",
            format_duration(result.duration_seconds)
        ),
        format!("🕒 <i>Sent at:</i> {}", sent_at.format("%H:%M")),
    ];

    if !result.source_ref.is_empty() {
        lines.push(format!(
            "🔗 <a href=\"{}\">Listen on YouTube</a>",
            escape_html(&result.source_ref)
        ));
    }

    lines.push(String::new());
    lines.push(CAPTION_HASHTAGS.to_string());
    lines.join("\n")
}
