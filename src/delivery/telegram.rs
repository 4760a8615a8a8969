//! Telegram Bot API transport
//!
//! Audio goes through `sendAudio` as a multipart upload, text through
//! `sendMessage` as JSON. The Bot API answers with `{"ok": bool, "description": ...}`;
//! a non-2xx status or `ok: false` is a [`Error::DeliveryFailed`] carrying the
//! description, and so is any transport error.

use super::traits::{AudioMessage, MediaPayload, MessagingTransport};
use crate::config::TelegramConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramTransport {
    client: reqwest::Client,
    api_base_url: String,
    upload_timeout: Duration,
}

impl TelegramTransport {
    /// Build a client from the Telegram settings
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("playlist-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create HTTP client: {}", e),
                key: None,
            })?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            upload_timeout: config.upload_timeout,
        })
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, token, method)
    }

    async fn execute(&self, method: &str, request: reqwest::RequestBuilder) -> Result<()> {
        // The request URL contains the bot token, keep it out of error messages
        let response = request.send().await.map_err(|e| Error::DeliveryFailed {
            reason: format!("{} request failed: {}", method, e.without_url()),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::DeliveryFailed {
            reason: format!("{} response unreadable: {}", method, e.without_url()),
        })?;
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => {
                tracing::debug!(method, "Telegram accepted message");
                Ok(())
            }
            Some(api) => Err(Error::DeliveryFailed {
                reason: api
                    .description
                    .unwrap_or_else(|| format!("{} returned status {}", method, status)),
            }),
            None => Err(Error::DeliveryFailed {
                reason: format!("{} returned status {} with unexpected body", method, status),
            }),
        }
    }
}

fn file_part(payload: MediaPayload, mime: &str) -> Result<Part> {
    Ok(Part::bytes(payload.bytes)
        .file_name(payload.file_name)
        .mime_str(mime)?)
}

#[async_trait]
impl MessagingTransport for TelegramTransport {
    async fn send_audio(&self, token: &str, channel: &str, message: AudioMessage) -> Result<()> {
        let mut form = Form::new()
            .text("chat_id", channel.to_string())
            .text("caption", message.caption)
            .text("parse_mode", "HTML")
            .text("performer", message.performer)
            .text("title", message.title)
            .part("audio", file_part(message.audio, "audio/mpeg")?);

        if message.duration > 0 {
            form = form.text("duration", message.duration.to_string());
        }
        if let Some(thumbnail) = message.thumbnail {
            form = form.part("thumbnail", file_part(thumbnail, "image/jpeg")?);
        }

        let request = self
            .client
            .post(self.method_url(token, "sendAudio"))
            .multipart(form)
            .timeout(self.upload_timeout);
        self.execute("sendAudio", request).await
    }

    async fn send_text(&self, token: &str, channel: &str, caption: &str) -> Result<()> {
        let request = self
            .client
            .post(self.method_url(token, "sendMessage"))
            .json(&serde_json::json!({
                "chat_id": channel,
                "text": caption,
                "parse_mode": "HTML",
            }));
        self.execute("sendMessage", request).await
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123456:test-secret";

    fn transport(server: &MockServer) -> TelegramTransport {
        let config = TelegramConfig {
            api_base_url: server.uri(),
            ..Default::default()
        };
        TelegramTransport::new(&config).unwrap()
    }

    fn audio_message() -> AudioMessage {
        AudioMessage {
            audio: MediaPayload {
                file_name: "X - Y.mp3".into(),
                bytes: b"ID3 fake audio".to_vec(),
            },
            thumbnail: Some(MediaPayload {
                file_name: "X - Y.jpg".into(),
                bytes: b"fake jpeg".to_vec(),
            }),
            caption: "<b>X - Y</b>".into(),
            performer: "X".into(),
            title: "Y".into(),
            duration: 185,
        }
    }

    #[tokio::test]
    async fn send_text_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_json(serde_json::json!({
                "chat_id": "@channel",
                "text": "hello",
                "parse_mode": "HTML",
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "result": {}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        transport(&server)
            .send_text(TOKEN, "@channel", "hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn send_audio_uploads_multipart_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendAudio")))
            .and(body_string_contains("name=\"audio\""))
            .and(body_string_contains("name=\"thumbnail\""))
            .and(body_string_contains("name=\"performer\""))
            .and(body_string_contains("ID3 fake audio"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "result": {}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        transport(&server)
            .send_audio(TOKEN, "-100123", audio_message())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn api_error_maps_to_delivery_failed_with_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found",
            })))
            .mount(&server)
            .await;

        match transport(&server).send_text(TOKEN, "@nowhere", "hi").await {
            Err(Error::DeliveryFailed { reason }) => assert_eq!(reason, "Bad Request: chat not found"),
            other => panic!("expected DeliveryFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ok_false_with_success_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": false})))
            .mount(&server)
            .await;

        let err = transport(&server)
            .send_text(TOKEN, "@channel", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeliveryFailed { .. }));
    }

    #[tokio::test]
    async fn transport_error_does_not_leak_token() {
        let config = TelegramConfig {
            // Nothing listens on the discard port
            api_base_url: "http://127.0.0.1:9".into(),
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let err = TelegramTransport::new(&config)
            .unwrap()
            .send_text(TOKEN, "@channel", "hi")
            .await
            .unwrap_err();

        match err {
            Error::DeliveryFailed { reason } => assert!(!reason.contains("test-secret"), "{reason}"),
            other => panic!("expected DeliveryFailed, got {other:?}"),
        }
    }
}
