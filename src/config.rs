//! Configuration types for playlist-relay

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Telegram destination settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token in the form `<numeric id>:<secret>`
    #[serde(default)]
    pub token: String,

    /// Destination channel id or `@channel` handle
    #[serde(default)]
    pub channel: String,

    /// Bot API base URL (default: "https://api.telegram.org")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout for text requests (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Timeout for audio uploads (default: 60 seconds)
    #[serde(default = "default_upload_timeout", with = "duration_serde")]
    pub upload_timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel: String::new(),
            api_base_url: default_api_base_url(),
            request_timeout: default_request_timeout(),
            upload_timeout: default_upload_timeout(),
        }
    }
}

/// Where tracks come from
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Playlist URL handed to the playlist provider
    #[serde(default = "default_playlist_url")]
    pub playlist_url: String,

    /// Pass a cookie file to yt-dlp (default: true)
    #[serde(default = "default_true")]
    pub use_cookies: bool,

    /// Netscape-format cookie file (default: "cookies.txt")
    #[serde(default = "default_cookies_file")]
    pub cookies_file: PathBuf,

    /// User agent sent by yt-dlp
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            playlist_url: default_playlist_url(),
            use_cookies: true,
            cookies_file: default_cookies_file(),
            user_agent: default_user_agent(),
        }
    }
}

/// Download behavior (scratch directory, retries, audio format)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Scratch directory for downloaded audio and thumbnails (default: "temp_audio")
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Total download attempts per track (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between download attempts (default: 5 seconds)
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub retry_delay: Duration,

    /// Audio container produced by the fetcher (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Target bitrate in kbit/s (default: 192)
    #[serde(default = "default_audio_quality")]
    pub audio_quality: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            audio_format: default_audio_format(),
            audio_quality: default_audio_quality(),
        }
    }
}

/// Timing of the background loop
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Wait between cycles (default: 60 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,

    /// Wait after the playlist could not be fetched (default: 10 minutes)
    #[serde(default = "default_fetch_cooldown", with = "duration_serde")]
    pub fetch_cooldown: Duration,

    /// Wait after an unexpected cycle failure (default: 5 minutes)
    #[serde(default = "default_recovery_cooldown", with = "duration_serde")]
    pub recovery_cooldown: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            fetch_cooldown: default_fetch_cooldown(),
            recovery_cooldown: default_recovery_cooldown(),
        }
    }
}

/// External tool paths
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub yt_dlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for the relay
///
/// Loaded once per session. The orchestrator hands each cycle an immutable
/// snapshot, so replacing the configuration never affects a cycle in flight.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Telegram destination
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Playlist source and cookies
    #[serde(default)]
    pub source: SourceConfig,

    /// Download behavior
    #[serde(default)]
    pub download: DownloadConfig,

    /// Loop timing
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// External tools
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Scratch directory
    pub fn temp_dir(&self) -> &PathBuf {
        &self.download.temp_dir
    }

    /// Cookie file to hand to yt-dlp, if cookies are enabled and the file exists
    pub fn cookies_path(&self) -> Option<&Path> {
        let path = self.source.cookies_file.as_path();
        (self.source.use_cookies && path.is_file()).then_some(path)
    }

    /// Check everything a cycle depends on before any network access happens
    pub fn validate(&self) -> Result<()> {
        validate_token(&self.telegram.token)?;

        if self.telegram.channel.trim().is_empty() {
            return Err(Error::config("telegram.channel", "channel id is empty"));
        }

        if self.source.playlist_url.trim().is_empty() {
            return Err(Error::config("source.playlist_url", "playlist URL is empty"));
        }
        url::Url::parse(&self.source.playlist_url).map_err(|e| {
            Error::config(
                "source.playlist_url",
                format!("invalid playlist URL '{}': {}", self.source.playlist_url, e),
            )
        })?;

        if self.schedule.poll_interval.is_zero() {
            return Err(Error::config(
                "schedule.poll_interval",
                "poll interval must be greater than zero",
            ));
        }

        if self.download.max_retries == 0 {
            return Err(Error::config(
                "download.max_retries",
                "at least one download attempt is required",
            ));
        }

        Ok(())
    }
}

/// Check the bot token format: `<numeric id>:<secret>`
///
/// This is a shape check only; whether Telegram accepts the token is discovered
/// on the first send.
pub fn validate_token(token: &str) -> Result<()> {
    let Some((id, secret)) = token.split_once(':') else {
        return Err(Error::config(
            "telegram.token",
            "token must have the form <bot id>:<secret>",
        ));
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::config(
            "telegram.token",
            "token must start with a numeric bot id",
        ));
    }

    if secret.trim().is_empty() {
        return Err(Error::config(
            "telegram.token",
            "token secret after ':' is empty",
        ));
    }

    Ok(())
}

// Default value functions
fn default_api_base_url() -> String {
    "https://api.telegram.org".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_upload_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_playlist_url() -> String {
    "https://music.youtube.com/playlist?list=PLFTLA_vr_gYaJLKBRIiiBqgJ25TLjUcbF".into()
}

fn default_cookies_file() -> PathBuf {
    PathBuf::from("cookies.txt")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .into()
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp_audio")
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_audio_format() -> String {
    "mp3".into()
}

fn default_audio_quality() -> u32 {
    192
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_fetch_cooldown() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_recovery_cooldown() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
