//! Test configuration

use playlist_relay::Config;
use std::path::Path;
use std::time::Duration;

/// Bot token with a valid format
pub const TEST_TOKEN: &str = "123456789:integration-secret";

/// Channel every test delivers to
pub const TEST_CHANNEL: &str = "@relay_test";

/// Valid config with short delays, writing into `temp_dir` and talking to `api_base_url`
pub fn test_config(temp_dir: &Path, api_base_url: &str) -> Config {
    let mut config = Config::default();
    config.telegram.token = TEST_TOKEN.to_string();
    config.telegram.channel = TEST_CHANNEL.to_string();
    config.telegram.api_base_url = api_base_url.to_string();
    config.telegram.request_timeout = Duration::from_secs(5);
    config.source.playlist_url = "https://music.youtube.com/playlist?list=PLtest".to_string();
    config.source.use_cookies = false;
    config.download.temp_dir = temp_dir.to_path_buf();
    config.download.retry_delay = Duration::from_millis(10);
    config.schedule.poll_interval = Duration::from_secs(3600);
    config.schedule.fetch_cooldown = Duration::from_millis(20);
    config.schedule.recovery_cooldown = Duration::from_millis(20);
    config
}
