//! yt-dlp binary discovery and invocation
//!
//! Both the playlist provider and the media fetcher shell out to the same binary.
//! This module locates it and runs it, turning spawn failures and non-zero exit
//! codes into [`Error::ExternalTool`].

use crate::config::{Config, ToolsConfig};
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

/// Handle on a yt-dlp executable
#[derive(Clone, Debug)]
pub struct YtDlp {
    binary_path: PathBuf,
}

impl YtDlp {
    /// Use an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Resolve the binary from configuration: explicit path first, then PATH
    pub fn from_config(tools: &ToolsConfig) -> Result<Self> {
        if let Some(path) = &tools.yt_dlp_path {
            return Ok(Self::new(path.clone()));
        }
        if tools.search_path
            && let Some(found) = Self::from_path()
        {
            return Ok(found);
        }
        Err(Error::NotSupported(
            "yt-dlp binary not found. Configure tools.yt_dlp_path or ensure yt-dlp is in PATH."
                .into(),
        ))
    }

    /// Path of the executable
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Run yt-dlp with the given arguments and return its captured output
    ///
    /// A non-zero exit status is an error carrying the tail of stderr.
    pub async fn run(&self, args: &[OsString]) -> Result<Output> {
        tracing::debug!(binary = ?self.binary_path, ?args, "running yt-dlp");

        let output = Command::new(&self.binary_path)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalTool(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                last_line(&stderr)
            )));
        }

        Ok(output)
    }
}

/// Arguments every invocation shares: quiet mode, timeout, user agent, cookies
pub(crate) fn common_args(config: &Config) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--quiet".into(),
        "--no-warnings".into(),
        "--no-progress".into(),
        "--socket-timeout".into(),
        config.telegram.request_timeout.as_secs().max(1).to_string().into(),
        "--user-agent".into(),
        config.source.user_agent.clone().into(),
        "--extractor-args".into(),
        "youtube:skip=authcheck".into(),
    ];

    if let Some(cookies) = config.cookies_path() {
        args.push("--cookies".into());
        args.push(cookies.as_os_str().to_owned());
    }

    args
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no error output")
        .trim()
}
