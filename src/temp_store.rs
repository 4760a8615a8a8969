//! Scratch directory management
//!
//! Downloads land in a shared scratch directory. Files of one job share a
//! sanitized filename prefix, which is how the downloader finds its own output
//! and how concurrent jobs for different tracks stay apart.

use crate::error::Result;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Extensions recognised as audio artifacts
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "opus", "ogg", "aac", "flac", "wav"];

/// Extensions recognised as thumbnail artifacts
pub const THUMBNAIL_EXTENSIONS: &[&str] = &["jpg", "jpeg", "webp", "png"];

/// Files belonging to one job
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobFiles {
    /// Audio artifact, if one was found
    pub audio: Option<PathBuf>,
    /// Thumbnail artifact, if one was found
    pub thumbnail: Option<PathBuf>,
}

/// Outcome of a sweep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files removed
    pub deleted: usize,
    /// Files that could not be removed
    pub failed: usize,
}

/// Replace characters that are not allowed in filenames with `_`
///
/// ```
/// use playlist_relay::temp_store::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AC/DC - What?"), "AC_DC - What_");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

/// Delete every regular file directly under `dir`
///
/// The directory itself and any subdirectories are left alone. A file that cannot
/// be removed is logged and counted; the sweep carries on with the rest.
pub async fn cleanup_all(dir: &Path) -> Result<CleanupReport> {
    sweep_with(dir, |path| async move { fs::remove_file(&path).await }).await
}

/// Sweep implementation with an injectable remover
pub(crate) async fn sweep_with<R, Fut>(dir: &Path, mut remove: R) -> Result<CleanupReport>
where
    R: FnMut(PathBuf) -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    let mut report = CleanupReport::default();

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(?dir, "scratch directory does not exist, nothing to clean");
            return Ok(report);
        }
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();

        let file_type = match entry.file_type().await {
            Ok(ft) => ft,
            Err(e) => {
                warn!(?path, error = %e, "failed to stat entry during cleanup");
                continue;
            }
        };
        if !file_type.is_file() {
            continue;
        }

        match remove(path.clone()).await {
            Ok(()) => {
                debug!(?path, "deleted temp file");
                report.deleted += 1;
            }
            Err(e) => {
                warn!(?path, error = %e, "failed to delete temp file");
                report.failed += 1;
            }
        }
    }

    info!(
        ?dir,
        deleted = report.deleted,
        failed = report.failed,
        "cleanup complete"
    );
    Ok(report)
}

/// Find the audio file and thumbnail a job left behind
///
/// A file belongs to the job when its name is `<prefix>.<ext>`. Candidates are
/// sorted by name, so the choice is stable when several audio files match.
pub async fn files_with_prefix(dir: &Path, prefix: &str) -> Result<JobFiles> {
    let mut audio = Vec::new();
    let mut thumbnails = Vec::new();

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(rest) = name.strip_prefix(prefix) else {
            continue;
        };
        if !rest.starts_with('.') {
            continue;
        }
        if !entry.file_type().await.map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            audio.push(path);
        } else if THUMBNAIL_EXTENSIONS.contains(&extension.as_str()) {
            thumbnails.push(path);
        }
    }

    audio.sort();
    thumbnails.sort();

    Ok(JobFiles {
        audio: audio.into_iter().next(),
        thumbnail: thumbnails.into_iter().next(),
    })
}

/// Best-effort removal of the files of one job
///
/// Missing files are not an error; other failures are logged and ignored.
pub async fn remove_job_files(paths: &[&Path]) {
    for path in paths {
        match fs::remove_file(path).await {
            Ok(()) => debug!(?path, "removed temp file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(?path, error = %e, "failed to remove temp file"),
        }
    }
}
