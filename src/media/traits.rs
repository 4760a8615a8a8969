//! Media fetcher capability

use async_trait::async_trait;
use std::path::PathBuf;

/// What to download
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaTarget {
    /// An exact resource locator
    Url(String),
    /// Take the first search result for this query
    Search(String),
}

/// One fetch job
///
/// The fetcher writes `<dest_dir>/<name_prefix>.<ext>` for the audio file and,
/// when available, a thumbnail image under the same prefix.
#[derive(Clone, Debug)]
pub struct FetchRequest {
    /// Resource to fetch
    pub target: MediaTarget,
    /// Scratch directory
    pub dest_dir: PathBuf,
    /// Sanitized filename prefix shared by every artifact of the job
    pub name_prefix: String,
}

/// Downloads media to local files
///
/// Format preference, bitrate, cookies and quiet mode come from the
/// implementation's own configuration.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the target into the destination directory
    async fn fetch_to_file(&self, request: &FetchRequest) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
