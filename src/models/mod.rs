mod identifiers;

pub use identifiers::{ContentId, VideoId};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Content metadata for one playable item in a playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRef {
    pub id: ContentId,
    /// Identifier used for stream resolution; items without one can only be
    /// played from a completed download.
    pub video_id: Option<VideoId>,
    pub title: String,
    pub duration: Duration,
}

/// One entry of a playlist snapshot: content metadata plus the mutable
/// progress and download state attached to it. Identity is `content.id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub content: ContentRef,
    pub progress: Option<ProgressRecord>,
    pub download: Option<DownloadRecord>,
}

impl PlaylistEntry {
    pub fn content_id(&self) -> &ContentId {
        &self.content.id
    }

    /// Local file of a completed download, if one exists.
    pub fn local_source(&self) -> Option<&PathBuf> {
        self.download
            .as_ref()
            .filter(|d| d.state == DownloadState::Complete)
            .and_then(|d| d.local_path.as_ref())
    }
}

/// Authoritative progress as returned by the tracking service. The core only
/// ever reports raw elapsed seconds; proportions and the finished flag come
/// back from the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub content_id: ContentId,
    pub elapsed: Duration,
    pub finished: bool,
    /// Fraction of total duration watched, in [0, 1].
    pub proportion: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub state: DownloadState,
    /// Present only when `state` is `Complete`.
    pub local_path: Option<PathBuf>,
    pub fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadState {
    Queued,
    Active,
    Paused,
    Complete,
    Failed,
    Cancelled,
}

impl std::fmt::Display for DownloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadState::Queued => write!(f, "queued"),
            DownloadState::Active => write!(f, "active"),
            DownloadState::Paused => write!(f, "paused"),
            DownloadState::Complete => write!(f, "complete"),
            DownloadState::Failed => write!(f, "failed"),
            DownloadState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What the stream service resolved a video identifier to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    pub kind: StreamKind,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    Stream,
    Download,
    Other(String),
}

/// A resolved, ready-to-enqueue reference to playable media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableItem {
    pub content_id: ContentId,
    pub source: PlayableSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayableSource {
    Local(PathBuf),
    Remote(Url),
}
