use std::path::PathBuf;
use std::time::Duration;

use playhead::models::{
    ContentId, ContentRef, DownloadRecord, DownloadState, PlaylistEntry, VideoId,
};

pub struct EntryBuilder {
    id: String,
    video_id: Option<String>,
    duration: Duration,
    download: Option<DownloadRecord>,
}

impl EntryBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            video_id: Some(format!("video-{id}")),
            duration: Duration::from_secs(600),
            download: None,
        }
    }

    pub fn without_video_id(mut self) -> Self {
        self.video_id = None;
        self
    }

    pub fn with_completed_download(mut self, path: &str) -> Self {
        self.download = Some(DownloadRecord {
            state: DownloadState::Complete,
            local_path: Some(PathBuf::from(path)),
            fraction: 1.0,
        });
        self
    }

    pub fn build(self) -> PlaylistEntry {
        PlaylistEntry {
            content: ContentRef {
                id: ContentId::new(&self.id),
                video_id: self.video_id.map(VideoId::new),
                title: format!("Episode {}", self.id),
                duration: self.duration,
            },
            progress: None,
            download: self.download,
        }
    }
}

pub fn entry(id: &str) -> PlaylistEntry {
    EntryBuilder::new(id).build()
}

/// The canonical three-item playlist used across the coordinator tests.
pub fn abc_playlist() -> Vec<PlaylistEntry> {
    vec![entry("a"), entry("b"), entry("c")]
}
