//! In-memory service implementations. Enough to run the coordination core
//! without a real backend; the demo binary wires these up, and tests reuse
//! them where error injection is not needed.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::{ContentId, PlaylistEntry, ProgressRecord, StreamInfo, VideoId};
use crate::services::traits::{PlaylistRepository, ProgressService, VideoStreamService};
use crate::utils::errors::{ProgressServiceError, RepositoryError, StreamServiceError};

/// Fraction watched beyond which an item counts as finished.
const FINISHED_THRESHOLD: f64 = 0.9;

#[derive(Debug, Default)]
pub struct MemoryPlaylistRepository {
    playlists: RwLock<HashMap<ContentId, Vec<PlaylistEntry>>>,
}

impl MemoryPlaylistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, starting_at: ContentId, entries: Vec<PlaylistEntry>) {
        self.playlists.write().await.insert(starting_at, entries);
    }
}

#[async_trait]
impl PlaylistRepository for MemoryPlaylistRepository {
    async fn playlist(
        &self,
        starting_at: &ContentId,
    ) -> Result<Vec<PlaylistEntry>, RepositoryError> {
        self.playlists
            .read()
            .await
            .get(starting_at)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(starting_at.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStreamService {
    streams: RwLock<HashMap<VideoId, StreamInfo>>,
}

impl MemoryStreamService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, video_id: VideoId, info: StreamInfo) {
        self.streams.write().await.insert(video_id, info);
    }
}

#[async_trait]
impl VideoStreamService for MemoryStreamService {
    async fn get_video_stream(
        &self,
        video_id: &VideoId,
    ) -> Result<StreamInfo, StreamServiceError> {
        self.streams
            .read()
            .await
            .get(video_id)
            .cloned()
            .ok_or_else(|| StreamServiceError::NotFound(video_id.to_string()))
    }
}

/// Tracks progress locally, deriving proportion and the finished flag from
/// registered durations the way a real tracking service would server-side.
#[derive(Debug, Default)]
pub struct MemoryProgressService {
    durations: RwLock<HashMap<ContentId, Duration>>,
    records: RwLock<HashMap<ContentId, ProgressRecord>>,
    started: RwLock<Vec<ContentId>>,
}

impl MemoryProgressService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_duration(&self, content_id: ContentId, duration: Duration) {
        self.durations.write().await.insert(content_id, duration);
    }

    pub async fn record(&self, content_id: &ContentId) -> Option<ProgressRecord> {
        self.records.read().await.get(content_id).cloned()
    }

    /// Items for which `playback_started` has been received, in order.
    pub async fn started_items(&self) -> Vec<ContentId> {
        self.started.read().await.clone()
    }
}

#[async_trait]
impl ProgressService for MemoryProgressService {
    async fn update_progress(
        &self,
        content_id: &ContentId,
        elapsed: Duration,
    ) -> Result<ProgressRecord, ProgressServiceError> {
        let duration = self
            .durations
            .read()
            .await
            .get(content_id)
            .copied()
            .unwrap_or(Duration::ZERO);

        let proportion = if duration.is_zero() {
            0.0
        } else {
            (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
        };

        let record = ProgressRecord {
            content_id: content_id.clone(),
            elapsed,
            finished: proportion >= FINISHED_THRESHOLD,
            proportion,
            updated_at: Utc::now(),
        };
        self.records
            .write()
            .await
            .insert(content_id.clone(), record.clone());
        Ok(record)
    }

    async fn playback_started(&self, content_id: &ContentId) -> Result<(), ProgressServiceError> {
        self.started.write().await.push(content_id.clone());
        Ok(())
    }
}
