use async_trait::async_trait;
use std::time::Duration;

use crate::models::{ContentId, PlaylistEntry, ProgressRecord, StreamInfo, VideoId};
use crate::utils::errors::{ProgressServiceError, RepositoryError, StreamServiceError};

/// Source of ordered playlists. Called once per reload.
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// The playlist containing `starting_at`, in playback order.
    async fn playlist(
        &self,
        starting_at: &ContentId,
    ) -> Result<Vec<PlaylistEntry>, RepositoryError>;
}

/// Resolves a video identifier to something streamable.
#[async_trait]
pub trait VideoStreamService: Send + Sync {
    async fn get_video_stream(&self, video_id: &VideoId)
    -> Result<StreamInfo, StreamServiceError>;
}

/// Remote progress tracking and persistence.
#[async_trait]
pub trait ProgressService: Send + Sync {
    /// Report raw elapsed playback time for an item; the returned record is
    /// authoritative and replaces whatever the caller had.
    async fn update_progress(
        &self,
        content_id: &ContentId,
        elapsed: Duration,
    ) -> Result<ProgressRecord, ProgressServiceError>;

    /// One-shot notification that playback of an item has started. Distinct
    /// from the periodic progress updates.
    async fn playback_started(&self, content_id: &ContentId) -> Result<(), ProgressServiceError>;
}
