use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::models::{ContentId, ProgressRecord};
use crate::player::QueuePlayer;
use crate::services::ProgressService;
use crate::utils::errors::ProgressServiceError;

/// Cloneable half of the progress engine, carried into spawned single-shot
/// update tasks.
#[derive(Clone)]
pub struct ProgressPusher {
    progress: Arc<dyn ProgressService>,
    player: Arc<dyn QueuePlayer>,
}

impl ProgressPusher {
    /// Push one elapsed-time sample to the tracking service. Returns the
    /// authoritative record for the caller to merge, or `None` when the
    /// update failed. The simultaneous-streams conflict pauses the player
    /// right here; every other failure only gets logged and playback
    /// continues uninterrupted.
    pub async fn update(
        &self,
        content_id: &ContentId,
        elapsed: Duration,
    ) -> Option<ProgressRecord> {
        match self.progress.update_progress(content_id, elapsed).await {
            Ok(record) => Some(record),
            Err(ProgressServiceError::SimultaneousStreamsNotAllowed) => {
                error!(%content_id, "simultaneous streams not allowed, pausing playback");
                if let Err(err) = self.player.pause().await {
                    warn!(%content_id, %err, "failed to pause player after stream conflict");
                }
                None
            }
            Err(err) => {
                warn!(%content_id, %err, "progress update failed");
                None
            }
        }
    }
}

/// Translates raw playback observations into tracking-service calls: periodic
/// position updates plus the one-shot "playback started" signal per item.
pub struct ProgressEngine {
    pusher: ProgressPusher,
    last_started: Option<ContentId>,
}

impl ProgressEngine {
    pub fn new(progress: Arc<dyn ProgressService>, player: Arc<dyn QueuePlayer>) -> Self {
        Self {
            pusher: ProgressPusher { progress, player },
            last_started: None,
        }
    }

    pub fn pusher(&self) -> ProgressPusher {
        self.pusher.clone()
    }

    /// Forget started-signal bookkeeping; a new playback session begins.
    pub fn reset(&mut self) {
        self.last_started = None;
    }

    /// Fire the started signal for an item observed as current. Fires once
    /// per item transition; duplicate notifications from the player for the
    /// same item are ignored.
    pub fn playback_became_current(&mut self, content_id: &ContentId) {
        if self.last_started.as_ref() == Some(content_id) {
            return;
        }
        self.last_started = Some(content_id.clone());

        let progress = Arc::clone(&self.pusher.progress);
        let content_id = content_id.clone();
        tokio::spawn(async move {
            if let Err(err) = progress.playback_started(&content_id).await {
                warn!(%content_id, %err, "failed to notify playback start");
            }
        });
    }
}
