use std::sync::Arc;
use tracing::debug;

use crate::models::{PlayableItem, PlayableSource, PlaylistEntry, StreamKind};
use crate::services::VideoStreamService;
use crate::utils::errors::PlaybackError;

/// Decides between a completed local download and a network stream lookup for
/// a single playlist entry. Resolution is single-shot: it yields a playable
/// reference or a failure exactly once, and the caller drops results whose
/// session has since been torn down or reloaded.
pub struct ItemResolver {
    streams: Arc<dyn VideoStreamService>,
}

impl ItemResolver {
    pub fn new(streams: Arc<dyn VideoStreamService>) -> Self {
        Self { streams }
    }

    pub async fn resolve(&self, entry: &PlaylistEntry) -> Result<PlayableItem, PlaybackError> {
        let content_id = entry.content.id.clone();

        // A finished download wins; no network call.
        if let Some(local) = entry.local_source() {
            debug!(%content_id, path = %local.display(), "resolved entry to local download");
            return Ok(PlayableItem {
                content_id,
                source: PlayableSource::Local(local.clone()),
            });
        }

        let video_id = entry
            .content
            .video_id
            .as_ref()
            .ok_or_else(|| PlaybackError::MissingAttribute("videoIdentifier".to_string()))?;

        let info = self.streams.get_video_stream(video_id).await?;
        if info.kind != StreamKind::Stream {
            return Err(PlaybackError::MissingAttribute("Not A Stream".to_string()));
        }

        debug!(%content_id, url = %info.url, "resolved entry to network stream");
        Ok(PlayableItem {
            content_id,
            source: PlayableSource::Remote(info.url),
        })
    }
}
