use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::sync::mpsc;
use url::Url;

use playhead::models::{
    ContentId, PlayableItem, PlaylistEntry, ProgressRecord, StreamInfo, StreamKind, VideoId,
};
use playhead::player::{PlayerEvent, PlayerEventStream, QueuePlayer};
use playhead::services::{PlaylistRepository, ProgressService, VideoStreamService};
use playhead::utils::errors::{
    PlayerError, ProgressServiceError, RepositoryError, StreamServiceError,
};

pub struct MockRepository {
    playlists: Mutex<HashMap<ContentId, Vec<PlaylistEntry>>>,
    error: Mutex<Option<String>>,
    pub calls: Mutex<usize>,
}

impl MockRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            playlists: Mutex::new(HashMap::new()),
            error: Mutex::new(None),
            calls: Mutex::new(0),
        })
    }

    pub fn set_playlist(&self, starting_at: &str, entries: Vec<PlaylistEntry>) {
        self.playlists
            .lock()
            .unwrap()
            .insert(ContentId::new(starting_at), entries);
    }

    pub fn inject_error(&self, error: &str) {
        *self.error.lock().unwrap() = Some(error.to_string());
    }

    pub fn clear_error(&self) {
        *self.error.lock().unwrap() = None;
    }
}

#[async_trait]
impl PlaylistRepository for MockRepository {
    async fn playlist(
        &self,
        starting_at: &ContentId,
    ) -> Result<Vec<PlaylistEntry>, RepositoryError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(error) = self.error.lock().unwrap().clone() {
            return Err(RepositoryError::Storage(error));
        }
        self.playlists
            .lock()
            .unwrap()
            .get(starting_at)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(starting_at.to_string()))
    }
}

/// Resolves any video id ending up in its map to a stream url. An optional
/// gate (a zero-permit semaphore) holds resolutions until the test releases
/// them, for observing in-flight loading states.
pub struct MockStreamService {
    kinds: Mutex<HashMap<VideoId, StreamKind>>,
    gate: Option<Arc<Semaphore>>,
    pub calls: Mutex<usize>,
}

impl MockStreamService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            kinds: Mutex::new(HashMap::new()),
            gate: None,
            calls: Mutex::new(0),
        })
    }

    pub fn gated(gate: Arc<Semaphore>) -> Arc<Self> {
        Arc::new(Self {
            kinds: Mutex::new(HashMap::new()),
            gate: Some(gate),
            calls: Mutex::new(0),
        })
    }

    /// Serve this video id as a plain stream.
    pub fn add_stream(&self, video_id: &str) {
        self.kinds
            .lock()
            .unwrap()
            .insert(VideoId::new(video_id), StreamKind::Stream);
    }

    /// Serve this video id with a non-stream kind, which the resolver must
    /// reject.
    pub fn add_kind(&self, video_id: &str, kind: StreamKind) {
        self.kinds.lock().unwrap().insert(VideoId::new(video_id), kind);
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl VideoStreamService for MockStreamService {
    async fn get_video_stream(
        &self,
        video_id: &VideoId,
    ) -> Result<StreamInfo, StreamServiceError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| StreamServiceError::Service("gate closed".to_string()))?;
            permit.forget();
        }
        let kind = self
            .kinds
            .lock()
            .unwrap()
            .get(video_id)
            .cloned()
            .ok_or_else(|| StreamServiceError::NotFound(video_id.to_string()))?;
        Ok(StreamInfo {
            kind,
            url: Url::parse(&format!("https://cdn.test/{video_id}/master.m3u8")).unwrap(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressMode {
    Normal,
    /// Every update fails with the simultaneous-streams conflict.
    Conflict,
    /// Every update fails with a generic service error.
    Error,
}

pub struct MockProgressService {
    mode: Mutex<ProgressMode>,
    /// When set, returned records carry `finished = true`.
    finished: Mutex<bool>,
    pub updates: Mutex<Vec<(ContentId, Duration)>>,
    pub started: Mutex<Vec<ContentId>>,
}

impl MockProgressService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(ProgressMode::Normal),
            finished: Mutex::new(false),
            updates: Mutex::new(Vec::new()),
            started: Mutex::new(Vec::new()),
        })
    }

    pub fn set_mode(&self, mode: ProgressMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn mark_finished(&self, finished: bool) {
        *self.finished.lock().unwrap() = finished;
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn started_items(&self) -> Vec<ContentId> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressService for MockProgressService {
    async fn update_progress(
        &self,
        content_id: &ContentId,
        elapsed: Duration,
    ) -> Result<ProgressRecord, ProgressServiceError> {
        self.updates
            .lock()
            .unwrap()
            .push((content_id.clone(), elapsed));
        match *self.mode.lock().unwrap() {
            ProgressMode::Normal => Ok(ProgressRecord {
                content_id: content_id.clone(),
                elapsed,
                finished: *self.finished.lock().unwrap(),
                proportion: 0.5,
                updated_at: Utc::now(),
            }),
            ProgressMode::Conflict => Err(ProgressServiceError::SimultaneousStreamsNotAllowed),
            ProgressMode::Error => Err(ProgressServiceError::Other("server error".to_string())),
        }
    }

    async fn playback_started(&self, content_id: &ContentId) -> Result<(), ProgressServiceError> {
        self.started.lock().unwrap().push(content_id.clone());
        Ok(())
    }
}

struct MockPlayerInner {
    queue: Vec<PlayableItem>,
    pauses: usize,
    subscribers: Vec<mpsc::UnboundedSender<PlayerEvent>>,
    subscribed_intervals: Vec<Duration>,
}

/// A player whose clock the test drives by hand: `emit_time` and `advance`
/// stand in for the periodic observer and item transitions of a real player.
pub struct MockPlayer {
    inner: Mutex<MockPlayerInner>,
}

impl MockPlayer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(MockPlayerInner {
                queue: Vec::new(),
                pauses: 0,
                subscribers: Vec::new(),
                subscribed_intervals: Vec::new(),
            }),
        })
    }

    fn broadcast(&self, event: PlayerEvent) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .subscribers
            .retain(|sub| sub.send(event.clone()).is_ok());
    }

    /// Deliver one periodic elapsed-time sample.
    pub fn emit_time(&self, elapsed: Duration, duration: Duration) {
        self.broadcast(PlayerEvent::TimeUpdate { elapsed, duration });
    }

    /// Deliver a current-item notification without touching the queue, as a
    /// player re-announcing its current item would.
    pub fn emit_current(&self, content_id: Option<&str>) {
        self.broadcast(PlayerEvent::CurrentItemChanged(
            content_id.map(ContentId::new),
        ));
    }

    /// Finish the current item: drop the queue head and announce whatever
    /// plays next.
    pub fn advance(&self) {
        let current = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.queue.is_empty() {
                inner.queue.remove(0);
            }
            inner.queue.first().map(|item| item.content_id.clone())
        };
        self.broadcast(PlayerEvent::CurrentItemChanged(current));
    }

    pub fn queue(&self) -> Vec<PlayableItem> {
        self.inner.lock().unwrap().queue.clone()
    }

    pub fn queued_ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .queue
            .iter()
            .map(|item| item.content_id.to_string())
            .collect()
    }

    pub fn pause_count(&self) -> usize {
        self.inner.lock().unwrap().pauses
    }

    pub fn subscribed_intervals(&self) -> Vec<Duration> {
        self.inner.lock().unwrap().subscribed_intervals.clone()
    }
}

#[async_trait]
impl QueuePlayer for MockPlayer {
    async fn enqueue(&self, item: PlayableItem) -> Result<(), PlayerError> {
        self.inner.lock().unwrap().queue.push(item);
        Ok(())
    }

    async fn queued_items(&self) -> Vec<PlayableItem> {
        self.inner.lock().unwrap().queue.clone()
    }

    async fn current_item(&self) -> Option<PlayableItem> {
        self.inner.lock().unwrap().queue.first().cloned()
    }

    async fn pause(&self) -> Result<(), PlayerError> {
        self.inner.lock().unwrap().pauses += 1;
        Ok(())
    }

    fn subscribe(&self, interval: Duration) -> PlayerEventStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.push(sender);
        inner.subscribed_intervals.push(interval);
        PlayerEventStream::new(receiver)
    }
}
