use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use super::progress::ProgressEngine;
use super::resolver::ItemResolver;
use super::state::ControllerState;
use super::store::PlaylistStore;
use crate::constants::{LOOKAHEAD_THRESHOLD, PROGRESS_REPORT_INTERVAL};
use crate::models::{ContentId, PlayableItem, PlaylistEntry, ProgressRecord};
use crate::player::{PlayerEvent, QueuePlayer};
use crate::services::{PlaylistRepository, ProgressService, VideoStreamService};
use crate::utils::errors::PlaybackError;

/// Externally observable snapshot of the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorStatus {
    pub state: ControllerState,
    pub cursor: usize,
    pub playlist_len: usize,
}

/// External entry points, serialized onto the coordinator's event loop.
#[derive(Debug)]
enum Command {
    Reload,
    ReloadIfRequired,
}

/// Completions and player notifications marshaled back onto the event loop.
/// Session-scoped messages carry the epoch they were spawned under; a stale
/// epoch means the session was reloaded or torn down in the meantime and the
/// completion is dropped instead of applied.
enum Internal {
    PlaylistLoaded {
        epoch: u64,
        result: Result<Vec<PlaylistEntry>, PlaybackError>,
    },
    SeedResolved {
        epoch: u64,
        result: Result<Vec<(usize, PlayableItem)>, PlaybackError>,
    },
    NextResolved {
        epoch: u64,
        index: usize,
        result: Result<PlayableItem, PlaybackError>,
    },
    ProgressCompleted {
        epoch: u64,
        record: Option<ProgressRecord>,
    },
    Player(PlayerEvent),
}

/// Handle for driving a running coordinator. Cloneable; dropping every handle
/// (or calling `shutdown`) ends the event loop.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<CoordinatorStatus>,
    cancel: CancellationToken,
}

impl CoordinatorHandle {
    /// Force a fresh loading cycle, replacing the playlist snapshot. Valid
    /// from any state, including `Failed`.
    pub fn reload(&self) {
        let _ = self.sender.send(Command::Reload);
    }

    /// Reload only if nothing has been loaded yet.
    pub fn reload_if_required(&self) {
        let _ = self.sender.send(Command::ReloadIfRequired);
    }

    pub fn status(&self) -> CoordinatorStatus {
        self.status.borrow().clone()
    }

    /// Watch channel for status changes; useful for waiting on a settled
    /// state.
    pub fn watch_status(&self) -> watch::Receiver<CoordinatorStatus> {
        self.status.clone()
    }

    /// Tear the coordinator down. The event loop exits, the player event
    /// registration is released, and in-flight completions become no-ops.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Owns the playlist snapshot, the cursor, and the controller state, and
/// keeps the player's queue one item ahead of playback while syncing
/// progress with the tracking service. All mutation happens on the event
/// loop in `run`; the caller-facing surface is `CoordinatorHandle`.
pub struct PlaybackCoordinator {
    initial_content: ContentId,
    repository: Arc<dyn PlaylistRepository>,
    resolver: Arc<ItemResolver>,
    player: Arc<dyn QueuePlayer>,
    progress: ProgressEngine,
    store: PlaylistStore,
    state: ControllerState,
    /// State to fall back to when a reload aborts on a repository failure.
    prior_state: ControllerState,
    /// Bumped on every reload and at teardown; fences off stale completions.
    epoch: u64,
    report_interval: Duration,
    lookahead_threshold: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    status_tx: watch::Sender<CoordinatorStatus>,
    cancel: CancellationToken,
}

impl PlaybackCoordinator {
    pub fn new(
        initial_content: ContentId,
        repository: Arc<dyn PlaylistRepository>,
        streams: Arc<dyn VideoStreamService>,
        progress: Arc<dyn ProgressService>,
        player: Arc<dyn QueuePlayer>,
    ) -> (CoordinatorHandle, PlaybackCoordinator) {
        Self::with_tuning(
            initial_content,
            repository,
            streams,
            progress,
            player,
            PROGRESS_REPORT_INTERVAL,
            LOOKAHEAD_THRESHOLD,
        )
    }

    pub fn with_tuning(
        initial_content: ContentId,
        repository: Arc<dyn PlaylistRepository>,
        streams: Arc<dyn VideoStreamService>,
        progress: Arc<dyn ProgressService>,
        player: Arc<dyn QueuePlayer>,
        report_interval: Duration,
        lookahead_threshold: Duration,
    ) -> (CoordinatorHandle, PlaybackCoordinator) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(CoordinatorStatus {
            state: ControllerState::Initial,
            cursor: 0,
            playlist_len: 0,
        });
        let cancel = CancellationToken::new();

        let coordinator = PlaybackCoordinator {
            initial_content,
            repository,
            resolver: Arc::new(ItemResolver::new(streams)),
            player: Arc::clone(&player),
            progress: ProgressEngine::new(progress, player),
            store: PlaylistStore::new(),
            state: ControllerState::Initial,
            prior_state: ControllerState::Initial,
            epoch: 0,
            report_interval,
            lookahead_threshold,
            commands: cmd_rx,
            internal_tx,
            internal_rx,
            status_tx,
            cancel: cancel.clone(),
        };
        let handle = CoordinatorHandle {
            sender: cmd_tx,
            status: status_rx,
            cancel,
        };

        (handle, coordinator)
    }

    /// Run the event loop to completion. This is the single logical context
    /// every callback is marshaled onto; no two state mutations interleave.
    pub async fn run(mut self) {
        debug!("playback coordinator event loop started");

        // Register for player notifications. The forwarder owns the stream;
        // dropping it when the loop ends is the one unregistration.
        let mut events = self.player.subscribe(self.report_interval);
        let forward_tx = self.internal_tx.clone();
        let forward_cancel = self.cancel.child_token();
        let forwarder = tokio::spawn(async move {
            use futures::StreamExt;
            loop {
                tokio::select! {
                    _ = forward_cancel.cancelled() => break,
                    event = events.next() => match event {
                        Some(event) => {
                            if forward_tx.send(Internal::Player(event)).is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                command = self.commands.recv() => match command {
                    Some(command) => {
                        self.handle_command(command);
                        self.publish_status();
                    }
                    // Every handle dropped: tear down.
                    None => break,
                },
                Some(message) = self.internal_rx.recv() => {
                    self.handle_internal(message).await;
                    self.publish_status();
                }
            }
        }

        // Invalidate anything still in flight, then wait for the
        // unregistration to complete.
        self.epoch += 1;
        self.cancel.cancel();
        let _ = forwarder.await;
        debug!("playback coordinator event loop stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Reload => self.reload(),
            Command::ReloadIfRequired => {
                if self.state == ControllerState::Initial {
                    self.reload();
                }
            }
        }
    }

    fn reload(&mut self) {
        // Re-entrant reloads always force a fresh loading cycle; completions
        // belonging to the previous session are fenced off by the epoch.
        self.epoch += 1;
        self.prior_state = self.state;
        self.set_state(ControllerState::Loading);

        let repository = Arc::clone(&self.repository);
        let content_id = self.initial_content.clone();
        let tx = self.internal_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = repository
                .playlist(&content_id)
                .await
                .map_err(PlaybackError::from);
            let _ = tx.send(Internal::PlaylistLoaded { epoch, result });
        });
    }

    async fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::PlaylistLoaded { epoch, result } => {
                if epoch != self.epoch {
                    trace!("dropping stale playlist load");
                    return;
                }
                match result {
                    Ok(entries) => {
                        info!(count = entries.len(), "playlist loaded");
                        self.store.replace_snapshot(entries);
                        self.progress.reset();
                        if self.store.is_empty() {
                            // The load itself succeeded; there is just
                            // nothing to seed.
                            self.set_state(ControllerState::HasData);
                            return;
                        }
                        self.set_state(ControllerState::LoadingAdditional);
                        self.spawn_seed();
                    }
                    Err(err) => {
                        // Abort the reload; snapshot and state stay as they
                        // were before it.
                        error!(%err, "unable to load playlist");
                        self.set_state(self.prior_state);
                    }
                }
            }
            Internal::SeedResolved { epoch, result } => {
                if epoch != self.epoch {
                    trace!("dropping stale seed resolution");
                    return;
                }
                match result {
                    Ok(items) => {
                        for (index, item) in items {
                            if let Err(err) = self.player.enqueue(item).await {
                                error!(%err, "player rejected seeded item");
                                self.set_state(ControllerState::Failed);
                                return;
                            }
                            self.store.advance_cursor_to(index);
                        }
                        self.set_state(ControllerState::HasData);
                    }
                    Err(err) => {
                        error!(%err, "unable to enqueue first playlist items");
                        self.set_state(ControllerState::Failed);
                    }
                }
            }
            Internal::NextResolved {
                epoch,
                index,
                result,
            } => {
                if epoch != self.epoch {
                    trace!("dropping stale lookahead resolution");
                    return;
                }
                match result {
                    Ok(item) => {
                        if let Err(err) = self.player.enqueue(item).await {
                            error!(%err, "player rejected next playlist item");
                            self.set_state(ControllerState::Failed);
                            return;
                        }
                        self.store.advance_cursor_to(index);
                        self.set_state(ControllerState::HasData);
                    }
                    Err(err) => {
                        // No automatic retry; the cursor stays put until the
                        // owner reloads.
                        error!(%err, "unable to enqueue next playlist item");
                        self.set_state(ControllerState::Failed);
                    }
                }
            }
            Internal::ProgressCompleted { epoch, record } => {
                if epoch != self.epoch {
                    trace!("dropping stale progress completion");
                    return;
                }
                if let Some(record) = record {
                    self.store.merge_progress(record);
                }
            }
            Internal::Player(event) => match event {
                PlayerEvent::TimeUpdate { elapsed, duration } => {
                    self.handle_time_update(elapsed, duration).await;
                }
                PlayerEvent::CurrentItemChanged(Some(content_id)) => {
                    self.progress.playback_became_current(&content_id);
                }
                PlayerEvent::CurrentItemChanged(None) => {
                    // Empty-queue recovery.
                    self.maybe_enqueue_next();
                }
            },
        }
    }

    async fn handle_time_update(&mut self, elapsed: Duration, duration: Duration) {
        // The progress push happens on every sample, even mid-load.
        if let Some(entry) = self.store.entry_at_cursor() {
            let content_id = entry.content.id.clone();
            let pusher = self.progress.pusher();
            let tx = self.internal_tx.clone();
            let epoch = self.epoch;
            tokio::spawn(async move {
                let record = pusher.update(&content_id, elapsed).await;
                let _ = tx.send(Internal::ProgressCompleted { epoch, record });
            });
        }

        // Check whether the next item needs enqueueing yet.
        if self.state.is_loading() {
            return;
        }
        let Some(current) = self.player.current_item().await else {
            // Nothing playing at all: recover immediately.
            return self.maybe_enqueue_next();
        };
        let queued = self.player.queued_items().await;
        if queued.last() != Some(&current) {
            // A successor is already queued.
            return;
        }
        if duration.saturating_sub(elapsed) < self.lookahead_threshold {
            self.maybe_enqueue_next();
        }
    }

    /// Kick off resolution of the entry after the cursor. A new lookahead
    /// cycle is only entered from `HasData`: loads already in flight are not
    /// duplicated, and a failed cycle is not retried until the owner reloads.
    /// A no-op as well when the cursor sits on the final entry.
    fn maybe_enqueue_next(&mut self) {
        if self.state != ControllerState::HasData {
            return;
        }
        let Some(index) = self.store.next_index() else {
            return;
        };
        let Some(entry) = self.store.entry(index).cloned() else {
            return;
        };

        self.set_state(ControllerState::LoadingAdditional);
        let resolver = Arc::clone(&self.resolver);
        let tx = self.internal_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = resolver.resolve(&entry).await;
            let _ = tx.send(Internal::NextResolved {
                epoch,
                index,
                result,
            });
        });
    }

    /// Resolve and enqueue the first two entries of a fresh snapshot in one
    /// loading cycle, leaving the cursor on the most recently enqueued entry.
    fn spawn_seed(&self) {
        let resolver = Arc::clone(&self.resolver);
        let first = self.store.entry(0).cloned();
        let second = self.store.entry(1).cloned();
        let tx = self.internal_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result: Result<Vec<(usize, PlayableItem)>, PlaybackError> = async {
                let mut items = Vec::new();
                if let Some(entry) = first {
                    items.push((0, resolver.resolve(&entry).await?));
                }
                if let Some(entry) = second {
                    items.push((1, resolver.resolve(&entry).await?));
                }
                Ok(items)
            }
            .await;
            let _ = tx.send(Internal::SeedResolved { epoch, result });
        });
    }

    fn set_state(&mut self, state: ControllerState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "controller state changed");
            self.state = state;
        }
    }

    fn publish_status(&self) {
        let _ = self.status_tx.send(CoordinatorStatus {
            state: self.state,
            cursor: self.store.cursor(),
            playlist_len: self.store.len(),
        });
    }
}
