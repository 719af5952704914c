use async_trait::async_trait;
use std::time::Duration;

use super::events::PlayerEventStream;
use crate::models::PlayableItem;
use crate::utils::errors::PlayerError;

/// A player with an internal queue for gapless sequential playback. The
/// coordination core only ever appends; the player consumes its queue on its
/// own as items finish.
#[async_trait]
pub trait QueuePlayer: Send + Sync {
    /// Append an item after the current queue tail.
    async fn enqueue(&self, item: PlayableItem) -> Result<(), PlayerError>;

    /// Ordered snapshot of the queue, starting with the currently playing
    /// item. Empty when nothing is queued.
    async fn queued_items(&self) -> Vec<PlayableItem>;

    /// The item currently being played, if any.
    async fn current_item(&self) -> Option<PlayableItem>;

    async fn pause(&self) -> Result<(), PlayerError>;

    /// Register for elapsed-time samples every `interval` of media time plus
    /// current-item-changed notifications. Dropping the returned stream is
    /// the unregistration.
    fn subscribe(&self, interval: Duration) -> PlayerEventStream;
}
