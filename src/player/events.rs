use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::models::ContentId;

/// Notifications a player pushes to its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Periodic elapsed-time sample for the currently playing item.
    TimeUpdate {
        elapsed: Duration,
        duration: Duration,
    },
    /// The player moved to a different queue item, or ran out of items.
    CurrentItemChanged(Option<ContentId>),
}

/// Receiving half of a player event registration. Dropping the stream is the
/// unregistration; players hand out one stream per `subscribe` call.
#[derive(Debug)]
pub struct PlayerEventStream {
    receiver: mpsc::UnboundedReceiver<PlayerEvent>,
}

impl PlayerEventStream {
    pub fn new(receiver: mpsc::UnboundedReceiver<PlayerEvent>) -> Self {
        Self { receiver }
    }

    pub async fn recv(&mut self) -> Option<PlayerEvent> {
        self.receiver.recv().await
    }
}

impl Stream for PlayerEventStream {
    type Item = PlayerEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<PlayerEvent>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
