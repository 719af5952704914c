//! A clock-driven stand-in for a real queueing player. Media time advances by
//! one second per real `tick`, items play gaplessly off the front of the
//! queue, and observers get the same periodic samples and current-item
//! notifications a real player integration would deliver.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::events::{PlayerEvent, PlayerEventStream};
use super::traits::QueuePlayer;
use crate::models::PlayableItem;
use crate::utils::errors::PlayerError;

struct Subscriber {
    interval: Duration,
    next_emit: Duration,
    sender: mpsc::UnboundedSender<PlayerEvent>,
}

struct PlayerInner {
    /// Front of the queue is the currently playing item.
    queue: VecDeque<PlayableItem>,
    elapsed: Duration,
    paused: bool,
    subscribers: Vec<Subscriber>,
}

impl PlayerInner {
    fn broadcast(&mut self, event: PlayerEvent) {
        self.subscribers
            .retain(|sub| sub.sender.send(event.clone()).is_ok());
    }
}

pub struct SimulatedPlayer {
    inner: Arc<Mutex<PlayerInner>>,
}

impl SimulatedPlayer {
    /// Start a player whose items all run for `item_duration` of media time,
    /// advancing one media second per real `tick`. The driver task stops when
    /// the player is dropped.
    pub fn spawn(item_duration: Duration, tick: Duration) -> Arc<Self> {
        let inner = Arc::new(Mutex::new(PlayerInner {
            queue: VecDeque::new(),
            elapsed: Duration::ZERO,
            paused: false,
            subscribers: Vec::new(),
        }));

        let weak: Weak<Mutex<PlayerInner>> = Arc::downgrade(&inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                Self::advance(&inner, item_duration);
            }
        });

        Arc::new(Self { inner })
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }

    fn advance(inner: &Mutex<PlayerInner>, item_duration: Duration) {
        let mut inner = inner.lock().unwrap();
        if inner.paused || inner.queue.is_empty() {
            return;
        }

        inner.elapsed += Duration::from_secs(1);
        let elapsed = inner.elapsed;
        inner.subscribers.retain_mut(|sub| {
            while elapsed >= sub.next_emit {
                let sample = PlayerEvent::TimeUpdate {
                    elapsed: sub.next_emit,
                    duration: item_duration,
                };
                if sub.sender.send(sample).is_err() {
                    return false;
                }
                sub.next_emit += sub.interval;
            }
            true
        });

        if inner.elapsed >= item_duration {
            let finished = inner.queue.pop_front();
            if let Some(finished) = finished {
                debug!(content_id = %finished.content_id, "simulated item finished");
            }
            inner.elapsed = Duration::ZERO;
            for sub in &mut inner.subscribers {
                sub.next_emit = sub.interval;
            }
            let current = inner.queue.front().map(|item| item.content_id.clone());
            inner.broadcast(PlayerEvent::CurrentItemChanged(current));
        }
    }
}

#[async_trait]
impl QueuePlayer for SimulatedPlayer {
    async fn enqueue(&self, item: PlayableItem) -> Result<(), PlayerError> {
        let mut inner = self.inner.lock().unwrap();
        let was_empty = inner.queue.is_empty();
        debug!(content_id = %item.content_id, "enqueueing item");
        inner.queue.push_back(item);
        if was_empty {
            inner.elapsed = Duration::ZERO;
            for sub in &mut inner.subscribers {
                sub.next_emit = sub.interval;
            }
            let current = inner.queue.front().map(|i| i.content_id.clone());
            inner.broadcast(PlayerEvent::CurrentItemChanged(current));
        }
        Ok(())
    }

    async fn queued_items(&self) -> Vec<PlayableItem> {
        self.inner.lock().unwrap().queue.iter().cloned().collect()
    }

    async fn current_item(&self) -> Option<PlayableItem> {
        self.inner.lock().unwrap().queue.front().cloned()
    }

    async fn pause(&self) -> Result<(), PlayerError> {
        self.inner.lock().unwrap().paused = true;
        Ok(())
    }

    fn subscribe(&self, interval: Duration) -> PlayerEventStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inner.lock().unwrap().subscribers.push(Subscriber {
            interval,
            next_emit: interval,
            sender,
        });
        PlayerEventStream::new(receiver)
    }
}
