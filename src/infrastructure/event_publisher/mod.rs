//! Broadcast-based event publisher.
//!
//! Uses tokio broadcast channels to publish events to multiple subscribers.
//! Supports both global subscriptions and per-market subscriptions.

use crate::application::ports::EventPublisher;
use crate::domain::{EngineEvent, MarketId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

pub struct BroadcastEventPublisher {
    /// Global broadcast channel for all events
    global_tx: broadcast::Sender<EngineEvent>,
    /// Per-market broadcast channels
    market_channels: Arc<DashMap<MarketId, broadcast::Sender<EngineEvent>>>,
    /// Subscriber count
    subscriber_count: Arc<AtomicUsize>,
    /// Channel capacity
    capacity: usize,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (global_tx, _) = broadcast::channel(capacity);

        BroadcastEventPublisher {
            global_tx,
            market_channels: Arc::new(DashMap::new()),
            subscriber_count: Arc::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    /// Subscribe to all events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.subscriber_count.fetch_add(1, Ordering::SeqCst);
        self.global_tx.subscribe()
    }

    /// Subscribe to events for a specific market
    pub fn subscribe_market(&self, market_id: &MarketId) -> broadcast::Receiver<EngineEvent> {
        self.subscriber_count.fetch_add(1, Ordering::SeqCst);

        let entry = self
            .market_channels
            .entry(market_id.clone())
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.capacity);
                tx
            });

        entry.value().subscribe()
    }

    /// Unsubscribe (decrement counter)
    pub fn unsubscribe(&self) {
        self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(10000)
    }
}

impl Clone for BroadcastEventPublisher {
    fn clone(&self) -> Self {
        BroadcastEventPublisher {
            global_tx: self.global_tx.clone(),
            market_channels: Arc::clone(&self.market_channels),
            subscriber_count: Arc::clone(&self.subscriber_count),
            capacity: self.capacity,
        }
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: EngineEvent) {
        // Send errors mean no subscribers; that's fine.
        if let Some(market_id) = event.market_id() {
            if let Some(tx) = self.market_channels.get(market_id) {
                let _ = tx.send(event.clone());
            }
        }
        let _ = self.global_tx.send(event);
    }

    fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}
