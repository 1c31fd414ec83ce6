use crate::domain::EngineEvent;
use async_trait::async_trait;

/// Publisher for engine events.
///
/// Events are published to subscribers (notification hooks, activity feeds,
/// message queues). This decouples the engine from the delivery mechanism;
/// publishing happens after the trade's locks are released.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all subscribers
    async fn publish(&self, event: EngineEvent);

    /// Get the number of active subscribers
    fn subscriber_count(&self) -> usize;
}
