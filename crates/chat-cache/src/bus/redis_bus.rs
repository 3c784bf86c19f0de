//! Redis-backed bus: pooled ordered publisher plus one reconnecting subscriber.

use async_trait::async_trait;
use chat_common::BusConfig;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::{BusError, BusState, EventBus};
use crate::pool::RedisPool;
use crate::pubsub::{BusEnvelope, Publisher, Subscriber, SubscriberBuilder};

pub struct RedisBus {
    publisher: Publisher,
    publisher_task: JoinHandle<()>,
    subscriber: Subscriber,
}

impl RedisBus {
    /// Verify the publishing side and start both tasks.
    ///
    /// Fails fast when Redis is unreachable. The subscriber side reports
    /// through [`EventBus::state`]; callers gate readiness on it.
    pub async fn connect(pool: RedisPool, config: BusConfig) -> Result<Self, BusError> {
        pool.health_check().await?;

        let subscriber = SubscriberBuilder::new()
            .redis_url(pool.url())
            .broadcast_buffer(config.dispatch_buffer)
            .bus_config(config.clone())
            .spawn();
        let (publisher, publisher_task) = Publisher::spawn(pool, config);

        Ok(Self {
            publisher,
            publisher_task,
            subscriber,
        })
    }
}

impl Drop for RedisBus {
    fn drop(&mut self) {
        self.publisher_task.abort();
        self.subscriber.shutdown();
    }
}

impl std::fmt::Debug for RedisBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBus")
            .field("state", &*self.subscriber.state().borrow())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EventBus for RedisBus {
    async fn publish(&self, envelope: BusEnvelope) -> Result<(), BusError> {
        self.publisher.enqueue(envelope).await
    }

    fn subscribe(&self) -> broadcast::Receiver<BusEnvelope> {
        self.subscriber.receiver()
    }

    fn state(&self) -> watch::Receiver<BusState> {
        self.subscriber.state()
    }
}
