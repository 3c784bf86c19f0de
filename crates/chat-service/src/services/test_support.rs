//! Shared fixtures for service tests

use std::sync::Arc;

use chat_cache::{BusEnvelope, EventBus, MemoryBus};
use chat_common::JwtService;
use chat_core::{Snowflake, SnowflakeGenerator};
use chat_db::MemoryStore;
use tokio::sync::broadcast;

use super::broadcast::Broadcaster;
use super::context::{ServiceContext, ServiceContextBuilder};

pub(crate) struct Fixture {
    pub store: MemoryStore,
    pub ctx: ServiceContext,
    pub events: broadcast::Receiver<BusEnvelope>,
}

impl Fixture {
    /// Next envelope already on the bus, if any
    pub fn next_event(&mut self) -> Option<BusEnvelope> {
        self.events.try_recv().ok()
    }
}

pub(crate) fn id(n: i64) -> Snowflake {
    Snowflake::new(n)
}

pub(crate) fn fixture() -> Fixture {
    fixture_with(|_, builder| builder)
}

/// Fixture whose builder can be adjusted before it is built, e.g. to swap a repository
pub(crate) fn fixture_with(
    customize: impl FnOnce(&MemoryStore, ServiceContextBuilder) -> ServiceContextBuilder,
) -> Fixture {
    let store = MemoryStore::new();
    let bus = MemoryBus::new();
    let events = bus.subscribe();

    let builder = ServiceContext::builder()
        .store(Arc::new(store.clone()))
        .broadcaster(Broadcaster::new(Arc::new(bus), "test"))
        .jwt_service(Arc::new(JwtService::new("test-secret", 900)))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)));
    let ctx = customize(&store, builder)
        .build()
        .expect("complete context");

    Fixture { store, ctx, events }
}
