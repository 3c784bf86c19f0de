//! # chat-cache
//!
//! Redis connection pool and the cross-instance pub/sub bus behind room
//! broadcasts.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: Ordered publisher with retries and a reconnecting subscriber
//! - **Bus**: [`EventBus`] with a Redis implementation and an in-process one
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::{EventBus, RedisBus, RedisPool, wait_until_live};
//!
//! let pool = RedisPool::from_config(&redis_config)?;
//! let bus = RedisBus::connect(pool, bus_config.clone()).await?;
//! wait_until_live(&bus, bus_config.startup_timeout()).await?;
//!
//! let mut envelopes = bus.subscribe();
//! bus.publish(envelope).await?;
//! ```

pub mod bus;
pub mod pool;
pub mod pubsub;

pub use bus::{wait_until_live, BusError, BusState, EventBus, MemoryBus, RedisBus};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool};
pub use pubsub::{channel_name, BusEnvelope, Publisher, Subscriber, SubscriberBuilder};
