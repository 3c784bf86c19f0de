//! Redis Pub/Sub module.
//!
//! Channel naming, the envelope format and the publisher and subscriber
//! tasks backing [`crate::RedisBus`].

mod channels;
mod envelope;
mod publisher;
mod subscriber;

pub use channels::{all_channels, channel_name, parse_channel, FANOUT_CHANNEL_PREFIX};
pub use envelope::BusEnvelope;
pub use publisher::{Publisher, PUBLISH_QUEUE_CAPACITY};
pub use subscriber::{
    Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError, SubscriberResult,
};
