//! Pub/Sub channel definitions.
//!
//! One Redis channel per socket namespace. Every instance subscribes to all
//! of them at startup, so room membership never changes subscriptions.

use chat_core::Namespace;

/// Channel prefix for fanout envelopes
pub const FANOUT_CHANNEL_PREFIX: &str = "fanout:";

/// Redis channel carrying envelopes for one namespace
#[must_use]
pub fn channel_name(namespace: Namespace) -> String {
    format!("{FANOUT_CHANNEL_PREFIX}{namespace}")
}

/// Every fanout channel, in a stable order
#[must_use]
pub fn all_channels() -> Vec<String> {
    Namespace::ALL.into_iter().map(channel_name).collect()
}

/// Parse a channel name back to its namespace
#[must_use]
pub fn parse_channel(name: &str) -> Option<Namespace> {
    name.strip_prefix(FANOUT_CHANNEL_PREFIX)?.parse().ok()
}
