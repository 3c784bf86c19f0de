//! Event broadcasting
//!
//! Delivers envelopes coming back from the bus to local room members.

mod fanout;

pub use fanout::FanoutAdapter;
