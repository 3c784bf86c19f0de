//! Value objects - immutable types that represent domain concepts

mod permissions;
mod room;
mod snowflake;

pub use permissions::Permissions;
pub use room::{Namespace, RoomKey};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
