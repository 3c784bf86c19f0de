//! Entity to model mappers
//!
//! - `From<Model> for Entity`: convert database rows to domain objects
//! - `*Insert` structs: prepare entity data for database writes

mod command;
mod conversation;
mod message;

pub use command::CommandInsert;
pub use message::MessageInsert;

use chat_core::{BotIdentity, Overwrite, Permissions, Snowflake, User};

use crate::models::{BotModel, OverwriteModel, UserModel};

impl From<OverwriteModel> for Overwrite {
    fn from(model: OverwriteModel) -> Self {
        Overwrite {
            channel_id: Snowflake::new(model.channel_id),
            target_id: Snowflake::new(model.target_id),
            allow: Permissions::from_i64(model.allow_bits),
            deny: Permissions::from_i64(model.deny_bits),
        }
    }
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            username: model.username,
            avatar: model.avatar,
            bot: model.bot,
        }
    }
}

impl From<BotModel> for BotIdentity {
    fn from(model: BotModel) -> Self {
        BotIdentity::new(Snowflake::new(model.id), Snowflake::new(model.app_id))
    }
}
