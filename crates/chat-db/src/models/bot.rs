//! Bot database model

use sqlx::FromRow;

/// Row of the bots table without the token column
#[derive(Debug, Clone, Copy, FromRow)]
pub struct BotModel {
    pub id: i64,
    pub app_id: i64,
}
