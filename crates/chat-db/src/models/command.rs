//! Command database model

use sqlx::FromRow;

/// Database model for commands table
#[derive(Debug, Clone, FromRow)]
pub struct CommandModel {
    pub id: i64,
    pub app_id: i64,
    pub name: String,
    pub description: String,
    /// Canonical JSON string of the declared options
    pub options: String,
}
