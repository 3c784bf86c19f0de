//! Permission overwrite database model

use sqlx::FromRow;

/// Database model for overwrites table
#[derive(Debug, Clone, Copy, FromRow)]
pub struct OverwriteModel {
    pub channel_id: i64,
    pub target_id: i64,
    pub allow_bits: i64,
    pub deny_bits: i64,
}
