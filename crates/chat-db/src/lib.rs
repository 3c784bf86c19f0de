//! # chat-db
//!
//! Persistence behind the repository traits defined in `chat-core`.
//!
//! - PostgreSQL implementations via SQLx, with embedded migrations
//! - [`MemoryStore`], one in-memory store implementing every trait
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_db::{create_pool, run_migrations, PgConversationRepository, PgPoolConfig};
//!
//! let pool = create_pool(&PgPoolConfig::from(&config.database)).await?;
//! run_migrations(&pool).await?;
//! let conversations = PgConversationRepository::new(pool.clone());
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

pub use memory::MemoryStore;
pub use pool::{create_pool, migrator, run_migrations, PgPool, PgPoolConfig};
pub use repositories::{
    PgBotRepository, PgCommandRepository, PgConversationRepository, PgMemberRepository,
    PgMessageRepository, PgOverwriteRepository, PgUserRepository,
};
