//! Database connection pool management

mod postgres;

pub use postgres::{create_pool, migrator, run_migrations, PgPoolConfig};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;
