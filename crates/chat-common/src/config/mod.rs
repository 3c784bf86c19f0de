//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BusConfig, BusMode, ConfigError, DatabaseConfig, Environment,
    JwtConfig, RedisConfig, ServerConfig, SnowflakeConfig,
};
