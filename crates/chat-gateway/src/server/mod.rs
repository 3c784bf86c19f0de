//! Gateway server setup
//!
//! Wires repositories, the bus and the service context together, then serves
//! the socket namespaces and HTTP routes.

mod socket;
mod state;

pub use socket::{bots_socket, interactions_socket, messages_socket, TokenQuery};
pub use state::GatewayState;

use crate::http::{create_interaction, health_check, readiness_check};
use axum::{
    routing::{get, post},
    Router,
};
use chat_cache::{EventBus, MemoryBus, RedisBus, RedisPool};
use chat_common::{AppConfig, AppError, BusMode, JwtService};
use chat_core::SnowflakeGenerator;
use chat_db::{
    PgBotRepository, PgCommandRepository, PgConversationRepository, PgMemberRepository,
    PgMessageRepository, PgOverwriteRepository, PgPoolConfig, PgUserRepository,
};
use chat_service::{Broadcaster, ServiceContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws/messages", get(messages_socket))
        .route("/ws/bots", get(bots_socket))
        .route("/ws/interactions", get(interactions_socket))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/api/v1/interactions", post(create_interaction))
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connect the bus selected by configuration
pub async fn connect_bus(config: &AppConfig) -> Result<Arc<dyn EventBus>, AppError> {
    match config.bus.mode {
        BusMode::Redis => {
            let redis = config
                .redis
                .as_ref()
                .ok_or_else(|| AppError::Config("REDIS_URL is required for the redis bus".to_string()))?;

            tracing::info!("Connecting to Redis...");
            let pool = RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
            let bus = RedisBus::connect(pool, config.bus.clone())
                .await
                .map_err(|e| AppError::Cache(e.to_string()))?;
            Ok(Arc::new(bus))
        }
        BusMode::Memory => {
            tracing::warn!("Using in-process bus; events stay on this instance");
            Ok(Arc::new(MemoryBus::with_capacity(config.bus.dispatch_buffer)))
        }
    }
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: &AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL...");
    let pool = chat_db::create_pool(&PgPoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    chat_db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    let bus = connect_bus(config).await?;

    let service_context = ServiceContext::builder()
        .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
        .overwrite_repo(Arc::new(PgOverwriteRepository::new(pool.clone())))
        .member_repo(Arc::new(PgMemberRepository::new(pool.clone())))
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .command_repo(Arc::new(PgCommandRepository::new(pool.clone())))
        .bot_repo(Arc::new(PgBotRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool)))
        .broadcaster(Broadcaster::new(bus, config.app.instance_id.as_str()))
        .jwt_service(Arc::new(JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry,
        )))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(GatewayState::new(service_context))
}

/// Start fanout and return the application.
///
/// Waits for the bus to be live; nothing may be served before that.
pub async fn start(state: GatewayState, startup_timeout: Duration) -> Result<Router, AppError> {
    state
        .fanout()
        .start(startup_timeout)
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?;

    Ok(create_app(state))
}

/// Serve the application on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Gateway listening on {}", addr);
    }

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_gateway_state(&config).await?;
    let app = start(state, config.bus.startup_timeout()).await?;

    let addr = config.gateway.address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, app).await
}
