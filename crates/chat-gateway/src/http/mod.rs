//! HTTP routes served next to the sockets
//!
//! Liveness, readiness and the slash-command entry point.

mod error;
mod extractors;

pub use error::ApiError;
pub use extractors::{AuthUser, ValidatedJson};

use axum::{extract::State, http::StatusCode, Json};
use chat_service::dto::{
    HealthResponse, InteractionAcceptedResponse, ReadinessResponse, SlashCommandRequest,
};
use chat_service::InteractionService;

use crate::server::GatewayState;

/// Liveness probe
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe: 503 until the bus is live and fanout is running
///
/// GET /ready
pub async fn readiness_check(State(state): State<GatewayState>) -> (StatusCode, Json<ReadinessResponse>) {
    let bus = state.fanout().bus_state();
    let ready = bus.is_live() && state.fanout().is_running();

    let response = ReadinessResponse {
        ready,
        bus: bus.as_str(),
        instance_id: state.instance_id().to_string(),
        connections: state.connections().connection_count(),
        dropped_events: state.fanout().dropped_events(),
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Dispatch a slash command to the app's bots
///
/// POST /api/v1/interactions
pub async fn create_interaction(
    State(state): State<GatewayState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(request): ValidatedJson<SlashCommandRequest>,
) -> Result<(StatusCode, Json<InteractionAcceptedResponse>), ApiError> {
    let accepted = InteractionService::new(state.service_context())
        .dispatch_slash_command(user_id, request)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(accepted)))
}
