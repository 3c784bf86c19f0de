//! WebSocket handler
//!
//! Authenticates the handshake, registers the connection and runs its
//! reader and writer tasks.

use crate::connection::{Connection, Identity};
use crate::handlers::{EventRouter, HandlerError};
use crate::protocol::GatewayMessage;
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chat_core::{Namespace, RoomKey};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 256;

/// `?token=` fallback for clients that cannot set headers
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

/// `/ws/messages`
pub async fn messages_socket(
    State(state): State<GatewayState>,
    bearer: BearerHeader,
    Query(query): Query<TokenQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    upgrade(state, ws, Namespace::Messages, bearer_token(bearer, query))
}

/// `/ws/bots`
pub async fn bots_socket(
    State(state): State<GatewayState>,
    bearer: BearerHeader,
    Query(query): Query<TokenQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    upgrade(state, ws, Namespace::Bots, bearer_token(bearer, query))
}

/// `/ws/interactions`
pub async fn interactions_socket(
    State(state): State<GatewayState>,
    bearer: BearerHeader,
    Query(query): Query<TokenQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    upgrade(state, ws, Namespace::Interactions, bearer_token(bearer, query))
}

/// Header first, query parameter second
fn bearer_token(bearer: BearerHeader, query: TokenQuery) -> Option<String> {
    bearer
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
        .or(query.token)
}

fn upgrade(state: GatewayState, ws: WebSocketUpgrade, namespace: Namespace, token: Option<String>) -> Response {
    ws.on_upgrade(move |socket| async move {
        match authenticate(&state, namespace, token.as_deref()).await {
            Some(identity) => handle_socket(state, socket, namespace, identity).await,
            None => reject(socket).await,
        }
    })
}

/// Resolve the handshake token for the namespace
async fn authenticate(state: &GatewayState, namespace: Namespace, token: Option<&str>) -> Option<Identity> {
    let Some(token) = token else {
        tracing::debug!(namespace = %namespace, "Handshake without token");
        return None;
    };

    if namespace.is_bot() {
        match state.service_context().bot_repo().find_by_token(token).await {
            Ok(Some(identity)) => Some(Identity::Bot(identity)),
            Ok(None) => {
                tracing::debug!(namespace = %namespace, "Unknown bot token");
                None
            }
            Err(e) => {
                tracing::warn!(namespace = %namespace, error = %e, "Bot token lookup failed");
                None
            }
        }
    } else {
        match state.service_context().jwt_service().verify(token) {
            Ok(user_id) => Some(Identity::User(user_id)),
            Err(e) => {
                tracing::debug!(namespace = %namespace, error = %e, "Invalid user token");
                None
            }
        }
    }
}

/// Close an unauthenticated socket without any payload
async fn reject(mut socket: WebSocket) {
    let _ = socket.send(Message::Close(None)).await;
}

/// Handle an authenticated WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket, namespace: Namespace, identity: Identity) {
    let (tx, mut rx) = mpsc::channel::<GatewayMessage>(MESSAGE_BUFFER_SIZE);
    let connection = state.connections().register(namespace, identity, tx);
    let conn_id = connection.id();

    if let Identity::Bot(bot) = identity {
        state
            .connections()
            .join(conn_id, RoomKey::app(namespace, bot.app_id));
    }

    tracing::info!(
        conn_id = %conn_id,
        namespace = %namespace,
        principal_id = %identity.principal_id(),
        "WebSocket connection established"
    );

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Writer task
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg.to_json() {
                Ok(json) => {
                    if ws_sink.send(Message::Text(json)).await.is_err() {
                        tracing::debug!(conn_id = %conn_id, "Failed to write to WebSocket");
                        break;
                    }
                }
                Err(e) => tracing::warn!(conn_id = %conn_id, error = %e, "Failed to encode message"),
            }
        }

        let _ = ws_sink.close().await;
    });

    // Reader task; frames of one connection are handled in arrival order
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    handle_text_message(&state_recv, &connection_recv, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    let err = HandlerError::InvalidPayload("Binary frames are not supported".to_string());
                    send_error(&connection_recv, &err, None).await;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::info!(conn_id = %conn_id, "Client closed connection");
                    break;
                }
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = recv_task => {
            tracing::debug!(conn_id = %conn_id, "Receive task ended");
        }
        _ = send_task => {
            tracing::debug!(conn_id = %conn_id, "Send task ended");
        }
    }

    state.connections().remove(conn_id);
    tracing::info!(conn_id = %conn_id, age_ms = connection.age().as_millis(), "WebSocket connection closed");
}

/// Decode and dispatch one text frame, answering failures with `error`
async fn handle_text_message(state: &GatewayState, connection: &Arc<Connection>, text: &str) {
    let message = match GatewayMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            send_error(connection, &HandlerError::from(e), None).await;
            return;
        }
    };

    let event = message.event.clone();
    tracing::trace!(conn_id = %connection.id(), event = %event, "Received message");

    if let Err(e) = EventRouter::dispatch(state, connection, message).await {
        if e.is_internal() {
            tracing::error!(conn_id = %connection.id(), event = %event, error = %e, "Handler failed");
        } else {
            tracing::debug!(conn_id = %connection.id(), event = %event, error = %e, "Request refused");
        }
        send_error(connection, &e, Some(&event)).await;
    }
}

async fn send_error(connection: &Connection, err: &HandlerError, event: Option<&str>) {
    let _ = connection.send(GatewayMessage::error(&err.to_payload(event))).await;
}
