//! Test helpers for integration tests
//!
//! Provides a gateway spawned on an ephemeral port, HTTP shortcuts and a
//! raw socket client speaking `{event, data}` frames.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use chat_bot::{BotConfig, Frame};
use chat_cache::{EventBus, MemoryBus};
use chat_common::JwtService;
use chat_core::{Namespace, RoomKey, Snowflake, SnowflakeGenerator};
use chat_db::MemoryStore;
use chat_gateway::GatewayState;
use chat_service::{Broadcaster, ServiceContext};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::fixtures::seeded_store;

/// How long a test waits for any single frame
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

const JWT_SECRET: &str = "integration-secret";

/// Distinct snowflake workers so instances sharing a store never collide
static WORKER_COUNTER: AtomicU16 = AtomicU16::new(1);

/// Gateway instance running on 127.0.0.1 with an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: MemoryStore,
    state: GatewayState,
    jwt: Arc<JwtService>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a gateway over a freshly seeded store and its own bus
    pub async fn start() -> Result<Self> {
        Self::start_with(seeded_store(), Arc::new(MemoryBus::new()), "gateway-1").await
    }

    /// Start a gateway over a given store and bus.
    ///
    /// Servers that share both behave like instances of one deployment.
    pub async fn start_with(store: MemoryStore, bus: Arc<dyn EventBus>, instance_id: &str) -> Result<Self> {
        let jwt = Arc::new(JwtService::new(JWT_SECRET, 900));
        let worker = WORKER_COUNTER.fetch_add(1, Ordering::SeqCst);

        let context = ServiceContext::builder()
            .store(Arc::new(store.clone()))
            .broadcaster(Broadcaster::new(bus, instance_id))
            .jwt_service(jwt.clone())
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(worker)))
            .build()?;

        let state = GatewayState::new(context);
        let app = chat_gateway::start(state.clone(), Duration::from_secs(1)).await?;

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            chat_gateway::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            store,
            state,
            jwt,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, namespace: &str) -> String {
        format!("ws://{}/ws/{namespace}", self.addr)
    }

    pub fn state(&self) -> &GatewayState {
        &self.state
    }

    /// Access token for a user, signed with this server's secret
    pub fn user_token(&self, user_id: i64) -> Result<String> {
        Ok(self.jwt.issue_access_token(Snowflake::new(user_id))?)
    }

    /// Bot SDK configuration pointing at this server
    pub fn bot_config(&self, token: &str) -> BotConfig {
        BotConfig::new(format!("ws://{}", self.addr), token)
    }

    /// Open the user stream authenticated as `user_id`
    pub async fn connect_user(&self, user_id: i64) -> Result<WsClient> {
        let url = format!("{}?token={}", self.ws_url("messages"), self.user_token(user_id)?);
        WsClient::connect(&url).await
    }

    /// Open a bot namespace with a raw client
    pub async fn connect_bot(&self, namespace: &str, token: &str) -> Result<WsClient> {
        WsClient::connect(&format!("{}?token={token}", self.ws_url(namespace))).await
    }

    /// Wait until some connection of `app_id` is in its interaction room
    pub async fn wait_for_app(&self, app_id: i64) -> Result<()> {
        let room = RoomKey::app(Namespace::Interactions, Snowflake::new(app_id));
        wait_until(|| !self.state.connections().members(&room).is_empty()).await
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    pub async fn post_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await?)
    }
}

/// Poll a condition until it holds or `RECV_TIMEOUT` passes
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> Result<()> {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            bail!("Condition not met within {RECV_TIMEOUT:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}

/// Raw socket client
pub struct WsClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (socket, _) = tokio_tungstenite::connect_async(url).await?;
        Ok(Self { socket })
    }

    pub async fn send(&mut self, event: &str, data: Value) -> Result<()> {
        let text = Frame::new(event, data).to_json()?;
        self.socket.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Next text frame
    pub async fn recv(&mut self) -> Result<Frame> {
        loop {
            let next = tokio::time::timeout(RECV_TIMEOUT, self.socket.next()).await;
            match next {
                Err(_) => bail!("No frame within {RECV_TIMEOUT:?}"),
                Ok(None) => bail!("Socket ended"),
                Ok(Some(Err(e))) => bail!("Socket error: {e}"),
                Ok(Some(Ok(Message::Text(text)))) => return Ok(Frame::from_json(&text)?),
                Ok(Some(Ok(Message::Close(_)))) => bail!("Socket closed"),
                Ok(Some(Ok(_))) => {}
            }
        }
    }

    /// Data of the next frame named `event`, skipping others
    pub async fn recv_event(&mut self, event: &str) -> Result<Value> {
        loop {
            let frame = self.recv().await?;
            if frame.event == event {
                return Ok(frame.data);
            }
        }
    }

    /// True if no text frame arrives within `wait`
    pub async fn is_quiet(&mut self, wait: Duration) -> bool {
        loop {
            match tokio::time::timeout(wait, self.socket.next()).await {
                Err(_) | Ok(None) => return true,
                Ok(Some(Ok(Message::Text(_)))) => return false,
                Ok(Some(_)) => {}
            }
        }
    }

    /// True if the server closes the socket without sending any text frame
    pub async fn closed_without_payload(&mut self) -> bool {
        loop {
            match tokio::time::timeout(RECV_TIMEOUT, self.socket.next()).await {
                Ok(None | Some(Err(_) | Ok(Message::Close(_)))) => return true,
                Ok(Some(Ok(Message::Text(_)))) | Err(_) => return false,
                Ok(Some(Ok(_))) => {}
            }
        }
    }

    /// Join a conversation and wait for the confirmation
    pub async fn join(&mut self, conversation_id: i64) -> Result<()> {
        self.send(
            "joinConversation",
            serde_json::json!({ "conversation_id": conversation_id.to_string() }),
        )
        .await?;
        self.recv_event("joinedConversation").await?;
        Ok(())
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
