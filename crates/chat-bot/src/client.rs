//! Bot client
//!
//! Holds two sockets: `/ws/bots` carries requests and their acks,
//! `/ws/interactions` carries slash commands and button clicks routed to
//! the registered handlers.

use std::sync::Arc;

use chat_core::Snowflake;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::BotConfig;
use crate::error::BotError;
use crate::handlers::{ButtonHandler, CommandHandler, Handlers};
use crate::pending::{AckKind, PendingAcks};
use crate::protocol::{
    events, ButtonClick, CommandDeclaration, CommandValidated, ErrorEvent, Frame, Interaction,
    MessageRemoved, MessageSent, MessageUpdated, SendMessage, UpdateMessage,
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const OUTBOUND_CAPACITY: usize = 64;

pub struct BotClientBuilder {
    config: BotConfig,
    handlers: Handlers,
}

impl BotClientBuilder {
    #[must_use]
    pub fn command(mut self, name: impl Into<String>, handler: impl CommandHandler) -> Self {
        self.handlers.add_command(name, handler);
        self
    }

    #[must_use]
    pub fn button(mut self, custom_id: impl Into<String>, handler: impl ButtonHandler) -> Self {
        self.handlers.add_button(custom_id, handler);
        self
    }

    /// Open both sockets and start the reader tasks
    pub async fn connect(self) -> Result<BotClient, BotError> {
        let bots = open(&self.config, "bots").await?;
        let interactions = open(&self.config, "interactions").await?;

        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let client = BotClient::from_parts(self.config, self.handlers, tx);

        let (sink, stream) = bots.split();
        let writer = tokio::spawn(write_loop(sink, rx));
        let bot_reader = tokio::spawn(read_loop(client.clone(), stream, "bots"));
        let interaction_reader = tokio::spawn(read_loop(client.clone(), interactions, "interactions"));

        client
            .inner
            .tasks
            .lock()
            .extend([writer, bot_reader, interaction_reader]);

        tracing::info!(url = %client.inner.config.gateway_url, "Bot connected");

        Ok(client)
    }
}

async fn open(config: &BotConfig, namespace: &str) -> Result<Socket, BotError> {
    let mut request = config.endpoint(namespace).into_client_request()?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", config.token))
        .map_err(|_| BotError::Config("Bot token is not a valid header value".to_string()))?;
    request.headers_mut().insert(AUTHORIZATION, bearer);

    let (socket, _) = tokio_tungstenite::connect_async(request).await?;
    tracing::debug!(namespace, "Socket open");
    Ok(socket)
}

async fn write_loop<S>(mut sink: S, mut rx: mpsc::Receiver<Frame>)
where
    S: futures_util::Sink<Message> + Unpin,
{
    while let Some(frame) = rx.recv().await {
        let text = match frame.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(event = %frame.event, error = %e, "Failed to encode frame");
                continue;
            }
        };

        if sink.send(Message::Text(text)).await.is_err() {
            break;
        }
    }

    let _ = sink.close().await;
}

async fn read_loop<S>(client: BotClient, mut stream: S, namespace: &'static str)
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match Frame::from_json(&text) {
                Ok(frame) => client.handle_frame(frame),
                Err(e) => tracing::warn!(namespace, error = %e, "Unparseable frame"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(namespace, error = %e, "Socket error");
                break;
            }
        }
    }

    tracing::info!(namespace, "Socket closed");
    client.inner.pending.fail_all();
}

struct Inner {
    config: BotConfig,
    handlers: Handlers,
    pending: PendingAcks,
    outbound: mpsc::Sender<Frame>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Connected bot; cheap to clone
#[derive(Clone)]
pub struct BotClient {
    inner: Arc<Inner>,
}

impl BotClient {
    pub fn builder(config: BotConfig) -> BotClientBuilder {
        BotClientBuilder {
            config,
            handlers: Handlers::new(),
        }
    }

    pub(crate) fn from_parts(
        config: BotConfig,
        handlers: Handlers,
        outbound: mpsc::Sender<Frame>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                handlers,
                pending: PendingAcks::new(),
                outbound,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Declare a slash command; re-declaring an identical one is a no-op
    pub async fn validate_command(
        &self,
        declaration: CommandDeclaration,
    ) -> Result<CommandValidated, BotError> {
        self.request(AckKind::CommandValidated, &declaration).await
    }

    pub async fn send_message(&self, message: SendMessage) -> Result<MessageSent, BotError> {
        self.request(AckKind::MessageSent, &message).await
    }

    pub async fn update_message(&self, update: UpdateMessage) -> Result<MessageUpdated, BotError> {
        self.request(AckKind::MessageUpdate, &update).await
    }

    pub async fn remove_message(&self, id: Snowflake) -> Result<MessageRemoved, BotError> {
        self.request(AckKind::MessageRemoved, &serde_json::json!({ "id": id }))
            .await
    }

    /// Answer an interaction in its channel
    pub async fn reply(
        &self,
        interaction: &Interaction,
        content: impl Into<String>,
    ) -> Result<MessageSent, BotError> {
        let mut message = SendMessage::new(interaction.channel_id, content);
        message.interaction_token = Some(interaction.token.clone());
        self.send_message(message).await
    }

    /// Send a request and wait for its ack.
    ///
    /// The caller is queued before the frame goes out so an ack can never
    /// arrive ahead of its listener.
    async fn request<P, T>(&self, kind: AckKind, payload: &P) -> Result<T, BotError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let data = serde_json::to_value(payload)?;
        let (id, rx) = self.inner.pending.register(kind);

        if self
            .inner
            .outbound
            .send(Frame::new(kind.request_event(), data))
            .await
            .is_err()
        {
            self.inner.pending.cancel(kind, id);
            return Err(BotError::Disconnected);
        }

        let value = self
            .inner
            .pending
            .wait(kind, id, rx, self.inner.config.ack_timeout)
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Route one inbound frame
    pub(crate) fn handle_frame(&self, frame: Frame) {
        match frame.event.as_str() {
            events::INTERACTION_CREATE => self.dispatch_command(frame.data),
            events::BUTTON_CLICKED => self.dispatch_button(frame.data),
            events::ERROR => self.dispatch_error(frame.data),
            other => match AckKind::from_ack_event(other) {
                Some(kind) => {
                    if !self.inner.pending.resolve(kind, frame.data) {
                        tracing::debug!(event = other, "Ack with no waiting request");
                    }
                }
                // Room broadcasts and anything newer than this client
                None => tracing::trace!(event = other, "Ignored event"),
            },
        }
    }

    fn dispatch_command(&self, data: Value) {
        let interaction: Interaction = match serde_json::from_value(data) {
            Ok(interaction) => interaction,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed interaction");
                return;
            }
        };

        let Some(handler) = self.inner.handlers.command(&interaction.command) else {
            tracing::debug!(command = %interaction.command, "No handler for command");
            return;
        };

        let client = self.clone();
        tokio::spawn(async move {
            let command = interaction.command.clone();
            if let Err(e) = handler.handle(client, interaction).await {
                tracing::warn!(command = %command, error = %e, "Command handler failed");
            }
        });
    }

    fn dispatch_button(&self, data: Value) {
        let click: ButtonClick = match serde_json::from_value(data) {
            Ok(click) => click,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed button click");
                return;
            }
        };

        let Some(handler) = self.inner.handlers.button(&click.custom_id) else {
            tracing::debug!(custom_id = %click.custom_id, "No handler for button");
            return;
        };

        let client = self.clone();
        tokio::spawn(async move {
            let custom_id = click.custom_id.clone();
            if let Err(e) = handler.handle(client, click).await {
                tracing::warn!(custom_id = %custom_id, error = %e, "Button handler failed");
            }
        });
    }

    fn dispatch_error(&self, data: Value) {
        let error: ErrorEvent = match serde_json::from_value(data) {
            Ok(error) => error,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed error event");
                return;
            }
        };

        match error.event.as_deref().and_then(AckKind::from_request_event) {
            Some(kind) => {
                self.inner.pending.reject(
                    kind,
                    BotError::Rejected {
                        reason: error.reason,
                        code: error.code,
                    },
                );
            }
            None => tracing::warn!(reason = %error.reason, code = %error.code, "Gateway error"),
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    pub fn pending(&self) -> &PendingAcks {
        &self.inner.pending
    }

    /// Stop the socket tasks and fail anything still waiting
    pub fn close(&self) {
        for task in self.inner.tasks.lock().drain(..) {
            task.abort();
        }
        self.inner.pending.fail_all();
    }
}

impl std::fmt::Debug for BotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotClient")
            .field("gateway_url", &self.inner.config.gateway_url)
            .field("handlers", &self.inner.handlers)
            .field("pending", &self.inner.pending)
            .finish()
    }
}
