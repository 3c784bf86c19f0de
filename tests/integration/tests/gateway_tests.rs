//! Gateway integration tests
//!
//! Every test runs against gateways on ephemeral ports backed by an
//! in-memory store and bus; no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chat_bot::{
    BotClient, BotError, CommandDeclaration, CommandHandler, Interaction, SendMessage, UpdateMessage,
};
use chat_cache::{EventBus, MemoryBus};
use integration_tests::{
    assert_json, assert_status, id, seeded_store, TestServer, ALICE, APP, BOB, BOT_TOKEN, GENERAL,
    OTHER_BOT_TOKEN,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_ready_once_bus_is_live() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["ready"], true);
    assert_eq!(body["bus"], "live");
    assert_eq!(body["instance_id"], "gateway-1");
    assert_eq!(body["dropped_events"], 0);
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_invalid_user_token_closes_socket() {
    let server = TestServer::start().await.unwrap();
    let url = format!("{}?token=not-a-jwt", server.ws_url("messages"));
    let mut socket = integration_tests::WsClient::connect(&url).await.unwrap();

    assert!(socket.closed_without_payload().await);
}

#[tokio::test]
async fn test_unknown_bot_token_closes_socket() {
    let server = TestServer::start().await.unwrap();
    let mut socket = server.connect_bot("bots", "nobody").await.unwrap();

    assert!(socket.closed_without_payload().await);
    assert_eq!(server.state().connections().connection_count(), 0);
}

// ============================================================================
// Rooms and messages
// ============================================================================

#[tokio::test]
async fn test_message_lifecycle_reaches_every_member() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect_user(ALICE).await.unwrap();
    let mut bob = server.connect_user(BOB).await.unwrap();
    alice.join(GENERAL).await.unwrap();
    bob.join(GENERAL).await.unwrap();

    alice
        .send("sendMessage", json!({"conversation_id": GENERAL.to_string(), "content": "hello"}))
        .await
        .unwrap();

    let seen_by_alice = alice.recv_event("newMessage").await.unwrap();
    let seen_by_bob = bob.recv_event("newMessage").await.unwrap();
    assert_eq!(seen_by_alice["id"], seen_by_bob["id"]);
    assert_eq!(seen_by_bob["message"], "hello");
    assert_eq!(seen_by_bob["user"]["username"], "alice");
    let message_id = seen_by_bob["id"].clone();

    alice
        .send("editMessage", json!({"id": message_id, "content": "hello again"}))
        .await
        .unwrap();
    let edited = bob.recv_event("messageEdited").await.unwrap();
    assert_eq!(edited["message"], "hello again");

    alice.send("deleteMessage", json!({"id": message_id})).await.unwrap();
    let deleted = bob.recv_event("messageDeleted").await.unwrap();
    assert_eq!(deleted["id"], message_id);
    assert_eq!(deleted["conversation"], GENERAL.to_string());
}

#[tokio::test]
async fn test_left_member_stops_receiving() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect_user(ALICE).await.unwrap();
    let mut bob = server.connect_user(BOB).await.unwrap();
    alice.join(GENERAL).await.unwrap();
    bob.join(GENERAL).await.unwrap();

    bob.send("leaveConversation", json!({"conversation_id": GENERAL.to_string()}))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    alice
        .send("sendMessage", json!({"conversation_id": GENERAL.to_string(), "content": "anyone?"}))
        .await
        .unwrap();
    alice.recv_event("newMessage").await.unwrap();

    assert!(bob.is_quiet(Duration::from_millis(200)).await);
}

#[tokio::test]
async fn test_editing_someone_elses_message_is_an_error_event() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect_user(ALICE).await.unwrap();
    let mut bob = server.connect_user(BOB).await.unwrap();
    alice.join(GENERAL).await.unwrap();

    alice
        .send("sendMessage", json!({"conversation_id": GENERAL.to_string(), "content": "mine"}))
        .await
        .unwrap();
    let message = alice.recv_event("newMessage").await.unwrap();

    bob.send("editMessage", json!({"id": message["id"], "content": "hijacked"}))
        .await
        .unwrap();
    let error = bob.recv_event("error").await.unwrap();
    assert_eq!(error["event"], "editMessage");

    let id_value: i64 = message["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(server.store.message(id(id_value)).unwrap().content, "mine");
}

#[tokio::test]
async fn test_unknown_event_is_reported() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect_user(ALICE).await.unwrap();

    alice.send("dance", json!({})).await.unwrap();
    let error = alice.recv_event("error").await.unwrap();
    assert_eq!(error["event"], "dance");
}

#[tokio::test]
async fn test_fanout_crosses_instances() {
    let store = seeded_store();
    let bus: Arc<dyn EventBus> = Arc::new(MemoryBus::new());
    let first = TestServer::start_with(store.clone(), bus.clone(), "gateway-a").await.unwrap();
    let second = TestServer::start_with(store, bus, "gateway-b").await.unwrap();

    let mut alice = first.connect_user(ALICE).await.unwrap();
    let mut bob = second.connect_user(BOB).await.unwrap();
    alice.join(GENERAL).await.unwrap();
    bob.join(GENERAL).await.unwrap();

    alice
        .send("sendMessage", json!({"conversation_id": GENERAL.to_string(), "content": "across"}))
        .await
        .unwrap();

    let received = bob.recv_event("newMessage").await.unwrap();
    assert_eq!(received["message"], "across");
}

// ============================================================================
// Bots
// ============================================================================

#[tokio::test]
async fn test_bot_message_is_acked_and_broadcast() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect_user(ALICE).await.unwrap();
    alice.join(GENERAL).await.unwrap();

    let bot = BotClient::builder(server.bot_config(BOT_TOKEN)).connect().await.unwrap();
    let sent = bot
        .send_message(SendMessage::new(id(GENERAL), "beep"))
        .await
        .unwrap();

    let broadcast = alice.recv_event("newMessage").await.unwrap();
    assert_eq!(broadcast["id"], sent.id.to_string());
    assert_eq!(broadcast["user"]["bot"], true);
    assert_eq!(sent.channel_id, id(GENERAL));

    bot.close();
}

#[tokio::test]
async fn test_foreign_bot_cannot_touch_message() {
    let server = TestServer::start().await.unwrap();
    let owner = BotClient::builder(server.bot_config(BOT_TOKEN)).connect().await.unwrap();
    let intruder = BotClient::builder(server.bot_config(OTHER_BOT_TOKEN)).connect().await.unwrap();

    let sent = owner.send_message(SendMessage::new(id(GENERAL), "original")).await.unwrap();

    let err = intruder
        .update_message(UpdateMessage::new(sent.id).content("defaced"))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), Some("Invalid Sender"));

    let err = intruder.remove_message(sent.id).await.unwrap_err();
    assert_eq!(err.reason(), Some("Invalid Sender"));

    assert_eq!(server.store.message(sent.id).unwrap().content, "original");
    assert_eq!(server.store.message_updates(), 0);
    assert_eq!(server.store.message_deletes(), 0);

    let updated = owner
        .update_message(UpdateMessage::new(sent.id).content("revised"))
        .await
        .unwrap();
    assert!(updated.edited_at.is_some());
}

#[tokio::test]
async fn test_command_redeclaration_is_idempotent() {
    let server = TestServer::start().await.unwrap();
    let bot = BotClient::builder(server.bot_config(BOT_TOKEN)).connect().await.unwrap();

    let first = bot
        .validate_command(CommandDeclaration::new("roll").description("Roll a die"))
        .await
        .unwrap();
    let second = bot
        .validate_command(CommandDeclaration::new("roll").description("Roll a die"))
        .await
        .unwrap();
    assert_eq!(first.command, "roll");
    assert_eq!(first.id, second.id);
    assert_eq!(server.store.command_creates(), 1);
    assert_eq!(server.store.command_updates(), 0);

    let changed = bot
        .validate_command(CommandDeclaration::new("roll").description("Roll dice"))
        .await
        .unwrap();
    assert_eq!(changed.id, first.id);
    assert_eq!(changed.description, "Roll dice");
    assert_eq!(server.store.command_updates(), 1);
}

#[tokio::test]
async fn test_invalid_command_name_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let bot = BotClient::builder(server.bot_config(BOT_TOKEN)).connect().await.unwrap();

    let err = bot
        .validate_command(CommandDeclaration::new("Not Valid"))
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::Rejected { .. }));
    assert_eq!(server.store.command_creates(), 0);
}

struct Roll;

#[async_trait]
impl CommandHandler for Roll {
    async fn handle(&self, client: BotClient, interaction: Interaction) -> Result<(), BotError> {
        let sides = interaction.args["sides"].as_i64().unwrap_or(6);
        client.reply(&interaction, format!("rolled a d{sides}")).await?;
        Ok(())
    }
}

#[tokio::test]
async fn test_slash_command_round_trip() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect_user(ALICE).await.unwrap();
    alice.join(GENERAL).await.unwrap();

    let bot = BotClient::builder(server.bot_config(BOT_TOKEN))
        .command("roll", Roll)
        .connect()
        .await
        .unwrap();
    bot.validate_command(CommandDeclaration::new("roll")).await.unwrap();
    server.wait_for_app(APP).await.unwrap();

    let token = server.user_token(ALICE).unwrap();
    let response = server
        .post_auth(
            "/api/v1/interactions",
            &token,
            &json!({
                "app_id": APP.to_string(),
                "command": "roll",
                "channel_id": GENERAL.to_string(),
                "args": {"sides": 20}
            }),
        )
        .await
        .unwrap();
    let accepted: Value = assert_json(response, StatusCode::ACCEPTED).await.unwrap();
    assert!(accepted["token"].as_str().is_some_and(|t| !t.is_empty()));

    let reply = alice.recv_event("newMessage").await.unwrap();
    assert_eq!(reply["message"], "rolled a d20");
}

#[tokio::test]
async fn test_interaction_requires_auth() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .post(
            "/api/v1/interactions",
            &json!({"app_id": APP.to_string(), "command": "roll", "channel_id": GENERAL.to_string()}),
        )
        .await
        .unwrap();

    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_unknown_command_is_not_found() {
    let server = TestServer::start().await.unwrap();
    let token = server.user_token(ALICE).unwrap();

    let response = server
        .post_auth(
            "/api/v1/interactions",
            &token,
            &json!({"app_id": APP.to_string(), "command": "nope", "channel_id": GENERAL.to_string()}),
        )
        .await
        .unwrap();

    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}
