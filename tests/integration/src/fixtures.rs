//! Seed data shared by the integration tests

use chat_core::{BotIdentity, Conversation, Snowflake, User};
use chat_db::MemoryStore;

pub const SERVER: i64 = 1;
pub const GENERAL: i64 = 10;
pub const ALICE: i64 = 3;
pub const BOB: i64 = 4;
pub const BOT: i64 = 7;
pub const APP: i64 = 70;
pub const OTHER_BOT: i64 = 8;
pub const OTHER_APP: i64 = 80;

pub const BOT_TOKEN: &str = "bot-token";
pub const OTHER_BOT_TOKEN: &str = "other-bot-token";

pub fn id(n: i64) -> Snowflake {
    Snowflake::new(n)
}

/// One public channel, two users and two bots from different apps
pub fn seed(store: &MemoryStore) {
    store.insert_user(User::new(id(ALICE), "alice".to_string()));
    store.insert_user(User::new(id(BOB), "bob".to_string()));
    store.insert_user(User::new_bot(id(BOT), "dicebot".to_string()));
    store.insert_user(User::new_bot(id(OTHER_BOT), "otherbot".to_string()));

    store.insert_conversation(Conversation::new_channel(
        id(GENERAL),
        id(SERVER),
        "general".to_string(),
        false,
    ));

    store.insert_bot(BOT_TOKEN, BotIdentity::new(id(BOT), id(APP)));
    store.insert_bot(OTHER_BOT_TOKEN, BotIdentity::new(id(OTHER_BOT), id(OTHER_APP)));
}

/// A seeded store
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    seed(&store);
    store
}
