//! In-memory store implementing every repository trait.
//!
//! Used by tests and by single-node development runs. One store backs all
//! seven traits so seeded data is visible through each of them.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use chat_core::traits::{
    BotRepository, CommandRepository, ConversationRepository, MemberRepository, MessageRepository,
    OverwriteRepository, RepoResult, UserRepository,
};
use chat_core::{BotIdentity, Command, Conversation, DomainError, Message, Overwrite, Snowflake, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Snowflake, User>,
    conversations: HashMap<Snowflake, Conversation>,
    participants: HashSet<(Snowflake, Snowflake)>,
    member_roles: HashMap<(Snowflake, Snowflake), Vec<Snowflake>>,
    overwrites: HashMap<(Snowflake, Snowflake), Overwrite>,
    bots_by_token: HashMap<String, BotIdentity>,
    commands: HashMap<(Snowflake, String), Command>,
    messages: HashMap<Snowflake, Message>,
}

#[derive(Default)]
struct Counters {
    command_creates: AtomicUsize,
    command_updates: AtomicUsize,
    message_updates: AtomicUsize,
    message_deletes: AtomicUsize,
}

/// Shared in-memory tables. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    counters: Arc<Counters>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.tables.write().users.insert(user.id, user);
    }

    pub fn insert_conversation(&self, conversation: Conversation) {
        self.tables
            .write()
            .conversations
            .insert(conversation.id, conversation);
    }

    pub fn add_participant(&self, conversation_id: Snowflake, user_id: Snowflake) {
        self.tables
            .write()
            .participants
            .insert((conversation_id, user_id));
    }

    /// Replace the roles a principal holds in a server
    pub fn set_roles(&self, server_id: Snowflake, principal_id: Snowflake, role_ids: Vec<Snowflake>) {
        self.tables
            .write()
            .member_roles
            .insert((server_id, principal_id), role_ids);
    }

    pub fn insert_overwrite(&self, overwrite: Overwrite) {
        self.tables
            .write()
            .overwrites
            .insert((overwrite.channel_id, overwrite.target_id), overwrite);
    }

    pub fn insert_bot(&self, token: impl Into<String>, identity: BotIdentity) {
        self.tables
            .write()
            .bots_by_token
            .insert(token.into(), identity);
    }

    pub fn insert_command(&self, command: Command) {
        self.tables
            .write()
            .commands
            .insert((command.app_id, command.name.clone()), command);
    }

    pub fn insert_message(&self, message: Message) {
        self.tables.write().messages.insert(message.id, message);
    }

    /// Current stored copy of a message, deleted ones excluded
    pub fn message(&self, id: Snowflake) -> Option<Message> {
        self.tables.read().messages.get(&id).cloned()
    }

    pub fn command(&self, app_id: Snowflake, name: &str) -> Option<Command> {
        self.tables
            .read()
            .commands
            .get(&(app_id, name.to_string()))
            .cloned()
    }

    pub fn command_creates(&self) -> usize {
        self.counters.command_creates.load(Ordering::Relaxed)
    }

    pub fn command_updates(&self) -> usize {
        self.counters.command_updates.load(Ordering::Relaxed)
    }

    pub fn message_updates(&self) -> usize {
        self.counters.message_updates.load(Ordering::Relaxed)
    }

    pub fn message_deletes(&self) -> usize {
        self.counters.message_deletes.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("MemoryStore")
            .field("conversations", &tables.conversations.len())
            .field("commands", &tables.commands.len())
            .field("messages", &tables.messages.len())
            .finish()
    }
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        Ok(self.tables.read().conversations.get(&id).cloned())
    }

    async fn is_participant(&self, conversation_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .tables
            .read()
            .participants
            .contains(&(conversation_id, user_id)))
    }
}

#[async_trait]
impl OverwriteRepository for MemoryStore {
    async fn find_for_targets(
        &self,
        channel_id: Snowflake,
        target_ids: &[Snowflake],
    ) -> RepoResult<Vec<Overwrite>> {
        let tables = self.tables.read();
        Ok(target_ids
            .iter()
            .filter_map(|target| tables.overwrites.get(&(channel_id, *target)).copied())
            .collect())
    }

    async fn upsert(&self, overwrite: &Overwrite) -> RepoResult<()> {
        self.insert_overwrite(*overwrite);
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn role_ids(&self, server_id: Snowflake, principal_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .tables
            .read()
            .member_roles
            .get(&(server_id, principal_id))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }
}

#[async_trait]
impl CommandRepository for MemoryStore {
    async fn find_by_name(&self, app_id: Snowflake, name: &str) -> RepoResult<Option<Command>> {
        Ok(self.command(app_id, name))
    }

    async fn create(&self, command: &Command) -> RepoResult<()> {
        let key = (command.app_id, command.name.clone());
        let mut tables = self.tables.write();
        if tables.commands.contains_key(&key) {
            return Err(DomainError::CommandExists(command.name.clone()));
        }
        tables.commands.insert(key, command.clone());
        self.counters.command_creates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn update(&self, command: &Command) -> RepoResult<()> {
        let mut tables = self.tables.write();
        let stored = tables
            .commands
            .get_mut(&(command.app_id, command.name.clone()))
            .ok_or_else(|| DomainError::CommandNotFound(command.name.clone()))?;
        stored.description.clone_from(&command.description);
        stored.options.clone_from(&command.options);
        self.counters.command_updates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl BotRepository for MemoryStore {
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<BotIdentity>> {
        Ok(self.tables.read().bots_by_token.get(token).copied())
    }

    async fn find_by_app(&self, app_id: Snowflake) -> RepoResult<Option<BotIdentity>> {
        Ok(self
            .tables
            .read()
            .bots_by_token
            .values()
            .find(|identity| identity.app_id == app_id)
            .copied())
    }

    async fn find_by_bot(&self, bot_id: Snowflake) -> RepoResult<Option<BotIdentity>> {
        Ok(self
            .tables
            .read()
            .bots_by_token
            .values()
            .find(|identity| identity.bot_id == bot_id)
            .copied())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.message(id))
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.insert_message(message.clone());
        Ok(())
    }

    async fn update(&self, message: &Message) -> RepoResult<()> {
        let mut tables = self.tables.write();
        let stored = tables
            .messages
            .get_mut(&message.id)
            .ok_or(DomainError::MessageNotFound(message.id))?;
        *stored = message.clone();
        self.counters.message_updates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.tables
            .write()
            .messages
            .remove(&id)
            .ok_or(DomainError::MessageNotFound(id))?;
        self.counters.message_deletes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
