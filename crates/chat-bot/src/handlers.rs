//! Interaction handlers

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::BotClient;
use crate::error::BotError;
use crate::protocol::{ButtonClick, Interaction};

/// Runs when a user invokes one of the bot's slash commands
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    async fn handle(&self, client: BotClient, interaction: Interaction) -> Result<(), BotError>;
}

/// Runs when a user clicks a button on one of the bot's messages
#[async_trait]
pub trait ButtonHandler: Send + Sync + 'static {
    async fn handle(&self, client: BotClient, click: ButtonClick) -> Result<(), BotError>;
}

/// Handlers keyed by command name and by button `custom_id`
#[derive(Clone, Default)]
pub struct Handlers {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
    buttons: HashMap<String, Arc<dyn ButtonHandler>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, name: impl Into<String>, handler: impl CommandHandler) {
        self.commands.insert(name.into(), Arc::new(handler));
    }

    pub fn add_button(&mut self, custom_id: impl Into<String>, handler: impl ButtonHandler) {
        self.buttons.insert(custom_id.into(), Arc::new(handler));
    }

    pub fn command(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.get(name).cloned()
    }

    pub fn button(&self, custom_id: &str) -> Option<Arc<dyn ButtonHandler>> {
        self.buttons.get(custom_id).cloned()
    }

    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .field("buttons", &self.buttons.keys().collect::<Vec<_>>())
            .finish()
    }
}
