//! Bot client configuration

use std::env;
use std::time::Duration;

use crate::error::BotError;

/// How long a request waits for its ack
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Base gateway URL, e.g. `ws://127.0.0.1:8080`
    pub gateway_url: String,
    /// Bot token sent as `Authorization: Bearer`
    pub token: String,
    pub ack_timeout: Duration,
}

impl BotConfig {
    pub fn new(gateway_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            token: token.into(),
            ack_timeout: DEFAULT_ACK_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Load from `BOT_GATEWAY_URL`, `BOT_TOKEN` and optional `BOT_ACK_TIMEOUT_MS`
    pub fn from_env() -> Result<Self, BotError> {
        let _ = dotenvy::dotenv();

        let gateway_url = env::var("BOT_GATEWAY_URL")
            .map_err(|_| BotError::Config("BOT_GATEWAY_URL is required".to_string()))?;
        let token =
            env::var("BOT_TOKEN").map_err(|_| BotError::Config("BOT_TOKEN is required".to_string()))?;

        let ack_timeout = match env::var("BOT_ACK_TIMEOUT_MS") {
            Ok(raw) => Duration::from_millis(
                raw.parse()
                    .map_err(|_| BotError::Config(format!("Invalid BOT_ACK_TIMEOUT_MS: {raw}")))?,
            ),
            Err(_) => DEFAULT_ACK_TIMEOUT,
        };

        Ok(Self {
            gateway_url,
            token,
            ack_timeout,
        })
    }

    /// URL of one gateway namespace
    pub fn endpoint(&self, namespace: &str) -> String {
        format!("{}/ws/{namespace}", self.gateway_url.trim_end_matches('/'))
    }
}
