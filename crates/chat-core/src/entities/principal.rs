//! Principal - a user or bot identity subject to authorization

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Bot,
}

/// Identity checked against a channel, carrying the role ids it holds in the
/// server that owns that channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Snowflake,
    pub kind: PrincipalKind,
    pub role_ids: Vec<Snowflake>,
}

impl Principal {
    pub fn user(id: Snowflake) -> Self {
        Self {
            id,
            kind: PrincipalKind::User,
            role_ids: Vec::new(),
        }
    }

    pub fn bot(id: Snowflake) -> Self {
        Self {
            id,
            kind: PrincipalKind::Bot,
            role_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_roles(mut self, role_ids: Vec<Snowflake>) -> Self {
        self.role_ids = role_ids;
        self
    }

    /// Overwrite targets relevant to this principal: the server id (everyone),
    /// each held role and the principal itself.
    pub fn overwrite_targets(&self, server_id: Option<Snowflake>) -> Vec<Snowflake> {
        let mut targets = Vec::with_capacity(self.role_ids.len() + 2);
        targets.extend(server_id);
        targets.extend(self.role_ids.iter().copied());
        targets.push(self.id);
        targets
    }
}
