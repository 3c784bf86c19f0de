//! Permission service
//!
//! Resolves channel capabilities from the public/private default and the
//! channel's overwrites. Stateless: nothing is cached, every call reads the
//! current overwrites.

use chat_core::{
    base_capability, evaluate_overwrites, Conversation, Permissions, Principal, PrincipalKind,
    Snowflake,
};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Permission service for access control
pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    /// Create a new PermissionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Decide whether `principal` holds `capability` on `conversation`.
    ///
    /// Base value from `is_private`, then every matching deny, then every
    /// matching allow. An allow on any matching target wins.
    #[instrument(skip(self, conversation, principal), fields(channel_id = %conversation.id, principal_id = %principal.id))]
    pub async fn resolve(
        &self,
        capability: Permissions,
        conversation: &Conversation,
        principal: &Principal,
    ) -> ServiceResult<bool> {
        let base = base_capability(capability, conversation.is_private);
        let targets = principal.overwrite_targets(conversation.server_id);
        let overwrites = self
            .ctx
            .overwrite_repo()
            .find_for_targets(conversation.id, &targets)
            .await?;

        let granted = evaluate_overwrites(capability, base, &overwrites);
        debug!(
            capability = capability.name(),
            base,
            overwrites = overwrites.len(),
            granted,
            "Capability resolved"
        );

        Ok(granted)
    }

    /// Build a principal carrying the roles it holds in `server_id`
    #[instrument(skip(self))]
    pub async fn principal_for(
        &self,
        id: Snowflake,
        server_id: Option<Snowflake>,
        kind: PrincipalKind,
    ) -> ServiceResult<Principal> {
        let role_ids = match server_id {
            Some(server_id) => self.ctx.member_repo().role_ids(server_id, id).await?,
            None => Vec::new(),
        };

        let principal = match kind {
            PrincipalKind::User => Principal::user(id),
            PrincipalKind::Bot => Principal::bot(id),
        };
        Ok(principal.with_roles(role_ids))
    }

    /// Server channels resolve `VIEW_CHANNEL`; direct and group conversations
    /// are visible to their participants only.
    pub async fn can_view(&self, conversation: &Conversation, principal: &Principal) -> ServiceResult<bool> {
        if conversation.is_server_channel() {
            self.resolve(Permissions::VIEW_CHANNEL, conversation, principal).await
        } else {
            Ok(self
                .ctx
                .conversation_repo()
                .is_participant(conversation.id, principal.id)
                .await?)
        }
    }

    /// `MANAGE_CHANNELS` on a server channel; never granted elsewhere
    pub async fn can_manage(&self, conversation: &Conversation, principal: &Principal) -> ServiceResult<bool> {
        if conversation.is_server_channel() {
            self.resolve(Permissions::MANAGE_CHANNELS, conversation, principal).await
        } else {
            Ok(false)
        }
    }

    /// Load a conversation the principal can see.
    ///
    /// Missing conversations are `NotFound`; invisible ones are
    /// `PermissionDenied` on `VIEW_CHANNEL`.
    pub async fn visible_conversation(
        &self,
        conversation_id: Snowflake,
        principal_id: Snowflake,
        kind: PrincipalKind,
    ) -> ServiceResult<(Conversation, Principal)> {
        let conversation = self
            .ctx
            .conversation_repo()
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", conversation_id))?;

        let principal = self
            .principal_for(principal_id, conversation.server_id, kind)
            .await?;

        if !self.can_view(&conversation, &principal).await? {
            return Err(ServiceError::permission_denied(
                Permissions::VIEW_CHANNEL.name(),
            ));
        }

        Ok((conversation, principal))
    }
}
