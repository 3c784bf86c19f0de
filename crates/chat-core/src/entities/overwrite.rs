//! Channel permission overwrites and their evaluation
//!
//! An overwrite attaches an allow set and a deny set to one target inside one
//! channel. The target is a role id, the server id (acting as the everyone
//! pseudo-role) or a user id.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Permissions, Snowflake};

/// Channel-scoped allow/deny exception for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overwrite {
    pub channel_id: Snowflake,
    pub target_id: Snowflake,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl Overwrite {
    pub fn new(channel_id: Snowflake, target_id: Snowflake) -> Self {
        Self {
            channel_id,
            target_id,
            allow: Permissions::empty(),
            deny: Permissions::empty(),
        }
    }

    #[must_use]
    pub fn allow(mut self, permissions: Permissions) -> Self {
        self.allow |= permissions;
        self
    }

    #[must_use]
    pub fn deny(mut self, permissions: Permissions) -> Self {
        self.deny |= permissions;
        self
    }
}

/// Default capability of a channel before overwrites are applied.
///
/// `VIEW_CHANNEL` and `MANAGE_CHANNELS` both default to the channel being
/// public. Every other capability defaults to `false`.
pub fn base_capability(capability: Permissions, is_private: bool) -> bool {
    if capability == Permissions::VIEW_CHANNEL || capability == Permissions::MANAGE_CHANNELS {
        !is_private
    } else {
        false
    }
}

/// Apply overwrites on top of a base value in two passes.
///
/// Pass one applies every deny that contains the capability, pass two every
/// allow. An allow on any matching row therefore beats a deny on any other
/// row, regardless of which target is more specific.
///
/// The caller is responsible for passing only overwrites whose target is in
/// the principal's target set.
pub fn evaluate_overwrites(capability: Permissions, base: bool, overwrites: &[Overwrite]) -> bool {
    let mut effective = base;

    for overwrite in overwrites {
        if overwrite.deny.contains(capability) {
            effective = false;
        }
    }

    for overwrite in overwrites {
        if overwrite.allow.contains(capability) {
            effective = true;
        }
    }

    effective
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANNEL: Snowflake = Snowflake::new(100);
    const SERVER: Snowflake = Snowflake::new(1);
    const ROLE: Snowflake = Snowflake::new(2);
    const USER: Snowflake = Snowflake::new(3);

    #[test]
    fn test_base_public_and_private() {
        assert!(base_capability(Permissions::VIEW_CHANNEL, false));
        assert!(!base_capability(Permissions::VIEW_CHANNEL, true));
        assert!(base_capability(Permissions::MANAGE_CHANNELS, false));
        assert!(!base_capability(Permissions::MANAGE_CHANNELS, true));
    }

    #[test]
    fn test_base_other_capabilities_false() {
        assert!(!base_capability(Permissions::SEND_MESSAGES, false));
        assert!(!base_capability(Permissions::MANAGE_ROLES, false));
    }

    #[test]
    fn test_no_overwrites_keeps_base() {
        assert!(evaluate_overwrites(Permissions::VIEW_CHANNEL, true, &[]));
        assert!(!evaluate_overwrites(Permissions::VIEW_CHANNEL, false, &[]));
    }

    #[test]
    fn test_everyone_deny_hides_public_channel() {
        let overwrites = [Overwrite::new(CHANNEL, SERVER).deny(Permissions::VIEW_CHANNEL)];
        assert!(!evaluate_overwrites(Permissions::VIEW_CHANNEL, true, &overwrites));
    }

    #[test]
    fn test_allow_after_deny_across_rows() {
        let overwrites = [
            Overwrite::new(CHANNEL, SERVER).deny(Permissions::VIEW_CHANNEL),
            Overwrite::new(CHANNEL, ROLE).allow(Permissions::VIEW_CHANNEL),
        ];
        assert!(evaluate_overwrites(Permissions::VIEW_CHANNEL, false, &overwrites));
    }

    #[test]
    fn test_role_allow_beats_user_deny() {
        // No most-specific-target rule: the role allow still wins.
        let overwrites = [
            Overwrite::new(CHANNEL, USER).deny(Permissions::VIEW_CHANNEL),
            Overwrite::new(CHANNEL, ROLE).allow(Permissions::VIEW_CHANNEL),
        ];
        assert!(evaluate_overwrites(Permissions::VIEW_CHANNEL, true, &overwrites));
    }

    #[test]
    fn test_order_of_rows_does_not_matter() {
        let overwrites = [
            Overwrite::new(CHANNEL, ROLE).allow(Permissions::VIEW_CHANNEL),
            Overwrite::new(CHANNEL, SERVER).deny(Permissions::VIEW_CHANNEL),
        ];
        assert!(evaluate_overwrites(Permissions::VIEW_CHANNEL, false, &overwrites));
    }

    #[test]
    fn test_unrelated_bits_are_ignored() {
        let overwrites = [Overwrite::new(CHANNEL, SERVER)
            .deny(Permissions::SEND_MESSAGES)
            .allow(Permissions::MANAGE_ROLES)];
        assert!(evaluate_overwrites(Permissions::VIEW_CHANNEL, true, &overwrites));
        assert!(!evaluate_overwrites(Permissions::VIEW_CHANNEL, false, &overwrites));
    }

    #[test]
    fn test_same_row_allow_and_deny() {
        let overwrites = [Overwrite::new(CHANNEL, USER)
            .deny(Permissions::MANAGE_CHANNELS)
            .allow(Permissions::MANAGE_CHANNELS)];
        assert!(evaluate_overwrites(Permissions::MANAGE_CHANNELS, false, &overwrites));
    }
}
