//! Permission bitflags for channel-scoped access control
//!
//! Stored as BIGINT in the database, serialized as a decimal string in JSON.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Capabilities that roles grant and channel overwrites allow or deny.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Permissions: u64 {
        /// See the channel and receive its events
        const VIEW_CHANNEL     = 1 << 0;
        const SEND_MESSAGES    = 1 << 1;
        /// Delete other principals' messages
        const MANAGE_MESSAGES  = 1 << 2;
        /// Edit channel settings and moderate its messages
        const MANAGE_CHANNELS  = 1 << 3;
        const MANAGE_ROLES     = 1 << 4;
        const ATTACH_FILES     = 1 << 9;
        /// Invoke slash commands of installed apps
        const USE_COMMANDS     = 1 << 11;
    }
}

impl Permissions {
    /// Human-readable name of a single capability, used in error reasons.
    pub fn name(self) -> &'static str {
        const NAMES: [(Permissions, &str); 7] = [
            (Permissions::VIEW_CHANNEL, "VIEW_CHANNEL"),
            (Permissions::SEND_MESSAGES, "SEND_MESSAGES"),
            (Permissions::MANAGE_MESSAGES, "MANAGE_MESSAGES"),
            (Permissions::MANAGE_CHANNELS, "MANAGE_CHANNELS"),
            (Permissions::MANAGE_ROLES, "MANAGE_ROLES"),
            (Permissions::ATTACH_FILES, "ATTACH_FILES"),
            (Permissions::USE_COMMANDS, "USE_COMMANDS"),
        ];

        NAMES
            .iter()
            .find(|(flag, _)| *flag == self)
            .map_or("PERMISSIONS", |(_, name)| *name)
    }

    /// Get the raw bits as i64 (for database storage)
    #[inline]
    pub fn to_i64(self) -> i64 {
        self.bits() as i64
    }

    /// Create from raw i64 bits (from database)
    #[inline]
    pub fn from_i64(bits: i64) -> Self {
        Permissions::from_bits_truncate(bits as u64)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Permissions, E> {
                Ok(Permissions::from_bits_truncate(value as u64))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Permissions, E> {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Permissions, E> {
                value
                    .parse::<u64>()
                    .map(Permissions::from_bits_truncate)
                    .map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}
