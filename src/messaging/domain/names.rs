//! Validated MQ object names.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a queue-manager name.
const MAX_QUEUE_MANAGER_NAME_LENGTH: usize = 48;

/// Maximum length of a queue name.
const MAX_QUEUE_NAME_LENGTH: usize = 48;

/// Maximum length of a channel name.
const MAX_CHANNEL_NAME_LENGTH: usize = 20;

/// Trims `value` and checks it against the MQ object naming rules.
fn validate_object_name(
    field: &'static str,
    value: String,
    max: usize,
) -> Result<String, ConfigError> {
    let normalized = value.trim().to_owned();
    if normalized.is_empty() {
        return Err(ConfigError::BlankField(field));
    }

    if normalized.chars().count() > max {
        return Err(ConfigError::NameTooLong {
            field,
            value: normalized,
            max,
        });
    }

    let is_valid = normalized
        .chars()
        .all(|character| character.is_ascii_alphanumeric() || "._/%".contains(character));
    if !is_valid {
        return Err(ConfigError::InvalidName {
            field,
            value: normalized,
        });
    }

    Ok(normalized)
}

macro_rules! object_name {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a validated name.
            ///
            /// The input is trimmed; MQ names are case-sensitive and are not
            /// otherwise normalized.
            ///
            /// # Errors
            ///
            /// Returns [`ConfigError`] when the name is blank, too long, or
            /// contains characters outside `[A-Za-z0-9._/%]`.
            pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
                validate_object_name($field, value.into(), $max).map(Self)
            }

            /// Returns the name as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

object_name!(
    /// Validated queue-manager name.
    QueueManagerName,
    "qmName",
    MAX_QUEUE_MANAGER_NAME_LENGTH
);

object_name!(
    /// Validated queue name used as a send or receive destination.
    QueueName,
    "queueName",
    MAX_QUEUE_NAME_LENGTH
);

object_name!(
    /// Validated SVRCONN channel name.
    ChannelName,
    "channelName",
    MAX_CHANNEL_NAME_LENGTH
);
