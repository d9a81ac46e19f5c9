//! Message value objects exchanged with scripts and the messaging client.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Prefix reserved for provider-defined message fields.
const RESERVED_PROPERTY_PREFIX: &str = "JMS";

/// Checks a header name against the property identifier rules.
fn validate_header_name(name: &str) -> Result<(), ConfigError> {
    let mut characters = name.chars();
    let starts_well = characters
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_' || first == '$');
    let continues_well =
        characters.all(|character| character.is_alphanumeric() || character == '_' || character == '$');
    if !starts_well || !continues_well {
        return Err(ConfigError::InvalidHeaderName(name.to_owned()));
    }

    if name.starts_with(RESERVED_PROPERTY_PREFIX) {
        return Err(ConfigError::ReservedHeaderName(name.to_owned()));
    }

    Ok(())
}

/// A text message ready to be sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    body: String,
    headers: BTreeMap<String, String>,
}

impl OutgoingMessage {
    /// Creates a message with the given body and no headers.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Replaces the message headers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeaderName`] for names that are not
    /// identifiers and [`ConfigError::ReservedHeaderName`] for names starting
    /// with `JMS`.
    pub fn with_headers(
        mut self,
        headers: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        let collected: BTreeMap<String, String> = headers.into_iter().collect();
        for name in collected.keys() {
            validate_header_name(name)?;
        }
        self.headers = collected;
        Ok(self)
    }

    /// Returns the body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the headers attached to the message.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

/// Payload of a received message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "payload")]
pub enum MessageBody {
    /// Text payload.
    Text(String),
    /// Binary payload.
    Bytes(Vec<u8>),
}

impl MessageBody {
    /// Returns the text payload, if this is a text body.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }
}

/// Typed message property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean property.
    Boolean(bool),
    /// Integer property.
    Integer(i64),
    /// String property.
    String(String),
    /// Byte-array property.
    Bytes(Vec<u8>),
}

impl PropertyValue {
    /// Converts the value to its string form.
    ///
    /// Byte arrays have no string form and return `None`.
    #[must_use]
    pub fn to_string_value(&self) -> Option<String> {
        match self {
            Self::Boolean(flag) => Some(flag.to_string()),
            Self::Integer(number) => Some(number.to_string()),
            Self::String(text) => Some(text.clone()),
            Self::Bytes(_) => None,
        }
    }

    /// Returns the property type name used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A received text message as handed back to scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedMessage {
    /// Message properties in string form.
    pub headers: BTreeMap<String, String>,
    /// Body text.
    pub body: String,
}

impl ConsumedMessage {
    /// Creates a consumed message.
    #[must_use]
    pub const fn new(headers: BTreeMap<String, String>, body: String) -> Self {
        Self { headers, body }
    }

    /// Renders the message as the `{headers, body}` object scripts receive.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let headers: Map<String, Value> = self
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        json!({ "headers": headers, "body": self.body })
    }
}
