//! Raw configuration documents as scripts supply them.
//!
//! Documents mirror the JSON field names used by test scripts. They carry
//! no guarantees; conversion into [`ProducerConfig`] or [`ConsumerConfig`]
//! performs all validation.

use super::config::non_blank;
use super::{
    ChannelName, ConfigError, ConnectionConfig, ConsumerConfig, Credentials, MessageLimit,
    ProducerConfig, QueueManagerName, QueueName, ReceiveTimeout, SessionMode, TlsSettings,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Listener port as scripts pass it: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortNumber {
    /// Numeric port, e.g. `1414`.
    Number(i64),
    /// Port given as text, e.g. `"1414"`.
    Text(String),
}

impl PortNumber {
    fn resolve(&self) -> Result<i64, ConfigError> {
        match self {
            Self::Number(port) => Ok(*port),
            Self::Text(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ConfigError::BlankField("portNumber"));
                }
                trimmed
                    .parse()
                    .map_err(|_| ConfigError::NonNumericPort(trimmed.to_owned()))
            }
        }
    }
}

/// Connection fields shared by producer and consumer documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionFields {
    /// Queue-manager name.
    pub qm_name: Option<String>,
    /// Listener host address.
    pub hostname: Option<String>,
    /// Listener port.
    pub port_number: Option<PortNumber>,
    /// SVRCONN channel name.
    pub channel_name: Option<String>,
    /// MQ user identifier.
    #[serde(alias = "username")]
    pub user_name: Option<String>,
    /// MQ password.
    pub password: Option<String>,
    /// Whether the channel uses TLS.
    #[serde(default)]
    pub tls_enabled: bool,
    /// TLS cipher specification.
    pub tls_cipher_spec: Option<String>,
    /// Key repository path.
    pub key_repo_path: Option<String>,
    /// Client certificate label.
    pub cert_label: Option<String>,
    /// Whether the session is transacted; defaults to `true`.
    pub transacted: Option<bool>,
}

impl ConnectionFields {
    fn session_mode(&self) -> SessionMode {
        SessionMode::from_transacted(self.transacted.unwrap_or(true))
    }

    fn into_connection(self) -> Result<ConnectionConfig, ConfigError> {
        let queue_manager =
            QueueManagerName::new(self.qm_name.ok_or(ConfigError::MissingField("qmName"))?)?;
        let hostname = self.hostname.ok_or(ConfigError::MissingField("hostname"))?;
        let port = self
            .port_number
            .ok_or(ConfigError::MissingField("portNumber"))?
            .resolve()?;
        let channel = ChannelName::new(
            self.channel_name
                .ok_or(ConfigError::MissingField("channelName"))?,
        )?;

        let mut connection = ConnectionConfig::new(queue_manager, hostname, port, channel)?;

        let password = self
            .password
            .filter(|secret| !secret.trim().is_empty());
        match (non_blank(self.user_name), password) {
            (Some(user_name), password) => {
                connection = connection.with_credentials(
                    Credentials::new(user_name)?.with_optional_password(password),
                );
            }
            (None, Some(_)) => return Err(ConfigError::PasswordWithoutUser),
            (None, None) => {}
        }

        if self.tls_enabled {
            connection = connection.with_tls(TlsSettings::new(
                self.tls_cipher_spec,
                self.key_repo_path,
                self.cert_label,
            )?);
        }

        Ok(connection)
    }
}

/// Producer configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerConfigDocument {
    /// Connection fields.
    #[serde(flatten)]
    pub connection: ConnectionFields,
}

/// Consumer configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerConfigDocument {
    /// Connection fields.
    #[serde(flatten)]
    pub connection: ConnectionFields,
    /// Queue to consume from.
    pub queue_name: Option<String>,
    /// Per-receive timeout in milliseconds.
    pub timeout: Option<i64>,
    /// Messages received per `consume` call.
    pub msg_limit: Option<i64>,
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, ConfigError> {
    if !value.is_object() {
        return Err(ConfigError::Malformed(
            "configuration must be a JSON object".to_owned(),
        ));
    }
    T::deserialize(value).map_err(|err| ConfigError::Malformed(err.to_string()))
}

impl TryFrom<ProducerConfigDocument> for ProducerConfig {
    type Error = ConfigError;

    fn try_from(document: ProducerConfigDocument) -> Result<Self, Self::Error> {
        let session_mode = document.connection.session_mode();
        let connection = document.connection.into_connection()?;
        Ok(Self::new(connection).with_session_mode(session_mode))
    }
}

impl TryFrom<ConsumerConfigDocument> for ConsumerConfig {
    type Error = ConfigError;

    fn try_from(document: ConsumerConfigDocument) -> Result<Self, Self::Error> {
        let session_mode = document.connection.session_mode();
        let connection = document.connection.into_connection()?;
        let queue = QueueName::new(
            document
                .queue_name
                .ok_or(ConfigError::MissingField("queueName"))?,
        )?;
        let timeout = ReceiveTimeout::from_millis(document.timeout.unwrap_or(0))?;
        let limit = MessageLimit::normalized(document.msg_limit.unwrap_or(1));

        Ok(Self::new(connection, queue)
            .with_timeout(timeout)
            .with_limit(limit)
            .with_session_mode(session_mode))
    }
}

impl ProducerConfig {
    /// Decodes and validates a producer configuration object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] when `value` is not an object or
    /// has mistyped fields, and validation errors otherwise.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        decode::<ProducerConfigDocument>(value)?.try_into()
    }
}

impl ConsumerConfig {
    /// Decodes and validates a consumer configuration object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] when `value` is not an object or
    /// has mistyped fields, and validation errors otherwise.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        decode::<ConsumerConfigDocument>(value)?.try_into()
    }
}
