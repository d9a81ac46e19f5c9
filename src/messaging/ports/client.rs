//! Messaging client port: connections, sessions, and received messages.

use crate::messaging::domain::{
    ChannelName, ConnectionConfig, MessageBody, OutgoingMessage, QueueManagerName, QueueName,
    SessionMode,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for messaging client operations.
pub type MessagingClientResult<T> = Result<T, MessagingClientError>;

/// Connection factory for a queue manager.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Session type produced by [`MessagingClient::connect`].
    type Session: MessagingSession + 'static;

    /// Opens a connection and a session in the requested mode.
    async fn connect(
        &self,
        connection: &ConnectionConfig,
        mode: SessionMode,
    ) -> MessagingClientResult<Self::Session>;
}

/// An open session against a queue manager.
///
/// Every method takes `&self`; `close` must be callable while a `receive`
/// is blocked and must make that receive return promptly.
#[async_trait]
pub trait MessagingSession: Send + Sync {
    /// Message type returned by [`MessagingSession::receive`].
    type Message: ReceivedMessage;

    /// Opens `queue` for input, failing when it cannot be consumed from.
    async fn open_for_input(&self, queue: &QueueName) -> MessagingClientResult<()>;

    /// Puts a text message on `queue`.
    async fn send(&self, queue: &QueueName, message: &OutgoingMessage)
    -> MessagingClientResult<()>;

    /// Gets the next message from `queue`, waiting at most `timeout`.
    ///
    /// Returns `Ok(None)` when no message arrived in time.
    async fn receive(
        &self,
        queue: &QueueName,
        timeout: Duration,
    ) -> MessagingClientResult<Option<Self::Message>>;

    /// Commits the current unit of work.
    async fn commit(&self) -> MessagingClientResult<()>;

    /// Closes the session, backing out uncommitted work.
    async fn close(&self) -> MessagingClientResult<()>;
}

/// A message delivered by a session.
pub trait ReceivedMessage: Send + Sync {
    /// Returns the provider-assigned message identifier.
    fn message_id(&self) -> String;

    /// Returns the message payload.
    fn body(&self) -> &MessageBody;

    /// Returns when the message was put, if the provider records it.
    fn put_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Enumerates the names of the message properties.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingClientError`] when the provider cannot read the
    /// property table.
    fn property_names(&self) -> MessagingClientResult<Vec<String>>;

    /// Reads a property converted to its string form.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingClientError::PropertyNotFound`] for unknown names
    /// and [`MessagingClientError::PropertyConversion`] for values without a
    /// string form.
    fn string_property(&self, name: &str) -> MessagingClientResult<String>;
}

/// Errors reported by messaging client adapters.
#[derive(Debug, Clone, Error)]
pub enum MessagingClientError {
    /// The queue manager is not accepting connections.
    #[error("queue manager {0} is not running")]
    NotRunning(QueueManagerName),

    /// The connection targeted a different queue manager.
    #[error("queue manager {0} is not available")]
    UnknownQueueManager(QueueManagerName),

    /// The SVRCONN channel is not defined.
    #[error("channel {0} is not defined")]
    UnknownChannel(ChannelName),

    /// Authentication failed.
    #[error("user '{0}' is not authorized")]
    NotAuthorized(String),

    /// TLS settings do not match the channel definition.
    #[error("TLS negotiation failed on channel {channel}: {reason}")]
    TlsMismatch {
        /// Channel name.
        channel: ChannelName,
        /// Reason string.
        reason: String,
    },

    /// The destination queue does not exist.
    #[error("queue {0} is not defined")]
    UnknownQueue(QueueName),

    /// Commit was requested on a session without a unit of work.
    #[error("session is not transacted")]
    NotTransactional,

    /// The session was closed.
    #[error("session is closed")]
    SessionClosed,

    /// A property name is not present on the message.
    #[error("property '{0}' not found")]
    PropertyNotFound(String),

    /// A property value has no string form.
    #[error("property '{name}' of type {type_name} cannot be read as a string")]
    PropertyConversion {
        /// Property name.
        name: String,
        /// Stored value type.
        type_name: String,
    },

    /// Generic transport failure.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl MessagingClientError {
    /// Wraps a transport-level failure from the client adapter.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
