//! Service-level errors for producer and consumer operations.

use crate::messaging::{
    domain::{ConfigError, QueueManagerName, QueueName, SessionStateError},
    ports::MessagingClientError,
};
use std::fmt;
use thiserror::Error;

/// Broad failure category, as reported to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing configuration or arguments.
    Config,
    /// The session could not be established.
    Connect,
    /// A send failed.
    Send,
    /// A receive failed or returned an unusable message.
    Receive,
    /// A commit failed.
    Commit,
    /// Message metadata could not be read.
    Property,
    /// The session state does not allow the operation.
    Session,
    /// Releasing the session failed.
    Close,
}

impl ErrorKind {
    /// Returns the error name surfaced to scripts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "ConfigError",
            Self::Connect => "ConnectError",
            Self::Send => "SendError",
            Self::Receive => "ReceiveError",
            Self::Commit => "CommitError",
            Self::Property => "PropertyError",
            Self::Session => "SessionError",
            Self::Close => "CloseError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors returned by [`super::Producer`] and [`super::Consumer`].
#[derive(Debug, Error)]
pub enum MessagingError {
    /// Configuration or argument validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The messaging client could not open a session.
    #[error("failed to connect to queue manager {queue_manager}: {source}")]
    Connect {
        /// Target queue manager.
        queue_manager: QueueManagerName,
        /// Client failure.
        source: MessagingClientError,
    },

    /// The client rejected the destination or the transfer.
    #[error("failed to send to queue {queue}: {source}")]
    Send {
        /// Destination queue.
        queue: QueueName,
        /// Client failure.
        source: MessagingClientError,
    },

    /// A receive call failed.
    #[error("failed to receive from queue {queue}: {source}")]
    Receive {
        /// Source queue.
        queue: QueueName,
        /// Client failure.
        source: MessagingClientError,
    },

    /// A message without a text body was received.
    #[error("received non-text message")]
    NonTextMessage {
        /// Source queue.
        queue: QueueName,
        /// Provider message identifier.
        message_id: String,
    },

    /// No message arrived within the receive timeout.
    #[error("no message available on queue {queue} within {timeout_ms} ms")]
    NoMessageAvailable {
        /// Source queue.
        queue: QueueName,
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u128,
    },

    /// The commit failed.
    #[error("failed to commit session: {0}")]
    Commit(#[source] MessagingClientError),

    /// Message properties could not be read.
    #[error("failed to read properties of message {message_id}: {source}")]
    Property {
        /// Provider message identifier.
        message_id: String,
        /// Client failure.
        source: MessagingClientError,
    },

    /// The session state does not allow the operation.
    #[error(transparent)]
    Session(#[from] SessionStateError),

    /// The client failed to release the session.
    #[error("failed to close session: {0}")]
    Close(#[source] MessagingClientError),
}

impl MessagingError {
    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Connect { .. } => ErrorKind::Connect,
            Self::Send { .. } => ErrorKind::Send,
            Self::Receive { .. } | Self::NonTextMessage { .. } | Self::NoMessageAvailable { .. } => {
                ErrorKind::Receive
            }
            Self::Commit(_) => ErrorKind::Commit,
            Self::Property { .. } => ErrorKind::Property,
            Self::Session(_) => ErrorKind::Session,
            Self::Close(_) => ErrorKind::Close,
        }
    }
}

/// Result type for producer and consumer operations.
pub type MessagingResult<T> = Result<T, MessagingError>;
