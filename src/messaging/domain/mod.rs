//! Domain model for queue-manager connections, messages, and sessions.
//!
//! Everything in this module is free of client-library concerns: values
//! are validated once at construction and stay immutable afterwards.

mod config;
mod document;
mod error;
mod message;
mod names;
mod session;

pub use config::{
    ConnectionConfig, ConsumerConfig, Credentials, MessageLimit, ProducerConfig, ReceiveTimeout,
    SessionMode, TlsSettings,
};
pub use document::{
    ConnectionFields, ConsumerConfigDocument, PortNumber, ProducerConfigDocument,
};
pub use error::{ConfigError, SessionStateError};
pub use message::{ConsumedMessage, MessageBody, OutgoingMessage, PropertyValue};
pub use names::{ChannelName, QueueManagerName, QueueName};
pub use session::{OperationGuard, SessionLifecycle, SessionState};
