//! Port contracts for queue-manager access.

mod client;

pub use client::{
    MessagingClient, MessagingClientError, MessagingClientResult, MessagingSession,
    ReceivedMessage,
};
