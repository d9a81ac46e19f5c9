//! Adapter implementations for the messaging client port.

pub mod memory;

pub use memory::{InMemoryQueueManager, InMemorySession, StoredMessage};
