//! ibmmq-bridge: IBM MQ producer and consumer bindings for load-test scripts.
//!
//! The crate turns JSON configuration objects handed over by a scripting
//! host into typed connection descriptors, opens sessions through a
//! messaging client port, and maps script calls (`send`, `consume`,
//! `commit`, `close`) onto that session.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: configuration, message shapes, and the session state machine
//! - **Ports**: the messaging client contract the queue manager sits behind
//! - **Adapters**: an in-process queue manager used by tests and dry runs
//! - **Services**: the producer and consumer adapters scripts talk to
//!
//! # Modules
//!
//! - [`messaging`]: producer/consumer services and their collaborators
//! - [`script`]: the host boundary converting JSON arguments and errors

pub mod messaging;
pub mod script;
