//! IBM MQ producer and consumer bindings.
//!
//! Scripts create a producer or consumer from a configuration object, then
//! drive one transactional session through it. Queue-manager connectivity
//! is delegated to a [`ports::MessagingClient`]. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Producer and consumer services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
