//! Host boundary: the `k6/x/ibmmq` module as seen by test scripts.
//!
//! Scripts construct `Producer` and `Consumer` objects from JSON
//! configuration and call their bound methods with JSON arguments. Argument
//! validation happens here, before the messaging client is contacted, and
//! every failure is reported as a [`ScriptError`] carrying the error kind
//! name scripts see.

mod args;
mod consumer;
mod error;
mod producer;

pub use consumer::{CONSUMER_METHODS, ScriptConsumer};
pub use error::{ScriptError, ScriptResult};
pub use producer::{PRODUCER_METHODS, ScriptProducer};

use crate::messaging::ports::{MessagingClient, MessagingSession};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Import path scripts use to load the module.
pub const IMPORT_PATH: &str = "k6/x/ibmmq";

/// Constructor names exported to scripts.
pub const EXPORTS: &[&str] = &["Producer", "Consumer"];

/// The registered script module, bound to one messaging client.
#[derive(Debug)]
pub struct ScriptModule<C> {
    client: Arc<C>,
}

impl<C> Clone for ScriptModule<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C> ScriptModule<C>
where
    C: MessagingClient,
{
    /// Creates the module over `client`.
    #[must_use]
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// `new Producer(config)`.
    ///
    /// # Errors
    ///
    /// See [`ScriptProducer::create`].
    pub async fn new_producer(&self, args: &[Value]) -> ScriptResult<ScriptProducer<C::Session>> {
        ScriptProducer::create(self.client.as_ref(), args).await
    }

    /// `new Consumer(config)`.
    ///
    /// # Errors
    ///
    /// See [`ScriptConsumer::create`].
    pub async fn new_consumer(&self, args: &[Value]) -> ScriptResult<ScriptConsumer<C::Session>> {
        ScriptConsumer::create(self.client.as_ref(), args).await
    }

    /// Constructs the export named `export`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnknownExport`] for names outside
    /// [`EXPORTS`] and the constructor's errors otherwise.
    pub async fn construct(
        &self,
        export: &str,
        args: &[Value],
    ) -> ScriptResult<ScriptObject<C::Session>> {
        debug!(export, args = args.len(), "constructing script object");
        match export {
            "Producer" => self.new_producer(args).await.map(ScriptObject::Producer),
            "Consumer" => self.new_consumer(args).await.map(ScriptObject::Consumer),
            other => Err(ScriptError::UnknownExport(other.to_owned())),
        }
    }
}

/// An object returned by one of the exported constructors.
#[derive(Debug)]
pub enum ScriptObject<S>
where
    S: MessagingSession,
{
    /// A `Producer`.
    Producer(ScriptProducer<S>),
    /// A `Consumer`.
    Consumer(ScriptConsumer<S>),
}

impl<S> ScriptObject<S>
where
    S: MessagingSession,
{
    /// Returns the export name the object was constructed from.
    #[must_use]
    pub const fn export_name(&self) -> &'static str {
        match self {
            Self::Producer(_) => "Producer",
            Self::Consumer(_) => "Consumer",
        }
    }

    /// Returns the names of the bound methods.
    #[must_use]
    pub const fn methods(&self) -> &'static [&'static str] {
        match self {
            Self::Producer(_) => PRODUCER_METHODS,
            Self::Consumer(_) => CONSUMER_METHODS,
        }
    }

    /// Calls a bound method.
    ///
    /// # Errors
    ///
    /// Returns the method's [`ScriptError`].
    pub async fn call(&self, method: &str, args: &[Value]) -> ScriptResult<Value> {
        match self {
            Self::Producer(producer) => producer.call(method, args).await,
            Self::Consumer(consumer) => consumer.call(method, args).await,
        }
    }
}
