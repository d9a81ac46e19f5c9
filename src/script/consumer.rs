//! Script-facing `Consumer` object.

use super::{ScriptError, ScriptResult, args};
use crate::messaging::{
    domain::{ConsumedMessage, ConsumerConfig},
    ports::{MessagingClient, MessagingSession},
    services::Consumer,
};
use serde_json::Value;

/// Methods bound on a script `Consumer`.
pub const CONSUMER_METHODS: &[&str] = &["consume", "commit", "close"];

/// A consumer as seen by scripts.
#[derive(Debug)]
pub struct ScriptConsumer<S>
where
    S: MessagingSession,
{
    consumer: Consumer<S>,
}

impl<S> ScriptConsumer<S>
where
    S: MessagingSession,
{
    /// Builds a consumer from constructor arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] when the arguments are malformed, before the
    /// client is contacted, or when the session or queue cannot be opened.
    pub async fn create<C>(client: &C, args: &[Value]) -> ScriptResult<Self>
    where
        C: MessagingClient<Session = S>,
    {
        let document = args::config_object("Consumer", args)?;
        let config = ConsumerConfig::from_json(document)?;
        let consumer = Consumer::create(client, config).await?;
        Ok(Self { consumer })
    }

    /// Returns the wrapped consumer.
    #[must_use]
    pub const fn consumer(&self) -> &Consumer<S> {
        &self.consumer
    }

    /// Dispatches a method call.
    ///
    /// `consume` returns an array of `{headers, body}` objects; `commit`
    /// and `close` return `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnknownMethod`] for unbound names, argument
    /// errors for malformed calls, and wrapped messaging failures.
    pub async fn call(&self, method: &str, args: &[Value]) -> ScriptResult<Value> {
        match method {
            "consume" => {
                args::expect_count("consume", args, 0..=0)?;
                let messages = self.consumer.consume().await?;
                Ok(Value::Array(
                    messages.iter().map(ConsumedMessage::to_json).collect(),
                ))
            }
            "commit" => {
                args::expect_count("commit", args, 0..=0)?;
                self.consumer.commit().await?;
                Ok(Value::Null)
            }
            "close" => {
                args::expect_count("close", args, 0..=0)?;
                self.consumer.close().await?;
                Ok(Value::Null)
            }
            other => Err(ScriptError::UnknownMethod {
                object: "Consumer",
                method: other.to_owned(),
            }),
        }
    }
}
