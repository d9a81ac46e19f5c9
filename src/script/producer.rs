//! Script-facing `Producer` object.

use super::{ScriptError, ScriptResult, args};
use crate::messaging::{
    domain::{OutgoingMessage, ProducerConfig},
    ports::{MessagingClient, MessagingSession},
    services::Producer,
};
use serde_json::Value;

/// Methods bound on a script `Producer`.
pub const PRODUCER_METHODS: &[&str] = &["send", "commit", "close"];

/// A producer as seen by scripts.
#[derive(Debug)]
pub struct ScriptProducer<S>
where
    S: MessagingSession,
{
    producer: Producer<S>,
}

impl<S> ScriptProducer<S>
where
    S: MessagingSession,
{
    /// Builds a producer from constructor arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] when the arguments are malformed, before the
    /// client is contacted, or when the connection fails.
    pub async fn create<C>(client: &C, args: &[Value]) -> ScriptResult<Self>
    where
        C: MessagingClient<Session = S>,
    {
        let document = args::config_object("Producer", args)?;
        let config = ProducerConfig::from_json(document)?;
        let producer = Producer::create(client, config).await?;
        Ok(Self { producer })
    }

    /// Returns the wrapped producer.
    #[must_use]
    pub const fn producer(&self) -> &Producer<S> {
        &self.producer
    }

    /// Dispatches a method call. Every method returns `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnknownMethod`] for unbound names, argument
    /// errors for malformed calls, and wrapped messaging failures.
    pub async fn call(&self, method: &str, args: &[Value]) -> ScriptResult<Value> {
        match method {
            "send" => self.send(args).await?,
            "commit" => {
                args::expect_count("commit", args, 0..=0)?;
                self.producer.commit().await?;
            }
            "close" => {
                args::expect_count("close", args, 0..=0)?;
                self.producer.close().await?;
            }
            other => {
                return Err(ScriptError::UnknownMethod {
                    object: "Producer",
                    method: other.to_owned(),
                });
            }
        }
        Ok(Value::Null)
    }

    /// `send(queueName, body, headers?)`.
    async fn send(&self, args: &[Value]) -> ScriptResult<()> {
        args::expect_count("send", args, 2..=3)?;
        let queue = args::required_str(args, 0, ScriptError::MissingQueueName)?;
        let body = args::required_str(args, 1, ScriptError::MissingBody)?;
        let headers = args::optional_headers(args, 2)?;

        let message = OutgoingMessage::new(body).with_headers(headers)?;
        self.producer.send(queue, &message).await?;
        Ok(())
    }
}
