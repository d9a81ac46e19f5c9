//! Consumer adapter: receives batches of text messages from one queue.

use super::{MessagingError, MessagingResult};
use crate::messaging::{
    domain::{
        ConsumedMessage, ConsumerConfig, MessageBody, QueueName, SessionLifecycle, SessionState,
    },
    ports::{MessagingClient, MessagingClientError, MessagingSession, ReceivedMessage},
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Upper bound on the batch buffer reserved before any message arrives.
const PREALLOCATED_MESSAGES: usize = 64;

/// Receives messages from the configured queue over one session.
#[derive(Debug)]
pub struct Consumer<S>
where
    S: MessagingSession,
{
    session: S,
    lifecycle: SessionLifecycle,
    config: ConsumerConfig,
}

impl<S> Consumer<S>
where
    S: MessagingSession,
{
    /// Opens a session and the configured queue for a new consumer.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Connect`] when the client cannot open the
    /// session or the queue. A session opened before the queue check failed
    /// is closed again.
    pub async fn create<C>(client: &C, config: ConsumerConfig) -> MessagingResult<Self>
    where
        C: MessagingClient<Session = S>,
    {
        let connection = config.connection();
        let connect_error = |source: MessagingClientError| MessagingError::Connect {
            queue_manager: connection.queue_manager().clone(),
            source,
        };

        let session = client
            .connect(connection, config.session_mode())
            .await
            .map_err(connect_error)
            .inspect_err(|err| warn!(error = %err, "consumer connection failed"))?;

        if let Err(source) = session.open_for_input(config.queue()).await {
            warn!(queue = %config.queue(), error = %source, "consumer queue could not be opened");
            if let Err(close_error) = session.close().await {
                warn!(error = %close_error, "closing rejected consumer session failed");
            }
            return Err(connect_error(source));
        }

        let lifecycle = SessionLifecycle::new();
        lifecycle.mark_connected()?;
        info!(
            queue_manager = %connection.queue_manager(),
            channel = %connection.channel(),
            connection_name = %connection.connection_name(),
            queue = %config.queue(),
            tls = connection.tls().is_some(),
            transacted = config.session_mode().is_transacted(),
            "consumer session opened"
        );

        Ok(Self {
            session,
            lifecycle,
            config,
        })
    }

    /// Returns the consumer configuration.
    #[must_use]
    pub const fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Returns the session lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    /// Receives up to the configured number of messages, in receive order.
    ///
    /// Each receive waits at most the configured timeout. The call is
    /// all-or-nothing: on any failure no messages are returned, and the ones
    /// already received stay in the session's unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Receive`] when the client fails,
    /// [`MessagingError::NoMessageAvailable`] when a receive times out,
    /// [`MessagingError::NonTextMessage`] for non-text payloads,
    /// [`MessagingError::Property`] when properties cannot be read, and
    /// [`MessagingError::Session`] when the session is closed or busy.
    pub async fn consume(&self) -> MessagingResult<Vec<ConsumedMessage>> {
        let _operation = self.lifecycle.begin(SessionState::Receiving)?;
        let queue = self.config.queue();
        let timeout = self.config.timeout().as_duration();
        let limit = self.config.limit().get();

        let mut messages = Vec::with_capacity(limit.min(PREALLOCATED_MESSAGES));
        for _ in 0..limit {
            let received = self
                .session
                .receive(queue, timeout)
                .await
                .map_err(|source| MessagingError::Receive {
                    queue: queue.clone(),
                    source,
                })
                .inspect_err(|err| warn!(error = %err, "receive failed"))?;

            let Some(message) = received else {
                let err = MessagingError::NoMessageAvailable {
                    queue: queue.clone(),
                    timeout_ms: timeout.as_millis(),
                };
                warn!(error = %err, "receive timed out");
                return Err(err);
            };

            let consumed = to_consumed(queue, &message)
                .inspect_err(|err| warn!(error = %err, "received message rejected"))?;
            debug!(
                queue = %queue,
                message_id = %message.message_id(),
                put_at = ?message.put_at(),
                headers = consumed.headers.len(),
                "message received"
            );
            messages.push(consumed);
        }

        debug!(queue = %queue, count = messages.len(), "consume completed");
        Ok(messages)
    }

    /// Commits the messages received since the previous commit.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Session`] when the session is closed or
    /// busy and [`MessagingError::Commit`] when the session is not
    /// transacted or the client reports a fault.
    pub async fn commit(&self) -> MessagingResult<()> {
        let _operation = self.lifecycle.begin(SessionState::Committing)?;
        self.session
            .commit()
            .await
            .map_err(MessagingError::Commit)
            .inspect_err(|err| warn!(error = %err, "consumer commit failed"))?;
        info!(queue = %self.config.queue(), "consumer committed");
        Ok(())
    }

    /// Closes the session, returning uncommitted messages to the queue.
    ///
    /// May be called from another task while [`Consumer::consume`] is
    /// blocked; the pending receive then fails. Only the first call reaches
    /// the client; later calls return `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Close`] when the client fails to release
    /// the session. The consumer is closed either way.
    pub async fn close(&self) -> MessagingResult<()> {
        if !self.lifecycle.close() {
            debug!("consumer already closed");
            return Ok(());
        }

        self.session
            .close()
            .await
            .map_err(MessagingError::Close)
            .inspect_err(|err| warn!(error = %err, "consumer close failed"))?;
        info!(queue = %self.config.queue(), "consumer session closed");
        Ok(())
    }
}

/// Converts a received message into the `{headers, body}` shape.
fn to_consumed<M>(queue: &QueueName, message: &M) -> MessagingResult<ConsumedMessage>
where
    M: ReceivedMessage,
{
    let MessageBody::Text(body) = message.body() else {
        return Err(MessagingError::NonTextMessage {
            queue: queue.clone(),
            message_id: message.message_id(),
        });
    };

    let property_error = |source: MessagingClientError| MessagingError::Property {
        message_id: message.message_id(),
        source,
    };
    let headers = message
        .property_names()
        .map_err(property_error)?
        .into_iter()
        .map(|name| {
            let value = message.string_property(&name).map_err(property_error)?;
            Ok((name, value))
        })
        .collect::<MessagingResult<BTreeMap<_, _>>>()?;

    Ok(ConsumedMessage::new(headers, body.clone()))
}
