//! Producer adapter: sends text messages and commits them.

use super::{MessagingError, MessagingResult};
use crate::messaging::{
    domain::{OutgoingMessage, ProducerConfig, QueueName, SessionLifecycle, SessionState},
    ports::{MessagingClient, MessagingSession},
};
use tracing::{debug, info, warn};

/// Sends messages to queues over one session.
///
/// Destinations are resolved per call; the producer is not bound to a
/// queue.
#[derive(Debug)]
pub struct Producer<S>
where
    S: MessagingSession,
{
    session: S,
    lifecycle: SessionLifecycle,
    config: ProducerConfig,
}

impl<S> Producer<S>
where
    S: MessagingSession,
{
    /// Opens a session for a new producer.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Connect`] when the client cannot open the
    /// session.
    pub async fn create<C>(client: &C, config: ProducerConfig) -> MessagingResult<Self>
    where
        C: MessagingClient<Session = S>,
    {
        let connection = config.connection();
        let session = client
            .connect(connection, config.session_mode())
            .await
            .map_err(|source| MessagingError::Connect {
                queue_manager: connection.queue_manager().clone(),
                source,
            })
            .inspect_err(|err| warn!(error = %err, "producer connection failed"))?;

        let lifecycle = SessionLifecycle::new();
        lifecycle.mark_connected()?;
        info!(
            queue_manager = %connection.queue_manager(),
            channel = %connection.channel(),
            connection_name = %connection.connection_name(),
            tls = connection.tls().is_some(),
            transacted = config.session_mode().is_transacted(),
            "producer session opened"
        );

        Ok(Self {
            session,
            lifecycle,
            config,
        })
    }

    /// Returns the producer configuration.
    #[must_use]
    pub const fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// Returns the session lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    /// Sends `message` to `queue`.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Session`] when the session is closed or
    /// busy, which takes precedence over [`MessagingError::Config`] for an
    /// invalid queue name, and [`MessagingError::Send`] when the client
    /// rejects the transfer.
    pub async fn send(&self, queue: &str, message: &OutgoingMessage) -> MessagingResult<()> {
        let _operation = self.lifecycle.begin(SessionState::Sending)?;
        let destination = QueueName::new(queue)?;

        self.session
            .send(&destination, message)
            .await
            .map_err(|source| MessagingError::Send {
                queue: destination.clone(),
                source,
            })
            .inspect_err(|err| warn!(error = %err, "send failed"))?;

        debug!(
            queue = %destination,
            body_len = message.body().len(),
            headers = message.headers().len(),
            "message sent"
        );
        Ok(())
    }

    /// Sends a text body without headers to `queue`.
    ///
    /// # Errors
    ///
    /// See [`Producer::send`].
    pub async fn send_text(&self, queue: &str, body: &str) -> MessagingResult<()> {
        self.send(queue, &OutgoingMessage::new(body)).await
    }

    /// Commits every send issued since the previous commit.
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
            .inspect_err(|err| warn!(error = %err, "producer commit failed"))?;
        info!(queue_manager = %self.config.connection().queue_manager(), "producer committed");
        Ok(())
    }

    /// Closes the session, discarding uncommitted sends.
    ///
    /// Only the first call reaches the client; later calls return `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::Close`] when the client fails to release
    /// the session. The producer is closed either way.
    pub async fn close(&self) -> MessagingResult<()> {
        if !self.lifecycle.close() {
            debug!("producer already closed");
            return Ok(());
        }

        self.session
            .close()
            .await
            .map_err(MessagingError::Close)
            .inspect_err(|err| warn!(error = %err, "producer close failed"))?;
        info!(queue_manager = %self.config.connection().queue_manager(), "producer session closed");
        Ok(())
    }
}
