//! In-memory queue manager adapter.
//!
//! Simulates a queue manager inside the process: local queues, SVRCONN
//! channels with optional TLS requirements, a user registry, and
//! transacted sessions whose puts stay invisible until commit. It backs the
//! integration tests and lets scripts be dry-run without a broker.

mod message;
mod session;

pub use message::StoredMessage;
pub use session::InMemorySession;

use crate::messaging::{
    domain::{
        ChannelName, ConnectionConfig, Credentials, MessageBody, PropertyValue, QueueManagerName,
        QueueName, SessionMode,
    },
    ports::{MessagingClient, MessagingClientError, MessagingClientResult},
};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Default)]
struct ChannelDefinition {
    cipher_spec: Option<String>,
}

#[derive(Debug)]
struct BrokerState {
    running: bool,
    channels: HashMap<ChannelName, ChannelDefinition>,
    users: HashMap<String, String>,
    queues: HashMap<QueueName, VecDeque<StoredMessage>>,
    commit_faults: VecDeque<String>,
    connections: usize,
}

impl Default for BrokerState {
    fn default() -> Self {
        Self {
            running: true,
            channels: HashMap::new(),
            users: HashMap::new(),
            queues: HashMap::new(),
            commit_faults: VecDeque::new(),
            connections: 0,
        }
    }
}

/// State shared by the queue manager handle and its sessions.
struct Broker<C> {
    name: QueueManagerName,
    state: RwLock<BrokerState>,
    changes: watch::Sender<u64>,
    clock: Arc<C>,
}

fn lock_error(err: impl fmt::Display) -> MessagingClientError {
    MessagingClientError::transport(std::io::Error::other(err.to_string()))
}

impl<C> Broker<C> {
    fn read(&self) -> MessagingClientResult<RwLockReadGuard<'_, BrokerState>> {
        self.state.read().map_err(lock_error)
    }

    fn write(&self) -> MessagingClientResult<RwLockWriteGuard<'_, BrokerState>> {
        self.state.write().map_err(lock_error)
    }

    /// Wakes every receiver waiting for queue activity.
    fn notify(&self) {
        self.changes
            .send_modify(|version| *version = version.wrapping_add(1));
    }
}

/// In-memory queue manager implementing [`MessagingClient`].
pub struct InMemoryQueueManager<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    broker: Arc<Broker<C>>,
}

impl<C> Clone for InMemoryQueueManager<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            broker: Arc::clone(&self.broker),
        }
    }
}

impl<C> fmt::Debug for InMemoryQueueManager<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InMemoryQueueManager")
            .field("name", &self.broker.name)
            .finish_non_exhaustive()
    }
}

impl InMemoryQueueManager<DefaultClock> {
    /// Creates a running queue manager with no queues or channels.
    #[must_use]
    pub fn new(name: QueueManagerName) -> Self {
        Self::with_clock(name, Arc::new(DefaultClock))
    }
}

impl<C> InMemoryQueueManager<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a running queue manager stamping messages with `clock`.
    #[must_use]
    pub fn with_clock(name: QueueManagerName, clock: Arc<C>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            broker: Arc::new(Broker {
                name,
                state: RwLock::new(BrokerState::default()),
                changes,
                clock,
            }),
        }
    }

    /// Returns the queue-manager name.
    #[must_use]
    pub fn name(&self) -> &QueueManagerName {
        &self.broker.name
    }

    /// Defines an empty local queue. Existing queues keep their messages.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn define_queue(&self, queue: QueueName) -> MessagingClientResult<()> {
        self.broker.write()?.queues.entry(queue).or_default();
        Ok(())
    }

    /// Defines a plaintext SVRCONN channel.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn define_channel(&self, channel: ChannelName) -> MessagingClientResult<()> {
        self.broker
            .write()?
            .channels
            .insert(channel, ChannelDefinition::default());
        Ok(())
    }

    /// Defines a SVRCONN channel that requires TLS with `cipher_spec`.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn define_tls_channel(
        &self,
        channel: ChannelName,
        cipher_spec: impl Into<String>,
    ) -> MessagingClientResult<()> {
        self.broker.write()?.channels.insert(
            channel,
            ChannelDefinition {
                cipher_spec: Some(cipher_spec.into()),
            },
        );
        Ok(())
    }

    /// Registers a user. Once any user exists, connections must
    /// authenticate.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn add_user(
        &self,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> MessagingClientResult<()> {
        self.broker
            .write()?
            .users
            .insert(user_name.into(), password.into());
        Ok(())
    }

    /// Starts or stops the listener. Stopped queue managers refuse
    /// connections; existing sessions keep working.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn set_running(&self, running: bool) -> MessagingClientResult<()> {
        self.broker.write()?.running = running;
        Ok(())
    }

    /// Makes the next commit on any session fail with a transport error.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn fail_next_commit(&self, reason: impl Into<String>) -> MessagingClientResult<()> {
        self.broker
            .write()?
            .commit_faults
            .push_back(reason.into());
        Ok(())
    }

    /// Puts a message directly on a queue, outside any session.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingClientError::UnknownQueue`] for undefined queues.
    pub fn enqueue(
        &self,
        queue: &QueueName,
        body: MessageBody,
        properties: impl IntoIterator<Item = (String, PropertyValue)>,
    ) -> MessagingClientResult<()> {
        let message = StoredMessage::new(body, properties, &*self.broker.clock);
        self.broker
            .write()?
            .queues
            .get_mut(queue)
            .ok_or_else(|| MessagingClientError::UnknownQueue(queue.clone()))?
            .push_back(message);
        self.broker.notify();
        Ok(())
    }

    /// Puts a text message without properties directly on a queue.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingClientError::UnknownQueue`] for undefined queues.
    pub fn enqueue_text(
        &self,
        queue: &QueueName,
        body: impl Into<String>,
    ) -> MessagingClientResult<()> {
        self.enqueue(queue, MessageBody::Text(body.into()), [])
    }

    /// Returns the number of committed messages on a queue.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingClientError::UnknownQueue`] for undefined queues.
    pub fn depth(&self, queue: &QueueName) -> MessagingClientResult<usize> {
        self.broker
            .read()?
            .queues
            .get(queue)
            .map(VecDeque::len)
            .ok_or_else(|| MessagingClientError::UnknownQueue(queue.clone()))
    }

    /// Returns copies of the committed messages on a queue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingClientError::UnknownQueue`] for undefined queues.
    pub fn browse(&self, queue: &QueueName) -> MessagingClientResult<Vec<StoredMessage>> {
        self.broker
            .read()?
            .queues
            .get(queue)
            .map(|messages| messages.iter().cloned().collect())
            .ok_or_else(|| MessagingClientError::UnknownQueue(queue.clone()))
    }

    /// Returns how many connections were accepted.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn connection_count(&self) -> MessagingClientResult<usize> {
        Ok(self.broker.read()?.connections)
    }
}

fn check_tls(
    connection: &ConnectionConfig,
    channel: &ChannelDefinition,
) -> MessagingClientResult<()> {
    let mismatch = |reason: String| MessagingClientError::TlsMismatch {
        channel: connection.channel().clone(),
        reason,
    };

    match (channel.cipher_spec.as_deref(), connection.tls()) {
        (None, None) => Ok(()),
        (Some(required), Some(tls)) if required == tls.cipher_spec() => Ok(()),
        (Some(required), Some(tls)) => Err(mismatch(format!(
            "cipher spec {} does not match {required}",
            tls.cipher_spec()
        ))),
        (Some(_), None) => Err(mismatch("channel requires TLS".to_owned())),
        (None, Some(_)) => Err(mismatch("channel is not configured for TLS".to_owned())),
    }
}

fn check_credentials(
    users: &HashMap<String, String>,
    credentials: Option<&Credentials>,
) -> MessagingClientResult<()> {
    if users.is_empty() {
        return Ok(());
    }

    let Some(presented) = credentials else {
        return Err(MessagingClientError::NotAuthorized(String::new()));
    };

    let authorized = users
        .get(presented.user_name())
        .is_some_and(|expected| presented.password() == Some(expected.as_str()));
    if !authorized {
        return Err(MessagingClientError::NotAuthorized(
            presented.user_name().to_owned(),
        ));
    }

    Ok(())
}

#[async_trait]
impl<C> MessagingClient for InMemoryQueueManager<C>
where
    C: Clock + Send + Sync + 'static,
{
    type Session = InMemorySession<C>;

    async fn connect(
        &self,
        connection: &ConnectionConfig,
        mode: SessionMode,
    ) -> MessagingClientResult<Self::Session> {
        let mut state = self.broker.write()?;
        if !state.running {
            return Err(MessagingClientError::NotRunning(self.broker.name.clone()));
        }

        if connection.queue_manager() != &self.broker.name {
            return Err(MessagingClientError::UnknownQueueManager(
                connection.queue_manager().clone(),
            ));
        }

        let channel = state
            .channels
            .get(connection.channel())
            .ok_or_else(|| MessagingClientError::UnknownChannel(connection.channel().clone()))?;
        check_tls(connection, channel)?;
        check_credentials(&state.users, connection.credentials())?;

        state.connections += 1;
        drop(state);

        debug!(
            queue_manager = %self.broker.name,
            channel = %connection.channel(),
            connection_name = %connection.connection_name(),
            transacted = mode.is_transacted(),
            "accepted in-memory connection"
        );
        Ok(InMemorySession::new(Arc::clone(&self.broker), mode))
    }
}
