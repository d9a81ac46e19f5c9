//! Sessions opened against the in-memory queue manager.

use super::{Broker, StoredMessage, lock_error};
use crate::messaging::{
    domain::{MessageBody, OutgoingMessage, PropertyValue, QueueName, SessionMode},
    ports::{MessagingClientError, MessagingClientResult, MessagingSession},
};
use async_trait::async_trait;
use mockable::Clock;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Operations recorded under syncpoint.
#[derive(Debug, Default)]
struct UnitOfWork {
    puts: Vec<(QueueName, StoredMessage)>,
    gets: Vec<(QueueName, StoredMessage)>,
}

/// Session against an [`super::InMemoryQueueManager`].
///
/// Lock order is broker state first, then the unit of work.
pub struct InMemorySession<C> {
    broker: Arc<Broker<C>>,
    mode: SessionMode,
    unit_of_work: Mutex<UnitOfWork>,
    closed: watch::Sender<bool>,
}

impl<C> fmt::Debug for InMemorySession<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InMemorySession")
            .field("queue_manager", &self.broker.name)
            .field("mode", &self.mode)
            .field("closed", &*self.closed.borrow())
            .finish_non_exhaustive()
    }
}

impl<C> InMemorySession<C>
where
    C: Clock + Send + Sync + 'static,
{
    pub(super) fn new(broker: Arc<Broker<C>>, mode: SessionMode) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            broker,
            mode,
            unit_of_work: Mutex::new(UnitOfWork::default()),
            closed,
        }
    }

    /// Returns how many sends await commit.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn pending_sends(&self) -> MessagingClientResult<usize> {
        Ok(self.lock_unit_of_work()?.puts.len())
    }

    fn lock_unit_of_work(&self) -> MessagingClientResult<MutexGuard<'_, UnitOfWork>> {
        self.unit_of_work.lock().map_err(lock_error)
    }

    fn ensure_open(&self) -> MessagingClientResult<()> {
        if *self.closed.borrow() {
            return Err(MessagingClientError::SessionClosed);
        }
        Ok(())
    }

    fn ensure_queue(&self, queue: &QueueName) -> MessagingClientResult<()> {
        let state = self.broker.read()?;
        self.ensure_open()?;
        if !state.queues.contains_key(queue) {
            return Err(MessagingClientError::UnknownQueue(queue.clone()));
        }
        Ok(())
    }

    /// Removes the next message from `queue`, recording it under syncpoint.
    fn take_next(&self, queue: &QueueName) -> MessagingClientResult<Option<StoredMessage>> {
        let mut state = self.broker.write()?;
        self.ensure_open()?;
        let Some(message) = state
            .queues
            .get_mut(queue)
            .ok_or_else(|| MessagingClientError::UnknownQueue(queue.clone()))?
            .pop_front()
        else {
            return Ok(None);
        };

        if self.mode.is_transacted() {
            self.lock_unit_of_work()?
                .gets
                .push((queue.clone(), message.clone()));
        }
        Ok(Some(message))
    }
}

#[async_trait]
impl<C> MessagingSession for InMemorySession<C>
where
    C: Clock + Send + Sync + 'static,
{
    type Message = StoredMessage;

    async fn open_for_input(&self, queue: &QueueName) -> MessagingClientResult<()> {
        self.ensure_queue(queue)
    }

    async fn send(
        &self,
        queue: &QueueName,
        message: &OutgoingMessage,
    ) -> MessagingClientResult<()> {
        let stored = StoredMessage::new(
            MessageBody::Text(message.body().to_owned()),
            message
                .headers()
                .iter()
                .map(|(name, value)| (name.clone(), PropertyValue::String(value.clone()))),
            &*self.broker.clock,
        );

        let mut state = self.broker.write()?;
        self.ensure_open()?;
        let messages = state
            .queues
            .get_mut(queue)
            .ok_or_else(|| MessagingClientError::UnknownQueue(queue.clone()))?;

        if self.mode.is_transacted() {
            self.lock_unit_of_work()?.puts.push((queue.clone(), stored));
            return Ok(());
        }

        messages.push_back(stored);
        drop(state);
        self.broker.notify();
        Ok(())
    }

    async fn receive(
        &self,
        queue: &QueueName,
        timeout: Duration,
    ) -> MessagingClientResult<Option<StoredMessage>> {
        let deadline = Instant::now() + timeout;
        let mut changes = self.broker.changes.subscribe();
        let mut closed = self.closed.subscribe();

        loop {
            if let Some(message) = self.take_next(queue)? {
                return Ok(Some(message));
            }

            tokio::select! {
                _ = changes.changed() => {}
                _ = closed.changed() => {}
                () = tokio::time::sleep_until(deadline) => return Ok(None),
            }
        }
    }

    async fn commit(&self) -> MessagingClientResult<()> {
        let mut state = self.broker.write()?;
        self.ensure_open()?;
        if !self.mode.is_transacted() {
            return Err(MessagingClientError::NotTransactional);
        }

        if let Some(reason) = state.commit_faults.pop_front() {
            return Err(MessagingClientError::transport(std::io::Error::other(
                reason,
            )));
        }

        let mut unit_of_work = self.lock_unit_of_work()?;
        let delivered = !unit_of_work.puts.is_empty();
        for (queue, message) in unit_of_work.puts.drain(..) {
            if let Some(messages) = state.queues.get_mut(&queue) {
                messages.push_back(message);
            }
        }
        unit_of_work.gets.clear();
        drop(unit_of_work);
        drop(state);

        if delivered {
            self.broker.notify();
        }
        Ok(())
    }

    async fn close(&self) -> MessagingClientResult<()> {
        let mut state = self.broker.write()?;
        if *self.closed.borrow() {
            return Ok(());
        }

        let mut unit_of_work = self.lock_unit_of_work()?;
        unit_of_work.puts.clear();
        let restored = !unit_of_work.gets.is_empty();
        for (queue, message) in unit_of_work.gets.drain(..).rev() {
            if let Some(messages) = state.queues.get_mut(&queue) {
                messages.push_front(message);
            }
        }
        drop(unit_of_work);

        self.closed.send_replace(true);
        drop(state);

        if restored {
            self.broker.notify();
        }
        Ok(())
    }
}
