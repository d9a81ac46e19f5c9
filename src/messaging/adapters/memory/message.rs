//! Messages held on in-memory queues.

use crate::messaging::{
    domain::{MessageBody, PropertyValue},
    ports::{MessagingClientError, MessagingClientResult, ReceivedMessage},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A message stored on an in-memory queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    message_id: String,
    body: MessageBody,
    properties: BTreeMap<String, PropertyValue>,
    put_at: DateTime<Utc>,
}

impl StoredMessage {
    /// Creates a message stamped with a fresh identifier and the clock's
    /// current time.
    #[must_use]
    pub(super) fn new(
        body: MessageBody,
        properties: impl IntoIterator<Item = (String, PropertyValue)>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            message_id: format!("ID:{}", Uuid::new_v4().simple()),
            body,
            properties: properties.into_iter().collect(),
            put_at: clock.utc(),
        }
    }

}

impl ReceivedMessage for StoredMessage {
    fn message_id(&self) -> String {
        self.message_id.clone()
    }

    fn body(&self) -> &MessageBody {
        &self.body
    }

    fn put_at(&self) -> Option<DateTime<Utc>> {
        Some(self.put_at)
    }

    fn property_names(&self) -> MessagingClientResult<Vec<String>> {
        Ok(self.properties.keys().cloned().collect())
    }

    fn string_property(&self, name: &str) -> MessagingClientResult<String> {
        let value = self
            .properties
            .get(name)
            .ok_or_else(|| MessagingClientError::PropertyNotFound(name.to_owned()))?;
        value
            .to_string_value()
            .ok_or_else(|| MessagingClientError::PropertyConversion {
                name: name.to_owned(),
                type_name: value.type_name().to_owned(),
            })
    }
}
