//! Mock ports and fixtures shared by the service tests.

use crate::messaging::{
    domain::{
        ConnectionConfig, ConsumerConfig, MessageBody, OutgoingMessage, ProducerConfig, QueueName,
        SessionMode,
    },
    ports::{
        MessagingClient, MessagingClientError, MessagingClientResult, MessagingSession,
        ReceivedMessage,
    },
};
use async_trait::async_trait;
use mockall::mock;
use serde_json::json;
use std::time::Duration;

mock! {
    pub Session {}

    #[async_trait]
    impl MessagingSession for Session {
        type Message = ScriptedMessage;

        async fn open_for_input(&self, queue: &QueueName) -> MessagingClientResult<()>;
        async fn send(
            &self,
            queue: &QueueName,
            message: &OutgoingMessage,
        ) -> MessagingClientResult<()>;
        async fn receive(
            &self,
            queue: &QueueName,
            timeout: Duration,
        ) -> MessagingClientResult<Option<ScriptedMessage>>;
        async fn commit(&self) -> MessagingClientResult<()>;
        async fn close(&self) -> MessagingClientResult<()>;
    }
}

impl std::fmt::Debug for MockSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSession").finish_non_exhaustive()
    }
}

mock! {
    pub Client {}

    #[async_trait]
    impl MessagingClient for Client {
        type Session = MockSession;

        async fn connect(
            &self,
            connection: &ConnectionConfig,
            mode: SessionMode,
        ) -> MessagingClientResult<MockSession>;
    }
}

/// Returns a client whose only connection yields `session`.
pub(super) fn client_with(session: MockSession) -> MockClient {
    let mut client = MockClient::new();
    client
        .expect_connect()
        .times(1)
        .return_once(move |_, _| Ok(session));
    client
}

/// Received message double with scriptable property failures.
#[derive(Debug, Clone)]
pub struct ScriptedMessage {
    id: String,
    body: MessageBody,
    properties: Vec<(String, String)>,
    enumeration_fails: bool,
    unreadable_property: Option<String>,
}

impl ScriptedMessage {
    pub(super) fn text(id: &str, body: &str) -> Self {
        Self {
            id: id.to_owned(),
            body: MessageBody::Text(body.to_owned()),
            properties: Vec::new(),
            enumeration_fails: false,
            unreadable_property: None,
        }
    }

    pub(super) fn bytes(id: &str, payload: &[u8]) -> Self {
        Self {
            body: MessageBody::Bytes(payload.to_vec()),
            ..Self::text(id, "")
        }
    }

    pub(super) fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.push((name.to_owned(), value.to_owned()));
        self
    }

    pub(super) fn with_failing_enumeration(mut self) -> Self {
        self.enumeration_fails = true;
        self
    }

    pub(super) fn with_unreadable_property(mut self, name: &str) -> Self {
        self.properties.push((name.to_owned(), String::new()));
        self.unreadable_property = Some(name.to_owned());
        self
    }
}

impl ReceivedMessage for ScriptedMessage {
    fn message_id(&self) -> String {
        self.id.clone()
    }

    fn body(&self) -> &MessageBody {
        &self.body
    }

    fn property_names(&self) -> MessagingClientResult<Vec<String>> {
        if self.enumeration_fails {
            return Err(MessagingClientError::transport(std::io::Error::other(
                "property table unavailable",
            )));
        }
        Ok(self
            .properties
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn string_property(&self, name: &str) -> MessagingClientResult<String> {
        if self.unreadable_property.as_deref() == Some(name) {
            return Err(MessagingClientError::PropertyConversion {
                name: name.to_owned(),
                type_name: "bytes".to_owned(),
            });
        }
        self.properties
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| MessagingClientError::PropertyNotFound(name.to_owned()))
    }
}

pub(super) fn producer_config() -> ProducerConfig {
    ProducerConfig::from_json(&json!({
        "qmName": "QM1",
        "hostname": "localhost",
        "portNumber": 1414,
        "channelName": "DEV.APP.SVRCONN"
    }))
    .expect("valid producer config")
}

pub(super) fn consumer_config(msg_limit: i64) -> ConsumerConfig {
    ConsumerConfig::from_json(&json!({
        "qmName": "QM1",
        "hostname": "localhost",
        "portNumber": 1414,
        "channelName": "DEV.APP.SVRCONN",
        "queueName": "DEV.QUEUE.1",
        "timeout": 250,
        "msgLimit": msg_limit
    }))
    .expect("valid consumer config")
}
