//! Shared fixtures for in-memory messaging tests.

use ibmmq_bridge::messaging::{
    adapters::{InMemoryQueueManager, InMemorySession},
    domain::{ChannelName, ConsumerConfig, ProducerConfig, QueueManagerName, QueueName},
    services::{Consumer, Producer},
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::{Value, json};

/// Session type produced by the in-memory queue manager.
pub type TestSession = InMemorySession<DefaultClock>;

pub const QUEUE_MANAGER: &str = "QM1";
pub const CHANNEL: &str = "DEV.APP.SVRCONN";
pub const TLS_CHANNEL: &str = "DEV.TLS.SVRCONN";
pub const QUEUE: &str = "DEV.QUEUE.1";
pub const CIPHER_SPEC: &str = "TLS_AES_256_GCM_SHA384";

pub fn queue(name: &str) -> QueueName {
    QueueName::new(name).expect("valid queue name")
}

/// Queue manager `QM1` with one plaintext channel and one local queue.
#[fixture]
pub fn manager() -> InMemoryQueueManager {
    let manager =
        InMemoryQueueManager::new(QueueManagerName::new(QUEUE_MANAGER).expect("valid name"));
    manager
        .define_channel(ChannelName::new(CHANNEL).expect("valid channel"))
        .expect("channel definition should succeed");
    manager
        .define_queue(queue(QUEUE))
        .expect("queue definition should succeed");
    manager
}

pub fn connection_document() -> Value {
    json!({
        "qmName": QUEUE_MANAGER,
        "hostname": "localhost",
        "portNumber": 1414,
        "channelName": CHANNEL
    })
}

pub fn consumer_document(timeout_ms: i64, msg_limit: i64) -> Value {
    let mut document = connection_document();
    if let Some(fields) = document.as_object_mut() {
        fields.insert("queueName".to_owned(), json!(QUEUE));
        fields.insert("timeout".to_owned(), json!(timeout_ms));
        fields.insert("msgLimit".to_owned(), json!(msg_limit));
    }
    document
}

pub async fn producer(manager: &InMemoryQueueManager) -> Producer<TestSession> {
    let config = ProducerConfig::from_json(&connection_document()).expect("valid producer config");
    Producer::create(manager, config)
        .await
        .expect("producer should connect")
}

pub async fn consumer(
    manager: &InMemoryQueueManager,
    timeout_ms: i64,
    msg_limit: i64,
) -> Consumer<TestSession> {
    let config = ConsumerConfig::from_json(&consumer_document(timeout_ms, msg_limit))
        .expect("valid consumer config");
    Consumer::create(manager, config)
        .await
        .expect("consumer should connect")
}
