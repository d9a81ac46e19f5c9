//! Session lifecycle, concurrency, and commit-fault tests.

use super::helpers::{QUEUE, connection_document, consumer, consumer_document, manager, producer, queue};
use ibmmq_bridge::messaging::{
    adapters::InMemoryQueueManager,
    domain::{ConsumerConfig, ProducerConfig, SessionState, SessionStateError},
    ports::MessagingClientError,
    services::{Consumer, ErrorKind, MessagingError, Producer},
};
use rstest::rstest;
use serde_json::json;
use std::{sync::Arc, time::Duration};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closing_twice_is_a_no_op(manager: InMemoryQueueManager) {
    let producer = producer(&manager).await;
    let consumer = consumer(&manager, 0, 1).await;

    producer.close().await.expect("first producer close");
    producer.close().await.expect("second producer close");
    consumer.close().await.expect("first consumer close");
    consumer.close().await.expect("second consumer close");

    assert_eq!(producer.state(), SessionState::Closed);
    assert_eq!(consumer.state(), SessionState::Closed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn operations_after_close_report_session_errors(manager: InMemoryQueueManager) {
    let producer = producer(&manager).await;
    producer.close().await.expect("close should succeed");

    let error = producer
        .send_text(QUEUE, "too late")
        .await
        .expect_err("producer is closed");

    assert!(matches!(
        error,
        MessagingError::Session(SessionStateError::Closed)
    ));
    assert_eq!(error.kind(), ErrorKind::Session);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn close_from_another_task_interrupts_a_blocked_consume(manager: InMemoryQueueManager) {
    let consumer = Arc::new(consumer(&manager, 30_000, 1).await);
    let blocked = tokio::spawn({
        let receiver = Arc::clone(&consumer);
        async move { receiver.consume().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    consumer.close().await.expect("close should succeed");

    let outcome = tokio::time::timeout(Duration::from_secs(5), blocked)
        .await
        .expect("consume should return promptly after close")
        .expect("consume task should not panic");
    assert!(matches!(
        outcome,
        Err(MessagingError::Receive {
            source: MessagingClientError::SessionClosed,
            ..
        })
    ));
    assert_eq!(consumer.state(), SessionState::Closed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overlapping_consumes_are_rejected_as_busy(manager: InMemoryQueueManager) {
    let consumer = Arc::new(consumer(&manager, 30_000, 1).await);
    let blocked = tokio::spawn({
        let receiver = Arc::clone(&consumer);
        async move { receiver.consume().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let overlapping = consumer.consume().await;

    assert!(matches!(
        overlapping,
        Err(MessagingError::Session(SessionStateError::Busy(_)))
    ));
    consumer.close().await.expect("close should succeed");
    let first = blocked.await.expect("consume task should not panic");
    assert!(first.is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_commit_keeps_the_unit_of_work(manager: InMemoryQueueManager) {
    let producer = producer(&manager).await;
    producer
        .send_text(QUEUE, "retry me")
        .await
        .expect("send should succeed");
    manager
        .fail_next_commit("log full")
        .expect("fault injection");

    let error = producer.commit().await.expect_err("commit fault injected");
    assert_eq!(error.kind(), ErrorKind::Commit);
    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 0);

    producer.commit().await.expect("second commit should succeed");
    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn non_transacted_sessions_deliver_immediately(manager: InMemoryQueueManager) {
    let mut document = connection_document();
    if let Some(fields) = document.as_object_mut() {
        fields.insert("transacted".to_owned(), json!(false));
    }
    let config = ProducerConfig::from_json(&document).expect("valid config");
    let producer = Producer::create(&manager, config)
        .await
        .expect("producer should connect");

    producer
        .send_text(QUEUE, "no syncpoint")
        .await
        .expect("send should succeed");

    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 1);
    let error = producer.commit().await.expect_err("nothing to commit");
    assert!(matches!(
        error,
        MessagingError::Commit(MessagingClientError::NotTransactional)
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn non_transacted_consumer_removes_messages_without_commit(manager: InMemoryQueueManager) {
    manager.enqueue_text(&queue(QUEUE), "gone").expect("enqueue");
    let mut document = consumer_document(0, 1);
    if let Some(fields) = document.as_object_mut() {
        fields.insert("transacted".to_owned(), json!(false));
    }
    let config = ConsumerConfig::from_json(&document).expect("valid config");
    let consumer = Consumer::create(&manager, config)
        .await
        .expect("consumer should connect");

    consumer.consume().await.expect("consume should succeed");
    consumer.close().await.expect("close should succeed");

    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 0);
}
