//! Delivery visibility and ordering tests.

use super::helpers::{QUEUE, consumer, manager, producer, queue};
use ibmmq_bridge::messaging::{
    adapters::InMemoryQueueManager,
    domain::{MessageBody, OutgoingMessage, PropertyValue},
    ports::ReceivedMessage,
    services::{ErrorKind, MessagingError},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn committed_send_is_visible_to_a_later_consume(manager: InMemoryQueueManager) {
    let producer = producer(&manager).await;
    producer
        .send_text(QUEUE, r#"{"orderId": 7}"#)
        .await
        .expect("send should succeed");
    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 0);

    producer.commit().await.expect("commit should succeed");
    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 1);

    let consumer = consumer(&manager, 1_000, 1).await;
    let messages = consumer.consume().await.expect("consume should succeed");
    assert_eq!(
        messages.first().map(|message| message.body.as_str()),
        Some(r#"{"orderId": 7}"#)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn uncommitted_sends_are_discarded_on_close(manager: InMemoryQueueManager) {
    let producer = producer(&manager).await;
    producer
        .send_text(QUEUE, "draft")
        .await
        .expect("send should succeed");

    producer.close().await.expect("close should succeed");

    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 0);
    let consumer = consumer(&manager, 0, 1).await;
    let error = consumer.consume().await.expect_err("queue is empty");
    assert!(matches!(error, MessagingError::NoMessageAvailable { .. }));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn two_enqueued_messages_are_returned_in_receive_order(manager: InMemoryQueueManager) {
    manager
        .enqueue_text(&queue(QUEUE), "first")
        .expect("enqueue first");
    manager
        .enqueue_text(&queue(QUEUE), "second")
        .expect("enqueue second");

    let consumer = consumer(&manager, 5_000, 2).await;
    let messages = consumer.consume().await.expect("consume should succeed");

    let bodies: Vec<&str> = messages.iter().map(|message| message.body.as_str()).collect();
    assert_eq!(bodies, ["first", "second"]);
    assert!(messages.iter().all(|message| message.headers.is_empty()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn huge_limit_reports_exhaustion_and_keeps_received_work(manager: InMemoryQueueManager) {
    manager
        .enqueue_text(&queue(QUEUE), "only")
        .expect("enqueue");

    let consumer = consumer(&manager, 0, i64::MAX).await;
    let error = consumer.consume().await.expect_err("queue runs dry");
    assert!(matches!(error, MessagingError::NoMessageAvailable { .. }));
    assert_eq!(error.kind(), ErrorKind::Receive);

    consumer.close().await.expect("close should succeed");
    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 1);
}

#[rstest]
#[case(0)]
#[case(1)]
#[tokio::test(flavor = "multi_thread")]
async fn zero_limit_consumes_a_single_message(
    manager: InMemoryQueueManager,
    #[case] msg_limit: i64,
) {
    for body in ["a", "b", "c"] {
        manager.enqueue_text(&queue(QUEUE), body).expect("enqueue");
    }

    let consumer = consumer(&manager, 0, msg_limit).await;
    let messages = consumer.consume().await.expect("consume should succeed");

    assert_eq!(messages.len(), 1);
    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn headers_travel_with_the_message(manager: InMemoryQueueManager) {
    let producer = producer(&manager).await;
    let message = OutgoingMessage::new("payload")
        .with_headers([
            ("traceId".to_owned(), "t-42".to_owned()),
            ("tenant".to_owned(), "acme".to_owned()),
        ])
        .expect("valid headers");
    producer
        .send(QUEUE, &message)
        .await
        .expect("send should succeed");
    producer.commit().await.expect("commit should succeed");

    let consumer = consumer(&manager, 1_000, 1).await;
    let messages = consumer.consume().await.expect("consume should succeed");

    let headers = &messages.first().expect("one message").headers;
    assert_eq!(headers.get("traceId").map(String::as_str), Some("t-42"));
    assert_eq!(headers.get("tenant").map(String::as_str), Some("acme"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn typed_properties_are_reported_as_strings(manager: InMemoryQueueManager) {
    manager
        .enqueue(
            &queue(QUEUE),
            MessageBody::Text("body".to_owned()),
            [
                ("attempt".to_owned(), PropertyValue::Integer(3)),
                ("priorityLane".to_owned(), PropertyValue::Boolean(true)),
            ],
        )
        .expect("enqueue");

    let consumer = consumer(&manager, 0, 1).await;
    let messages = consumer.consume().await.expect("consume should succeed");

    let headers = &messages.first().expect("one message").headers;
    assert_eq!(headers.get("attempt").map(String::as_str), Some("3"));
    assert_eq!(headers.get("priorityLane").map(String::as_str), Some("true"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bytes_property_fails_with_a_property_error(manager: InMemoryQueueManager) {
    manager
        .enqueue(
            &queue(QUEUE),
            MessageBody::Text("body".to_owned()),
            [("digest".to_owned(), PropertyValue::Bytes(vec![1, 2, 3]))],
        )
        .expect("enqueue");

    let consumer = consumer(&manager, 0, 1).await;
    let error = consumer.consume().await.expect_err("digest has no text form");

    assert_eq!(error.kind(), ErrorKind::Property);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn non_text_message_fails_and_is_backed_out_on_close(manager: InMemoryQueueManager) {
    manager
        .enqueue_text(&queue(QUEUE), "text first")
        .expect("enqueue text");
    manager
        .enqueue(&queue(QUEUE), MessageBody::Bytes(vec![0xca, 0xfe]), [])
        .expect("enqueue bytes");

    let consumer = consumer(&manager, 0, 2).await;
    let error = consumer.consume().await.expect_err("bytes are rejected");
    assert!(matches!(error, MessagingError::NonTextMessage { .. }));
    assert_eq!(error.to_string(), "received non-text message");

    consumer.close().await.expect("close should succeed");

    let remaining = manager.browse(&queue(QUEUE)).expect("browse");
    let bodies: Vec<Option<&str>> = remaining
        .iter()
        .map(|message| message.body().as_text())
        .collect();
    assert_eq!(bodies, [Some("text first"), None]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn consumer_commit_removes_received_messages(manager: InMemoryQueueManager) {
    manager.enqueue_text(&queue(QUEUE), "once").expect("enqueue");

    let consumer = consumer(&manager, 0, 1).await;
    consumer.consume().await.expect("consume should succeed");
    consumer.commit().await.expect("commit should succeed");
    consumer.close().await.expect("close should succeed");

    assert_eq!(manager.depth(&queue(QUEUE)).expect("depth"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn consume_waits_for_a_message_committed_later(manager: InMemoryQueueManager) {
    let consumer = consumer(&manager, 5_000, 1).await;
    let producer = producer(&manager).await;

    let (result, ()) = tokio::join!(consumer.consume(), async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        producer
            .send_text(QUEUE, "late arrival")
            .await
            .expect("send should succeed");
        producer.commit().await.expect("commit should succeed");
    });

    let messages = result.expect("consume should succeed");
    assert_eq!(
        messages.first().map(|message| message.body.as_str()),
        Some("late arrival")
    );
}
