//! RabbitMQ integration tests
//!
//! These tests start a RabbitMQ container and need a Docker daemon.
//! Run with:
//!
//! ```bash
//! cargo test -p messaging --test amqp_integration -- --ignored
//! ```

use std::time::Duration;

use chrono::Utc;
use common::ProductId;
use lapin::{
    Connection, ConnectionProperties,
    options::{BasicGetOptions, QueueBindOptions, QueueDeclareOptions},
    types::FieldTable,
};
use messaging::{
    AmqpPublisher, IntegrationEvent, IntegrationPayload, MessagePublisher, PRODUCT_EXCHANGE,
    PublishError,
};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::rabbitmq::RabbitMq;

fn deleted_event() -> IntegrationEvent {
    IntegrationEvent::new(
        IntegrationPayload::ProductDeleted {
            product_id: ProductId::new(),
            deleted_at: Utc::now(),
        },
        Utc::now(),
    )
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_publish_is_confirmed_and_routed() {
    let container = RabbitMq::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5672).await.unwrap();
    let uri = format!("amqp://guest:guest@{}:{}/%2f", host, port);

    let publisher = AmqpPublisher::connect(&uri, PRODUCT_EXCHANGE).await.unwrap();

    // Bind a queue so the message has somewhere to land
    let connection = Connection::connect(&uri, ConnectionProperties::default())
        .await
        .unwrap();
    let channel = connection.create_channel().await.unwrap();
    let queue = channel
        .queue_declare("", QueueDeclareOptions::default(), FieldTable::default())
        .await
        .unwrap();
    channel
        .queue_bind(
            queue.name().as_str(),
            PRODUCT_EXCHANGE,
            "product.*",
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .unwrap();

    let event = deleted_event();
    publisher
        .publish(&event, PRODUCT_EXCHANGE, event.routing_key())
        .await
        .unwrap();

    let mut received = None;
    for _ in 0..20 {
        if let Some(message) = channel
            .basic_get(queue.name().as_str(), BasicGetOptions { no_ack: true })
            .await
            .unwrap()
        {
            received = Some(message);
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let message = received.expect("message was not routed");
    let properties = &message.delivery.properties;
    assert_eq!(properties.delivery_mode(), &Some(2));
    assert_eq!(
        properties.content_type().as_ref().map(|s| s.as_str()),
        Some("application/json")
    );
    assert!(properties.message_id().is_some());
    assert_eq!(message.delivery.routing_key.as_str(), "product.deleted");

    let parsed: IntegrationEvent = serde_json::from_slice(&message.delivery.data).unwrap();
    assert_eq!(parsed, event);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_publish_to_missing_exchange_fails() {
    let container = RabbitMq::default().start().await.unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5672).await.unwrap();
    let uri = format!("amqp://guest:guest@{}:{}/%2f", host, port);

    let publisher = AmqpPublisher::connect(&uri, PRODUCT_EXCHANGE).await.unwrap();
    let event = deleted_event();

    let result = publisher
        .publish(&event, "no.such.exchange", event.routing_key())
        .await;

    assert!(matches!(result, Err(PublishError::DeliveryFailed { .. })));

    // The broker closed the only channel; nothing reopens it.
    let retry = publisher
        .publish(&event, PRODUCT_EXCHANGE, event.routing_key())
        .await;
    assert!(matches!(retry, Err(PublishError::DeliveryFailed { .. })));
}
