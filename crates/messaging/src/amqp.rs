//! AMQP publisher backed by `lapin`.
//!
//! One connection and one confirm-mode channel are opened at startup and held
//! for the life of the process. The channel is owned by a single worker task;
//! callers hand it serialized messages over an mpsc queue and wait for the
//! broker's confirm on a oneshot reply.
//!
//! A request whose caller has gone away (cancelled or timed out) while it sat
//! in the queue is dropped without publishing. Once the worker has started a
//! publish it runs to the broker's confirm.
//!
//! There is no reconnect. If the broker closes the channel or connection,
//! every later publish fails with `DeliveryFailed` until the process is
//! restarted.

use async_trait::async_trait;
use chrono::Utc;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind,
    options::{BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions},
    publisher_confirm::Confirmation,
    types::FieldTable,
};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::{IntegrationEvent, MessagePublisher, PublishError};

const QUEUE_CAPACITY: usize = 256;
const PERSISTENT: u8 = 2;

struct PublishRequest {
    exchange: String,
    routing_key: String,
    body: Vec<u8>,
    reply: oneshot::Sender<Result<(), String>>,
}

impl PublishRequest {
    fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }
}

/// Publishes integration events to an AMQP broker.
///
/// Clones share the worker. When the last clone is dropped the worker closes
/// the channel and connection.
#[derive(Clone)]
pub struct AmqpPublisher {
    requests: mpsc::Sender<PublishRequest>,
}

impl AmqpPublisher {
    /// Connects to the broker, enables publisher confirms and declares
    /// `exchange` as a durable topic exchange.
    pub async fn connect(uri: &str, exchange: &str) -> Result<Self, PublishError> {
        let connection = Connection::connect(uri, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;
        channel
            .exchange_declare(
                exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        tracing::info!(exchange, "Connected to message broker");

        let (requests, queue) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(run_worker(connection, channel, queue));

        Ok(Self { requests })
    }
}

#[async_trait]
impl MessagePublisher for AmqpPublisher {
    #[tracing::instrument(skip(self, event), fields(event_id = %event.event_id))]
    async fn publish(
        &self,
        event: &IntegrationEvent,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), PublishError> {
        let body = serde_json::to_vec(event)
            .map_err(|e| PublishError::delivery_failed(exchange, routing_key, e))?;

        let (reply, confirmed) = oneshot::channel();
        let request = PublishRequest {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            body,
            reply,
        };

        let outcome = match self.requests.send(request).await {
            Ok(()) => confirmed
                .await
                .unwrap_or_else(|_| Err("publisher worker dropped the request".to_string())),
            Err(_) => Err("publisher worker has stopped".to_string()),
        };

        match outcome {
            Ok(()) => {
                tracing::info!(exchange, routing_key, "Published message");
                Ok(())
            }
            Err(reason) => {
                tracing::error!(exchange, routing_key, %reason, "Failed to publish message");
                Err(PublishError::delivery_failed(exchange, routing_key, reason))
            }
        }
    }
}

async fn run_worker(
    connection: Connection,
    channel: Channel,
    mut queue: mpsc::Receiver<PublishRequest>,
) {
    while let Some(request) = queue.recv().await {
        if request.is_abandoned() {
            tracing::warn!(
                exchange = %request.exchange,
                routing_key = %request.routing_key,
                "Caller gone before publish, dropping message"
            );
            continue;
        }

        let result = publish_confirmed(&channel, &request)
            .await
            .map_err(|e| e.to_string());
        // The caller may have been cancelled; nobody is left to tell.
        let _ = request.reply.send(result);
    }

    if let Err(e) = channel.close(200, "publisher shutting down").await {
        tracing::warn!(error = %e, "Failed to close broker channel");
    }
    if let Err(e) = connection.close(200, "publisher shutting down").await {
        tracing::warn!(error = %e, "Failed to close broker connection");
    }
    tracing::info!("Publisher worker stopped");
}

#[derive(Debug, thiserror::Error)]
enum ConfirmError {
    #[error(transparent)]
    Broker(#[from] lapin::Error),

    #[error("broker rejected the message")]
    Nacked,
}

async fn publish_confirmed(
    channel: &Channel,
    request: &PublishRequest,
) -> Result<(), ConfirmError> {
    let properties = BasicProperties::default()
        .with_content_type("application/json".into())
        .with_delivery_mode(PERSISTENT)
        .with_message_id(Uuid::new_v4().to_string().into())
        .with_timestamp(Utc::now().timestamp().max(0) as u64);

    let confirmation = channel
        .basic_publish(
            &request.exchange,
            &request.routing_key,
            BasicPublishOptions::default(),
            &request.body,
            properties,
        )
        .await?
        .await?;

    match confirmation {
        Confirmation::Nack(_) => Err(ConfirmError::Nacked),
        Confirmation::Ack(_) | Confirmation::NotRequested => Ok(()),
    }
}
