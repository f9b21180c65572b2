use thiserror::Error;

/// Errors returned by message publishers.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The message could not be handed to the broker, or the broker refused it.
    #[error("Failed to publish to exchange '{exchange}' with routing key '{routing_key}': {reason}")]
    DeliveryFailed {
        exchange: String,
        routing_key: String,
        reason: String,
    },

    /// The broker connection could not be established.
    #[error("Broker connection failed: {0}")]
    Connection(#[from] lapin::Error),
}

impl PublishError {
    pub fn delivery_failed(exchange: &str, routing_key: &str, reason: impl ToString) -> Self {
        PublishError::DeliveryFailed {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            reason: reason.to_string(),
        }
    }
}
