//! Domain event to integration event translation.

use chrono::Utc;
use domain::ProductEvent;

use crate::integration::{IntegrationEvent, IntegrationPayload};

/// Builds the integration event for a domain event.
///
/// The result carries the domain fields unchanged plus a freshly generated
/// event id and the current time as its emission time.
pub fn translate(event: &ProductEvent) -> IntegrationEvent {
    let payload = match event {
        ProductEvent::ProductCreated(data) => IntegrationPayload::ProductCreated {
            product_id: data.product_id,
            name: data.name.clone(),
            description: data.description.clone(),
            price: data.price,
            created_at: data.created_at,
        },
        ProductEvent::ProductUpdated(data) => IntegrationPayload::ProductUpdated {
            product_id: data.product_id,
            name: data.name.clone(),
            description: data.description.clone(),
            price: data.price,
            updated_at: data.updated_at,
        },
        ProductEvent::ProductDeleted(data) => IntegrationPayload::ProductDeleted {
            product_id: data.product_id,
            deleted_at: data.deleted_at,
        },
    };

    IntegrationEvent::new(payload, Utc::now())
}
