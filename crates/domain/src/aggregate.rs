//! Core entity and domain event traits.

use chrono::{DateTime, SubsecRound, Utc};
use common::ProductId;
use serde::Serialize;

/// Current time truncated to microseconds, the precision PostgreSQL keeps.
///
/// Every domain timestamp comes from here so a value handed back to a
/// caller equals the one later read from any store.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Trait for persistent entities with identity and audit timestamps.
///
/// Identity and `created_at` are fixed at creation. `updated_at` stays
/// `None` until the first mutation.
pub trait Entity: Send + Sync {
    /// Returns the entity's unique identifier.
    fn id(&self) -> ProductId;

    /// Returns when the entity was created.
    fn created_at(&self) -> DateTime<Utc>;

    /// Returns when the entity was last mutated, if ever.
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + Send + Sync + Clone {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the aggregate the event is about.
    fn aggregate_id(&self) -> ProductId;

    /// Returns when the state change happened.
    fn occurred_at(&self) -> DateTime<Utc>;
}
