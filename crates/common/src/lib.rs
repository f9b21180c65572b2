//! Identifier types shared by every crate in the catalog workspace.

pub mod types;

pub use types::{EventId, ParseIdError, ProductId};
