//! Persistence port for product aggregates.
//!
//! [`ProductRepository`] is the narrow contract command and query handlers
//! call through. Two backends satisfy it with identical observable behavior:
//! [`InMemoryProductRepository`] and [`PostgresProductRepository`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::ProductId;
pub use error::{RepositoryError, Result};
pub use memory::InMemoryProductRepository;
pub use postgres::PostgresProductRepository;
pub use store::ProductRepository;
