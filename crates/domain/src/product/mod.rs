//! Product aggregate and related types.

mod aggregate;
mod events;
mod value_objects;

pub use aggregate::Product;
pub use events::{
    ProductCreatedData, ProductDeletedData, ProductEvent, ProductEventKind, ProductUpdatedData,
};
pub use value_objects::{MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_PRICE, ProductDetails};
