pub mod products;
pub mod system;
