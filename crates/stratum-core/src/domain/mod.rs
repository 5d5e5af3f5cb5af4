//! Domain entities for the product catalog.

mod product;

pub use product::*;
