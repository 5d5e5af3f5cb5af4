//! # Stratum Service
//!
//! The cache layer and the product service composed on top of it.
//!
//! - [`cache`]: store abstraction plus the cache-aside, write-through,
//!   write-behind and invalidation helpers.
//! - [`ProductService`]: CRUD over products, cached through the helpers.

pub mod cache;
pub mod dto;
pub mod product_service;

mod r#impl;

pub use cache::*;
pub use dto::*;
pub use product_service::*;
pub use r#impl::*;
