//! Product service implementation.
//!
//! The trait lives in the parent module (`product_service.rs`).

pub mod product_service_impl;

pub use product_service_impl::{ProductServiceImpl, ProductServiceImplParameters};
