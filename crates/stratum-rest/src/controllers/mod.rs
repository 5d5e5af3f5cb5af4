//! REST API controllers.

pub mod cache_controller;
pub mod health_controller;
pub mod product_controller;

pub use health_controller::*;
