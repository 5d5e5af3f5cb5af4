//! # Stratum REST
//!
//! REST API layer using Axum for the Stratum product catalog.
//! Provides cached product endpoints, cache administration, and health checks.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
