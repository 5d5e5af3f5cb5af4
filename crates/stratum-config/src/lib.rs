//! # Stratum Config
//!
//! Configuration management for Stratum.
//! Supports layered configuration from files and environment variables,
//! with runtime refresh.

mod app_config;
mod loader;

pub use app_config::*;
pub use loader::*;
