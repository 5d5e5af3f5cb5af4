//! # Stratum Server Library
//!
//! Composition root for the Stratum server: the Shaku module wiring the
//! backing store, the cache store and the product service, plus startup
//! utilities.

pub mod di;
pub mod startup;
