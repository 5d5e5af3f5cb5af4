//! # Stratum Core
//!
//! Core types, traits, and error definitions shared by every layer of the
//! Stratum cache workspace: the error taxonomy, typed identifiers,
//! pagination, validation helpers, and the product domain.

pub mod domain;
pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod traits;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::{module, HasComponent, Interface};
