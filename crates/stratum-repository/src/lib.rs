//! # Stratum Repository
//!
//! The backing store behind the cache layer.
//!
//! ```text
//! ProductService
//!   ↓  Arc<dyn ProductRepository>    (domain interface)
//! MySqlProductRepository             (SQLx queries)
//!   ↓  Arc<dyn DatabasePoolInterface>
//! primary pool  ── writes
//! replica pool  ── reads, falling back to primary on failure
//! ```
//!
//! [`InMemoryProductRepository`] implements the same trait without a
//! database and is what the service and REST tests run against.

pub mod memory;
pub mod mysql;
pub mod pool;
pub mod traits;

pub use memory::InMemoryProductRepository;
pub use mysql::*;
pub use pool::*;
pub use traits::*;
