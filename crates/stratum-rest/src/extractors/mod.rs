//! Query string extractors.

mod pagination;
mod search;

pub use pagination::*;
pub use search::*;
