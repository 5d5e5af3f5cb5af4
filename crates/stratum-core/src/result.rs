//! Result type alias for Stratum.

use crate::StratumError;

/// A specialized `Result` type for Stratum operations.
pub type StratumResult<T> = Result<T, StratumError>;
