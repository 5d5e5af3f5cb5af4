//! Search extractor.

use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for product search.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive text matched against names and descriptions.
    #[serde(default)]
    pub q: String,
}
