//! Pagination extractor.

use serde::Deserialize;
use stratum_core::PageRequest;
use utoipa::IntoParams;

/// Query parameters for pagination. Pages are 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number, starting at 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page, clamped to 1..=100.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl From<PaginationQuery> for PageRequest {
    fn from(query: PaginationQuery) -> Self {
        PageRequest::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_first_page() {
        let request = PageRequest::from(PaginationQuery::default());
        assert_eq!(request, PageRequest::first());
    }

    #[test]
    fn test_clamps_out_of_range_values() {
        let request = PageRequest::from(PaginationQuery {
            page: Some(0),
            limit: Some(1000),
        });
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, PageRequest::MAX_LIMIT);
    }
}
