// Search errors

use thiserror::Error;

/// Search result alias
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors raised while validating or running a search
#[derive(Debug, Error)]
pub enum SearchError {
    /// Neither a query nor a category was given
    #[error("query or category filter required")]
    MissingCriteria,

    /// Limit was zero or not a number
    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(String),

    /// Unknown sort key
    #[error("unknown sort key: {0}")]
    InvalidSort(String),

    /// Catalog query failed
    #[error("catalog query failed: {0}")]
    Store(#[from] rusqlite::Error),

    /// Catalog could not be reached
    #[error("catalog unavailable: {0}")]
    StorageUnavailable(String),
}

impl SearchError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::MissingCriteria => "QUERY_REQUIRED",
            SearchError::InvalidLimit(_) => "INVALID_LIMIT",
            SearchError::InvalidSort(_) => "INVALID_SORT",
            SearchError::Store(_) => "SEARCH_FAILED",
            SearchError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    /// Whether the caller sent a bad request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SearchError::MissingCriteria | SearchError::InvalidLimit(_) | SearchError::InvalidSort(_)
        )
    }
}
