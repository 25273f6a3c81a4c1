//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lerecherche::SearchError;
use serde::Serialize;
use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure reported to an API client
///
/// Every error carries a stable machine-readable code next to the
/// human-readable message; search failures reuse the search error codes.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,

    /// Stable error code
    pub code: &'static str,

    /// Human-readable message
    pub message: String,
}

/// JSON body written for every error response
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    code: &'a str,
}

impl ApiError {
    /// Create an error with an explicit status and code
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 404 for an unknown resource
    pub fn not_found(resource: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{} not found", resource),
        )
    }

    /// 500 for failures outside the search pipeline
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Search failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: &self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_not_found_names_resource() {
        let error = ApiError::not_found("part 3001");
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.code, "NOT_FOUND");
        assert_eq!(error.to_string(), "NOT_FOUND: part 3001 not found");
    }

    #[test]
    fn test_client_search_errors_are_bad_requests() {
        let error = ApiError::from(SearchError::MissingCriteria);
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.code, "QUERY_REQUIRED");
        assert_eq!(error.message, "query or category filter required");

        let error = ApiError::from(SearchError::InvalidSort("price".to_string()));
        assert_eq!(error.code, "INVALID_SORT");
    }

    #[test]
    fn test_store_errors_are_internal() {
        let error = ApiError::from(SearchError::Store(rusqlite::Error::InvalidQuery));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.code, "SEARCH_FAILED");

        let error = ApiError::from(SearchError::StorageUnavailable("locked".to_string()));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.code, "STORAGE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ApiError::from(SearchError::InvalidLimit("0".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INVALID_LIMIT");
    }
}
