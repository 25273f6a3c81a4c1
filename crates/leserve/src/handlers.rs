//! HTTP handlers for REST API endpoints

use axum::{
    extract::{Path, Query, State},
    Json, Router,
};
use lecatalogue::{CategoryStore, LazyStorage, Storage};
use lerecherche::{describe_part, PartDetail, SearchEngine, SearchError, SearchRequest, SearchResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};
use crate::responses::{CategoriesResponse, CategoryPathResponse, HealthResponse};

/// Query parameters for search endpoint
///
/// `limit` arrives as text so a malformed value is reported with the
/// search error code rather than a generic rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Free-text query
    pub q: Option<String>,

    /// Curated category id
    pub category: Option<String>,

    /// Sort key name
    pub sort: Option<String>,

    /// Maximum number of results to return
    pub limit: Option<String>,
}

impl SearchQuery {
    /// Convert to a search request, parsing the limit
    pub fn into_request(self) -> Result<SearchRequest, SearchError> {
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(
                text.parse::<usize>()
                    .map_err(|_| SearchError::InvalidLimit(text.to_string()))?,
            ),
        };

        Ok(SearchRequest {
            q: self.q,
            category: self.category,
            sort: self.sort,
            limit,
        })
    }
}

/// State shared across all handlers
///
/// The catalog opens on the first request that needs it. `rusqlite`
/// connections are not `Sync`, so handlers lock it inside
/// `spawn_blocking`.
#[derive(Clone)]
pub struct AppState {
    /// Lazily opened catalog
    pub storage: Arc<LazyStorage>,

    /// Immutable server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create state that opens the configured catalog on first use
    pub fn new(config: ServerConfig) -> Self {
        Self {
            storage: Arc::new(LazyStorage::new(config.storage_config())),
            config: Arc::new(config),
        }
    }

    /// Create state around an existing catalog handle
    pub fn with_storage(storage: Arc<LazyStorage>, config: ServerConfig) -> Self {
        Self {
            storage,
            config: Arc::new(config),
        }
    }

    /// Run blocking catalog work on the blocking pool
    pub async fn with_catalog<T, F>(&self, work: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Storage) -> Result<T, SearchError> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        let outcome = tokio::task::spawn_blocking(move || {
            let shared = storage
                .get()
                .map_err(|e| SearchError::StorageUnavailable(e.to_string()))?;
            let guard = shared
                .lock()
                .map_err(|_| SearchError::StorageUnavailable("catalog lock poisoned".to_string()))?;
            work(&guard)
        })
        .await
        .map_err(|e| ApiError::internal(format!("Catalog task failed: {}", e)))?;

        outcome.map_err(ApiError::from)
    }
}

/// GET /api/search - Tiered part search
pub async fn search(
    Query(params): Query<SearchQuery>,
    State(state): State<AppState>,
) -> ApiResult<Json<SearchResponse>> {
    let request = params.into_request()?;
    info!(
        "Searching: q={:?}, category={:?}, sort={:?}, limit={:?}",
        request.q, request.category, request.sort, request.limit
    );

    let default_limit = state.config.default_limit;
    let response = state
        .with_catalog(move |storage| {
            SearchEngine::new(storage)
                .with_default_limit(default_limit)
                .search(&request)
        })
        .await?;

    Ok(Json(response))
}

/// GET /api/parts/:id - Part detail with related parts
pub async fn get_part(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<PartDetail>> {
    info!("Looking up part: {}", id);

    let lookup = id.clone();
    let detail = state
        .with_catalog(move |storage| describe_part(storage, &lookup))
        .await?;

    detail
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("part {}", id)))
}

/// GET /api/categories - All categories in display order
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<CategoriesResponse>> {
    let categories = state
        .with_catalog(|storage| Ok(CategoryStore::new(storage).list()?))
        .await?;

    Ok(Json(CategoriesResponse::new(categories)))
}

/// GET /api/categories/:id/path - Breadcrumb from the root
pub async fn category_path(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<CategoryPathResponse>> {
    let lookup = id.clone();
    let path = state
        .with_catalog(move |storage| Ok(CategoryStore::new(storage).path_to_root(&lookup)?))
        .await?;

    Ok(Json(CategoryPathResponse { id, path }))
}

/// GET /api/health - Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.storage.is_initialized()))
}

/// Create router with all API endpoints
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", axum::routing::get(health_check))
        .route("/api/search", axum::routing::get(search))
        .route("/api/parts/:id", axum::routing::get(get_part))
        .route("/api/categories", axum::routing::get(list_categories))
        .route("/api/categories/:id/path", axum::routing::get(category_path))
}
