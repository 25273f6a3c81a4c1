//! API response types

use lecatalogue::{CategoryCrumb, CategoryRecord};
use serde::{Deserialize, Serialize};

/// Category listing in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    /// Categories with cached part counts
    pub categories: Vec<CategoryRecord>,

    /// Number of categories
    pub total: usize,
}

impl CategoriesResponse {
    /// Wrap a category listing
    pub fn new(categories: Vec<CategoryRecord>) -> Self {
        Self {
            total: categories.len(),
            categories,
        }
    }
}

/// Root-to-category breadcrumb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPathResponse {
    /// Requested category
    pub id: String,

    /// Path from the root, ending at the category; empty if unknown
    pub path: Vec<CategoryCrumb>,
}

/// Health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" when the server answers
    pub status: String,

    /// Service name
    pub service: String,

    /// Crate version
    pub version: String,

    /// Whether the catalog has been opened yet
    pub catalog_open: bool,
}

impl HealthResponse {
    /// Healthy response for this build
    pub fn ok(catalog_open: bool) -> Self {
        Self {
            status: "ok".to_string(),
            service: "leserve".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            catalog_open,
        }
    }
}
