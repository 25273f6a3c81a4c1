//! lecatalogue - Catalog Storage Layer
//!
//! *Le Catalogue* (The Catalog) - SQLite part catalog with typed filter predicates

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Curated category hierarchy storage.
pub mod categories;
/// Typed part filters and their SQL rendering.
pub mod filter;
/// Batch jobs rebuilding denormalized columns.
pub mod maintenance;
/// Part storage and joined reads.
pub mod parts;
/// Lazily-opened shared catalog handle.
pub mod pool;
/// Part-to-part relationship edges.
pub mod relationships;
/// Database schema and connection management.
pub mod schema;

pub use categories::{CategoryCrumb, CategoryRecord, CategoryStore, MAX_PATH_DEPTH};
pub use filter::{escape_like, PartField, Predicate, SqlFilter};
pub use maintenance::{
    refresh_alt_part_ids, refresh_category_counts, AltIdRefreshStats, CategoryCountStats,
};
pub use parts::{PartRecord, PartStore, PartView};
pub use pool::LazyStorage;
pub use relationships::{RelationshipKind, RelationshipRecord, RelationshipStore};
pub use schema::{Storage, StorageConfig};

/// Storage library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
