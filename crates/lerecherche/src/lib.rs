// lerecherche - Part Search Engine
//
// *La Recherche* (The Search) - Query classification, tiered plans and ranking

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Query classification.
pub mod analyzer;
/// Category subtree expansion.
pub mod closure;
/// Single-part detail assembly.
pub mod detail;
/// Dimension token detection and expansion.
pub mod dimension;
/// Search errors.
pub mod error;
/// Plan execution against a catalog.
pub mod executor;
/// Tiered retrieval plans.
pub mod plan;
/// Tier merging and secondary ordering.
pub mod ranking;
/// Related-part grouping.
pub mod relationships;
/// Search engine facade.
pub mod search;

pub use analyzer::{analyze, QueryAnalysis, QueryClass, QueryToken};
pub use closure::{CategoryClosureResolver, CategoryHierarchy};
pub use detail::{describe_part, image_url, PartDetail};
pub use dimension::{extract_all, normalize, Dimension};
pub use error::{Result, SearchError};
pub use executor::{CatalogSource, ExecutionOutcome, InMemoryCatalog, PlanExecutor};
pub use plan::{PlanBuilder, SearchPlan, Tier, TierKind};
pub use ranking::{alt_id_count, RankedPart, SortKey, DEFAULT_LIMIT};
pub use relationships::{AlternateBucket, AlternateGroups, RelationshipGrouper, RelationshipSource};
pub use search::{SearchEngine, SearchRequest, SearchResponse};

/// Search library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
