// Search engine facade

use crate::analyzer::analyze;
use crate::closure::{CategoryClosureResolver, CategoryHierarchy};
use crate::error::{Result, SearchError};
use crate::executor::{CatalogSource, PlanExecutor};
use crate::plan::PlanBuilder;
use crate::ranking::{SortKey, DEFAULT_LIMIT};
use lecatalogue::PartView;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Search request as received from callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query
    pub q: Option<String>,
    /// Curated category id
    pub category: Option<String>,
    /// Sort key name
    pub sort: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// Text-only request
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    /// Restrict to a category subtree
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the sort key name
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Set the result limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Ranked page of parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Parts in ranked order
    pub results: Vec<PartView>,
    /// Total matches before the limit
    pub total: usize,
    /// Number of parts in `results`
    pub returned: usize,
    /// Resolved category closure; empty without a category filter
    pub categories: Vec<String>,
}

/// Validated search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
struct Criteria {
    query: Option<String>,
    category: Option<String>,
    sort: SortKey,
    limit: usize,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Runs searches against a catalog
pub struct SearchEngine<'a, S: ?Sized> {
    catalog: &'a S,
    resolver: CategoryClosureResolver,
    planner: PlanBuilder,
    default_limit: usize,
}

impl<'a, S> SearchEngine<'a, S>
where
    S: CatalogSource + CategoryHierarchy + ?Sized,
{
    /// Engine with default closure bounds and limit
    pub fn new(catalog: &'a S) -> Self {
        Self {
            catalog,
            resolver: CategoryClosureResolver::default(),
            planner: PlanBuilder::new(),
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Limit applied when a request has none
    pub fn with_default_limit(mut self, default_limit: usize) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Replace the closure resolver
    pub fn with_resolver(mut self, resolver: CategoryClosureResolver) -> Self {
        self.resolver = resolver;
        self
    }

    fn validate(&self, request: &SearchRequest) -> Result<Criteria> {
        let query = non_blank(request.q.as_deref());
        let category = non_blank(request.category.as_deref());
        if query.is_none() && category.is_none() {
            return Err(SearchError::MissingCriteria);
        }

        let sort = match non_blank(request.sort.as_deref()) {
            Some(name) => name.parse()?,
            None => SortKey::default(),
        };

        let limit = request.limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Err(SearchError::InvalidLimit(limit.to_string()));
        }

        Ok(Criteria {
            query,
            category,
            sort,
            limit,
        })
    }

    /// Validate, plan and run a search
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let criteria = self.validate(request)?;

        let categories = match &criteria.category {
            Some(category) => self.resolver.resolve(self.catalog, category)?,
            None => Vec::new(),
        };
        let closure = criteria.category.as_ref().map(|_| categories.as_slice());

        let plan = match &criteria.query {
            Some(q) => {
                let analysis = analyze(q);
                self.planner.build(&analysis, closure)
            }
            None => self.planner.category_only(&categories),
        };

        info!(
            "Searching q={:?} category={:?} strategy={} sort={}",
            criteria.query, criteria.category, plan.strategy, criteria.sort
        );

        let outcome = PlanExecutor::new(self.catalog).execute(&plan, criteria.sort, criteria.limit)?;
        let results: Vec<PartView> = outcome.results.into_iter().map(|r| r.part).collect();

        info!("Search returned {} of {} matches", results.len(), outcome.total);

        Ok(SearchResponse {
            returned: results.len(),
            results,
            total: outcome.total,
            categories,
        })
    }
}
