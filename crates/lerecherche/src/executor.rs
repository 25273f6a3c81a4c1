// Plan execution against a catalog

use crate::error::Result;
use crate::plan::SearchPlan;
use crate::ranking::{RankedPart, SortKey, TierMerger};
use lecatalogue::{PartRecord, PartStore, PartView, Predicate, Storage};

/// Anything parts can be filtered from
pub trait CatalogSource {
    /// Parts matching the predicate, ordered by part number
    fn fetch(&self, predicate: &Predicate) -> Result<Vec<PartView>>;

    /// Number of parts matching the predicate
    fn count(&self, predicate: &Predicate) -> Result<usize>;
}

impl CatalogSource for Storage {
    fn fetch(&self, predicate: &Predicate) -> Result<Vec<PartView>> {
        Ok(PartStore::new(self).find(predicate)?)
    }

    fn count(&self, predicate: &Predicate) -> Result<usize> {
        Ok(PartStore::new(self).count(predicate)?)
    }
}

/// Catalog held in memory, evaluated with [`Predicate::matches`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    parts: Vec<PartRecord>,
}

impl InMemoryCatalog {
    /// Catalog over the given parts
    pub fn new(mut parts: Vec<PartRecord>) -> Self {
        parts.sort_by(|a, b| a.part_num.cmp(&b.part_num));
        Self { parts }
    }
}

impl CatalogSource for InMemoryCatalog {
    fn fetch(&self, predicate: &Predicate) -> Result<Vec<PartView>> {
        Ok(self
            .parts
            .iter()
            .filter(|part| predicate.matches(part))
            .cloned()
            .map(PartView::from)
            .collect())
    }

    fn count(&self, predicate: &Predicate) -> Result<usize> {
        Ok(self.parts.iter().filter(|part| predicate.matches(part)).count())
    }
}

/// Ranked page of results plus the untruncated total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Sorted, deduplicated, truncated parts
    pub results: Vec<RankedPart>,
    /// Matches of the count predicate
    pub total: usize,
    /// Tiers actually queried
    pub tiers_run: usize,
}

/// Runs a [`SearchPlan`] tier by tier
pub struct PlanExecutor<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: CatalogSource + ?Sized> PlanExecutor<'a, S> {
    /// Executor over a catalog
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Run every tier, merge, sort and truncate, then count
    ///
    /// Under the tier-ordered sort, later tiers can only land after the
    /// ones already collected, so fetching stops once `limit` is reached.
    pub fn execute(&self, plan: &SearchPlan, sort: SortKey, limit: usize) -> Result<ExecutionOutcome> {
        let mut merger = TierMerger::new();
        let mut tiers_run = 0;

        for tier in &plan.tiers {
            if sort == SortKey::AltRichness && merger.len() >= limit {
                tracing::debug!("Limit {} reached, skipping {:?} and later", limit, tier.kind);
                break;
            }

            let parts = self.source.fetch(&tier.predicate)?;
            let added = merger.push_tier(tier.kind, parts);
            tiers_run += 1;
            tracing::debug!("Tier {:?} contributed {} parts", tier.kind, added);
        }

        let total = self.source.count(&plan.count)?;
        let results = merger.finish(sort, limit);

        Ok(ExecutionOutcome {
            results,
            total,
            tiers_run,
        })
    }
}
