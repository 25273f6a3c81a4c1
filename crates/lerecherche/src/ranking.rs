// Tier merging and secondary ordering

use crate::error::SearchError;
use crate::plan::TierKind;
use lecatalogue::PartView;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Default maximum number of returned parts
pub const DEFAULT_LIMIT: usize = 10_000;

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Tier, then parts with more related ids first, then part number
    #[default]
    AltRichness,
    /// Part number
    Identifier,
    /// Name, then part number
    Name,
}

impl FromStr for SortKey {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "alt_ids_length" | "alt-richness" => Ok(SortKey::AltRichness),
            "id" | "identifier" => Ok(SortKey::Identifier),
            "name" => Ok(SortKey::Name),
            other => Err(SearchError::InvalidSort(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::AltRichness => "alt_ids_length",
            SortKey::Identifier => "id",
            SortKey::Name => "name",
        };
        f.write_str(name)
    }
}

/// Number of entries in a cached comma-separated id list
///
/// NULL and blank count as zero.
pub fn alt_id_count(alt_part_ids: Option<&str>) -> usize {
    match alt_part_ids {
        None => 0,
        Some(ids) if ids.trim().is_empty() => 0,
        Some(ids) => ids.matches(',').count() + 1,
    }
}

/// A part together with the tier that first matched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPart {
    /// Tier rank, 1 is best
    pub tier: u8,
    /// Matched part
    pub part: PartView,
}

impl RankedPart {
    fn alt_count(&self) -> usize {
        alt_id_count(self.part.part.alt_part_ids.as_deref())
    }

    fn part_num(&self) -> &str {
        &self.part.part.part_num
    }
}

/// Accumulates tier results, keeping each part's first tier only
#[derive(Debug, Default)]
pub struct TierMerger {
    seen: HashSet<String>,
    merged: Vec<RankedPart>,
}

impl TierMerger {
    /// Empty merger
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one tier's matches; returns how many were new
    pub fn push_tier(&mut self, kind: TierKind, parts: Vec<PartView>) -> usize {
        let before = self.merged.len();
        for part in parts {
            if self.seen.insert(part.part.part_num.clone()) {
                self.merged.push(RankedPart {
                    tier: kind.rank(),
                    part,
                });
            }
        }
        self.merged.len() - before
    }

    /// Distinct parts collected so far
    pub fn len(&self) -> usize {
        self.merged.len()
    }

    /// Whether nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    /// Sort by `sort` and keep at most `limit` parts
    pub fn finish(mut self, sort: SortKey, limit: usize) -> Vec<RankedPart> {
        sort_ranked(&mut self.merged, sort);
        self.merged.truncate(limit);
        self.merged
    }
}

/// Sort ranked parts in place
pub fn sort_ranked(parts: &mut [RankedPart], sort: SortKey) {
    parts.sort_by(|a, b| compare(a, b, sort));
}

fn compare(a: &RankedPart, b: &RankedPart, sort: SortKey) -> Ordering {
    match sort {
        SortKey::AltRichness => a
            .tier
            .cmp(&b.tier)
            .then_with(|| b.alt_count().cmp(&a.alt_count()))
            .then_with(|| a.part_num().cmp(b.part_num())),
        SortKey::Identifier => a.part_num().cmp(b.part_num()),
        SortKey::Name => a
            .part
            .part
            .name
            .cmp(&b.part.part.name)
            .then_with(|| a.part_num().cmp(b.part_num())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lecatalogue::PartRecord;
    use rstest::rstest;

    fn view(part_num: &str, name: &str, alt_part_ids: Option<&str>) -> PartView {
        let mut record = PartRecord::new(part_num, name);
        record.alt_part_ids = alt_part_ids.map(str::to_string);
        PartView::from(record)
    }

    fn ids(parts: &[RankedPart]) -> Vec<&str> {
        parts.iter().map(|p| p.part_num()).collect()
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some(""), 0)]
    #[case(Some("  "), 0)]
    #[case(Some("3002"), 1)]
    #[case(Some("3002,3003"), 2)]
    #[case(Some("a,b,c,d"), 4)]
    fn test_alt_id_count(#[case] ids: Option<&str>, #[case] expected: usize) {
        assert_eq!(alt_id_count(ids), expected);
    }

    #[rstest]
    #[case("alt_ids_length", SortKey::AltRichness)]
    #[case("alt-richness", SortKey::AltRichness)]
    #[case("id", SortKey::Identifier)]
    #[case("identifier", SortKey::Identifier)]
    #[case("name", SortKey::Name)]
    fn test_sort_key_parse(#[case] text: &str, #[case] expected: SortKey) {
        assert_eq!(text.parse::<SortKey>().unwrap(), expected);
    }

    #[test]
    fn test_sort_key_rejects_unknown() {
        assert!(matches!(
            "price".parse::<SortKey>(),
            Err(SearchError::InvalidSort(_))
        ));
    }

    #[test]
    fn test_dedup_keeps_first_tier() {
        let mut merger = TierMerger::new();
        assert_eq!(
            merger.push_tier(TierKind::IdPrefix, vec![view("3001b", "Brick", None)]),
            1
        );
        assert_eq!(
            merger.push_tier(
                TierKind::CrossReference,
                vec![view("3001b", "Brick", None), view("3622", "Brick 1 x 3", None)]
            ),
            1
        );

        let ranked = merger.finish(SortKey::AltRichness, DEFAULT_LIMIT);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].tier, 2);
        assert_eq!(ranked[1].tier, 4);
    }

    #[test]
    fn test_alt_richness_within_tier() {
        let mut merger = TierMerger::new();
        merger.push_tier(
            TierKind::NameMatch,
            vec![
                view("3001", "Brick 2 x 4", Some("")),
                view("3003", "Brick 2 x 2", Some("3002,3003")),
                view("3002", "Brick 2 x 3", Some("3001")),
            ],
        );
        merger.push_tier(TierKind::CrossReference, vec![view("2456", "Brick 2 x 6", Some("a,b,c"))]);

        let ranked = merger.finish(SortKey::AltRichness, DEFAULT_LIMIT);
        assert_eq!(ids(&ranked), vec!["3003", "3002", "3001", "2456"]);
    }

    #[test]
    fn test_identifier_and_name_sorts_ignore_tier() {
        let build = || {
            let mut merger = TierMerger::new();
            merger.push_tier(TierKind::ExactId, vec![view("3003", "Brick 2 x 2", None)]);
            merger.push_tier(
                TierKind::NameMatch,
                vec![view("0901", "Baseplate", None), view("3001", "Brick 2 x 2", None)],
            );
            merger
        };

        assert_eq!(
            ids(&build().finish(SortKey::Identifier, DEFAULT_LIMIT)),
            vec!["0901", "3001", "3003"]
        );
        assert_eq!(
            ids(&build().finish(SortKey::Name, DEFAULT_LIMIT)),
            vec!["0901", "3001", "3003"]
        );
    }

    #[test]
    fn test_limit_truncates_after_sort() {
        let mut merger = TierMerger::new();
        merger.push_tier(
            TierKind::NameMatch,
            vec![view("b", "B", None), view("a", "A", Some("x"))],
        );
        let ranked = merger.finish(SortKey::AltRichness, 1);
        assert_eq!(ids(&ranked), vec!["a"]);
    }
}
