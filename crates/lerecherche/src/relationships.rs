// Related-part grouping for part detail

use crate::error::Result;
use lecatalogue::{RelationshipKind, RelationshipRecord, RelationshipStore, Storage};
use serde::{Deserialize, Serialize};

/// Anything relationship edges can be read from
pub trait RelationshipSource {
    /// Every edge with `part_num` at either endpoint
    fn edges_touching(&self, part_num: &str) -> Result<Vec<RelationshipRecord>>;
}

impl RelationshipSource for Storage {
    fn edges_touching(&self, part_num: &str) -> Result<Vec<RelationshipRecord>> {
        Ok(RelationshipStore::new(self).edges_touching(part_num)?)
    }
}

impl RelationshipSource for [RelationshipRecord] {
    fn edges_touching(&self, part_num: &str) -> Result<Vec<RelationshipRecord>> {
        Ok(self
            .iter()
            .filter(|edge| edge.other_endpoint(part_num).is_some())
            .cloned()
            .collect())
    }
}

/// Fixed heading shown for a relationship kind
pub fn heading(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Replacement => "Replacement",
        RelationshipKind::MoldVariant => "Mold Variant",
        RelationshipKind::Alias => "Alias",
        RelationshipKind::Alternate => "Alternate Part",
    }
}

/// Fixed description shown for a relationship kind
pub fn description(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Replacement => "LEGO replacement part that supersedes this one.",
        RelationshipKind::MoldVariant => "Same function with minor mold changes.",
        RelationshipKind::Alias => "Alternative part number, with no difference.",
        RelationshipKind::Alternate => "Other parts that may perform the same function.",
    }
}

/// Related parts of one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateBucket {
    /// Display heading
    pub heading: String,
    /// Display description
    pub description: String,
    /// Related part numbers
    pub ids: Vec<String>,
}

impl AlternateBucket {
    fn empty(kind: RelationshipKind) -> Self {
        Self {
            heading: heading(kind).to_string(),
            description: description(kind).to_string(),
            ids: Vec::new(),
        }
    }
}

/// Related parts grouped by kind; every bucket is always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateGroups {
    /// Parts that supersede this one
    #[serde(rename = "R")]
    pub replacement: AlternateBucket,
    /// Mold variants
    #[serde(rename = "M")]
    pub mold_variant: AlternateBucket,
    /// Alternative numbers for the same part
    #[serde(rename = "T")]
    pub alias: AlternateBucket,
    /// Functional alternates
    #[serde(rename = "A")]
    pub alternate: AlternateBucket,
}

impl Default for AlternateGroups {
    fn default() -> Self {
        Self {
            replacement: AlternateBucket::empty(RelationshipKind::Replacement),
            mold_variant: AlternateBucket::empty(RelationshipKind::MoldVariant),
            alias: AlternateBucket::empty(RelationshipKind::Alias),
            alternate: AlternateBucket::empty(RelationshipKind::Alternate),
        }
    }
}

impl AlternateGroups {
    /// Bucket for a kind
    pub fn bucket(&self, kind: RelationshipKind) -> &AlternateBucket {
        match kind {
            RelationshipKind::Replacement => &self.replacement,
            RelationshipKind::MoldVariant => &self.mold_variant,
            RelationshipKind::Alias => &self.alias,
            RelationshipKind::Alternate => &self.alternate,
        }
    }

    fn bucket_mut(&mut self, kind: RelationshipKind) -> &mut AlternateBucket {
        match kind {
            RelationshipKind::Replacement => &mut self.replacement,
            RelationshipKind::MoldVariant => &mut self.mold_variant,
            RelationshipKind::Alias => &mut self.alias,
            RelationshipKind::Alternate => &mut self.alternate,
        }
    }

    /// Every related id across buckets, first occurrence kept
    pub fn flat_ids(&self) -> Vec<String> {
        let mut flat: Vec<String> = Vec::new();
        for kind in RelationshipKind::ALL {
            for id in &self.bucket(kind).ids {
                if !flat.contains(id) {
                    flat.push(id.clone());
                }
            }
        }
        flat
    }

    /// Whether no bucket holds anything
    pub fn is_empty(&self) -> bool {
        RelationshipKind::ALL
            .iter()
            .all(|kind| self.bucket(*kind).ids.is_empty())
    }
}

/// Groups a part's related parts by relationship kind
pub struct RelationshipGrouper<'a, R: ?Sized> {
    source: &'a R,
}

impl<'a, R: RelationshipSource + ?Sized> RelationshipGrouper<'a, R> {
    /// Grouper over an edge source
    pub fn new(source: &'a R) -> Self {
        Self { source }
    }

    /// Other endpoints of every edge touching `part_num`, by kind
    ///
    /// Self-references are dropped; an id appears once per bucket.
    pub fn group(&self, part_num: &str) -> Result<AlternateGroups> {
        let mut groups = AlternateGroups::default();

        for edge in self.source.edges_touching(part_num)? {
            let Some(other) = edge.other_endpoint(part_num) else {
                continue;
            };
            if other == part_num {
                continue;
            }

            let bucket = groups.bucket_mut(edge.kind);
            if !bucket.ids.iter().any(|id| id == other) {
                bucket.ids.push(other.to_string());
            }
        }

        tracing::debug!("Grouped {} related parts for {}", groups.flat_ids().len(), part_num);
        Ok(groups)
    }
}
