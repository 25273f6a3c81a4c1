// Single-part detail assembly

use crate::error::Result;
use crate::relationships::{AlternateGroups, RelationshipGrouper};
use lecatalogue::{PartStore, PartView, Storage};
use serde::{Deserialize, Serialize};

/// A part with everything the detail view shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDetail {
    /// Joined part columns
    #[serde(flatten)]
    pub part: PartView,
    /// Curated category name, falling back to the primary one
    pub description: Option<String>,
    /// Primary category name
    pub category: Option<String>,
    /// Rendered image location
    pub image_url: String,
    /// Every related id, once
    pub alternate_ids: Vec<String>,
    /// Related ids grouped by relationship kind
    pub alternates_by_kind: AlternateGroups,
}

/// Image path for a part; leading zeros are not part of image names
pub fn image_url(part_num: &str) -> String {
    let trimmed = part_num.trim_start_matches('0');
    let name = if trimmed.is_empty() && !part_num.is_empty() {
        "0"
    } else {
        trimmed
    };
    format!("/data/images/{}.webp", name)
}

/// Look up a part and its related parts; `None` when the part is unknown
pub fn describe_part(storage: &Storage, part_num: &str) -> Result<Option<PartDetail>> {
    let Some(part) = PartStore::new(storage).get(part_num)? else {
        tracing::debug!("Part {} not found", part_num);
        return Ok(None);
    };

    let alternates_by_kind = RelationshipGrouper::new(storage).group(part_num)?;

    Ok(Some(PartDetail {
        description: part
            .ba_category_name
            .clone()
            .or_else(|| part.category_name.clone()),
        category: part.category_name.clone(),
        image_url: image_url(&part.part.part_num),
        alternate_ids: alternates_by_kind.flat_ids(),
        alternates_by_kind,
        part,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lecatalogue::{
        CategoryRecord, CategoryStore, PartRecord, RelationshipKind, RelationshipRecord,
        RelationshipStore,
    };

    #[test]
    fn test_image_url_strips_leading_zeros() {
        assert_eq!(image_url("0901"), "/data/images/901.webp");
        assert_eq!(image_url("3001"), "/data/images/3001.webp");
        assert_eq!(image_url("000"), "/data/images/0.webp");
    }

    #[test]
    fn test_describe_part() {
        let storage = Storage::open_in_memory().unwrap();
        let categories = CategoryStore::new(&storage);
        categories.upsert_primary("11", "Bricks").unwrap();
        categories.upsert(&CategoryRecord::new("5", "Basic Bricks", None)).unwrap();

        let mut brick = PartRecord::new("3001", "Brick 2 x 4").with_ba_category("5");
        brick.part_cat_id = Some("11".to_string());
        PartStore::new(&storage).upsert(&brick).unwrap();
        RelationshipStore::new(&storage)
            .insert(&RelationshipRecord::new(RelationshipKind::Replacement, "3001", "3001new"))
            .unwrap();

        let detail = describe_part(&storage, "3001").unwrap().unwrap();
        assert_eq!(detail.description.as_deref(), Some("Basic Bricks"));
        assert_eq!(detail.category.as_deref(), Some("Bricks"));
        assert_eq!(detail.alternate_ids, vec!["3001new"]);
        assert_eq!(detail.alternates_by_kind.replacement.ids, vec!["3001new"]);
    }

    #[test]
    fn test_description_falls_back_to_primary_category() {
        let storage = Storage::open_in_memory().unwrap();
        CategoryStore::new(&storage).upsert_primary("11", "Bricks").unwrap();
        let mut brick = PartRecord::new("3001", "Brick 2 x 4");
        brick.part_cat_id = Some("11".to_string());
        PartStore::new(&storage).upsert(&brick).unwrap();

        let detail = describe_part(&storage, "3001").unwrap().unwrap();
        assert_eq!(detail.description.as_deref(), Some("Bricks"));
        assert!(detail.alternates_by_kind.is_empty());
    }

    #[test]
    fn test_unknown_part() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(describe_part(&storage, "nope").unwrap().is_none());
    }
}
