// Batch jobs that rebuild denormalized catalog columns
//
// Searches never call these; they read whatever the last run left behind.

use crate::schema::Storage;
use rusqlite::{params, Result as SqliteResult};
use serde::{Deserialize, Serialize};

/// Outcome of an alternate id refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AltIdRefreshStats {
    /// Parts visited
    pub parts_scanned: usize,
    /// Parts left with at least one alternate
    pub parts_with_alternates: usize,
}

/// Outcome of a category count refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCountStats {
    /// Categories visited
    pub categories_updated: usize,
    /// Categories whose subtree holds no parts
    pub empty_categories: usize,
}

/// Rebuild `parts.alt_part_ids` from alias, mold variant and replacement edges
///
/// Alternate edges never enter the cache. Parts without related ids are
/// set to NULL.
pub fn refresh_alt_part_ids(storage: &Storage) -> SqliteResult<AltIdRefreshStats> {
    let tx = storage.conn().unchecked_transaction()?;
    let mut stats = AltIdRefreshStats::default();

    {
        let part_nums: Vec<String> = {
            let mut stmt = tx.prepare("SELECT part_num FROM parts ORDER BY part_num")?;
            let nums = stmt
                .query_map([], |row| row.get(0))?
                .collect::<SqliteResult<Vec<String>>>()?;
            nums
        };

        let mut related = tx.prepare(
            "SELECT child_part_num AS alt_id FROM part_relationships
             WHERE rel_type IN ('M', 'R', 'T') AND parent_part_num = ?1
             UNION
             SELECT parent_part_num AS alt_id FROM part_relationships
             WHERE rel_type IN ('M', 'R', 'T') AND child_part_num = ?1
             ORDER BY alt_id",
        )?;
        let mut update = tx.prepare("UPDATE parts SET alt_part_ids = ?1 WHERE part_num = ?2")?;

        for part_num in &part_nums {
            let alt_ids = related
                .query_map(params![part_num], |row| row.get::<_, String>(0))?
                .collect::<SqliteResult<Vec<String>>>()?
                .into_iter()
                .filter(|alt_id| alt_id != part_num)
                .collect::<Vec<_>>();

            let cached = if alt_ids.is_empty() {
                None
            } else {
                stats.parts_with_alternates += 1;
                Some(alt_ids.join(","))
            };

            update.execute(params![cached, part_num])?;
            stats.parts_scanned += 1;
        }
    }

    tx.commit()?;
    tracing::info!(
        "Refreshed alternate ids for {} parts ({} with alternates)",
        stats.parts_scanned,
        stats.parts_with_alternates
    );
    Ok(stats)
}

/// Rebuild `ba_categories.parts_count` with each category's subtree total
pub fn refresh_category_counts(storage: &Storage) -> SqliteResult<CategoryCountStats> {
    let tx = storage.conn().unchecked_transaction()?;
    let mut stats = CategoryCountStats::default();

    {
        let category_ids: Vec<String> = {
            let mut stmt = tx.prepare("SELECT id FROM ba_categories ORDER BY id")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<SqliteResult<Vec<String>>>()?;
            ids
        };

        // UNION (not UNION ALL) stops at the first repeated id
        let mut subtree_count = tx.prepare(
            "WITH RECURSIVE subtree(id) AS (
                SELECT id FROM ba_categories WHERE id = ?1
                UNION
                SELECT child.id FROM ba_categories child
                JOIN subtree parent ON child.parent_id = parent.id
                WHERE child.parent_id NOT IN ('', '0')
             )
             SELECT COUNT(*) FROM parts WHERE ba_cat_id IN (SELECT id FROM subtree)",
        )?;
        let mut update = tx.prepare("UPDATE ba_categories SET parts_count = ?1 WHERE id = ?2")?;

        for category_id in &category_ids {
            let count: i64 = subtree_count.query_row(params![category_id], |row| row.get(0))?;
            update.execute(params![count, category_id])?;

            if count == 0 {
                stats.empty_categories += 1;
            }
            stats.categories_updated += 1;
            tracing::debug!("Category {}: {} parts", category_id, count);
        }
    }

    tx.commit()?;
    tracing::info!("Refreshed part counts for {} categories", stats.categories_updated);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{CategoryRecord, CategoryStore};
    use crate::parts::{PartRecord, PartStore};
    use crate::relationships::{RelationshipKind, RelationshipRecord, RelationshipStore};

    #[test]
    fn test_refresh_alt_part_ids() {
        let storage = Storage::open_in_memory().unwrap();
        let parts = PartStore::new(&storage);
        parts
            .batch_upsert(&[
                PartRecord::new("3001", "Brick 2 x 4").with_alt_part_ids("stale"),
                PartRecord::new("3001old", "Brick 2 x 4 old mold"),
                PartRecord::new("3003", "Brick 2 x 2"),
                PartRecord::new("2456", "Brick 2 x 6"),
            ])
            .unwrap();

        RelationshipStore::new(&storage)
            .batch_insert(&[
                RelationshipRecord::new(RelationshipKind::MoldVariant, "3001", "3001old"),
                RelationshipRecord::new(RelationshipKind::Replacement, "3003", "3001"),
                RelationshipRecord::new(RelationshipKind::Alternate, "3001", "2456"),
                RelationshipRecord::new(RelationshipKind::Alias, "3001", "3001"),
            ])
            .unwrap();

        let stats = refresh_alt_part_ids(&storage).unwrap();
        assert_eq!(stats.parts_scanned, 4);
        assert_eq!(stats.parts_with_alternates, 3);

        let brick = parts.get("3001").unwrap().unwrap();
        assert_eq!(brick.part.alt_part_ids.as_deref(), Some("3001old,3003"));

        let alternate_only = parts.get("2456").unwrap().unwrap();
        assert_eq!(alternate_only.part.alt_part_ids, None);
    }

    #[test]
    fn test_refresh_category_counts_sums_subtree() {
        let storage = Storage::open_in_memory().unwrap();
        let categories = CategoryStore::new(&storage);
        categories.upsert(&CategoryRecord::new("14", "Plates", None)).unwrap();
        categories.upsert(&CategoryRecord::new("14a", "Plates 1 wide", Some("14"))).unwrap();
        categories.upsert(&CategoryRecord::new("3", "Bricks", None)).unwrap();

        PartStore::new(&storage)
            .batch_upsert(&[
                PartRecord::new("3023", "Plate 1 x 2").with_ba_category("14a"),
                PartRecord::new("3020", "Plate 2 x 4").with_ba_category("14"),
            ])
            .unwrap();

        let stats = refresh_category_counts(&storage).unwrap();
        assert_eq!(stats.categories_updated, 3);
        assert_eq!(stats.empty_categories, 1);

        assert_eq!(categories.get("14").unwrap().unwrap().parts_count, 2);
        assert_eq!(categories.get("14a").unwrap().unwrap().parts_count, 1);
        assert_eq!(categories.get("3").unwrap().unwrap().parts_count, 0);
    }

    #[test]
    fn test_refresh_category_counts_terminates_on_cycle() {
        let storage = Storage::open_in_memory().unwrap();
        let categories = CategoryStore::new(&storage);
        categories.upsert(&CategoryRecord::new("a", "A", Some("b"))).unwrap();
        categories.upsert(&CategoryRecord::new("b", "B", Some("a"))).unwrap();
        PartStore::new(&storage)
            .upsert(&PartRecord::new("1", "Looped").with_ba_category("a"))
            .unwrap();

        refresh_category_counts(&storage).unwrap();
        assert_eq!(categories.get("b").unwrap().unwrap().parts_count, 1);
    }
}
