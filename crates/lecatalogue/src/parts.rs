// Part persistence and filtered reads

use crate::filter::Predicate;
use crate::schema::Storage;
use rusqlite::{params, params_from_iter, OptionalExtension, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};

/// Part record for database storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRecord {
    /// Part number; text, leading zeros are significant
    #[serde(rename = "id")]
    pub part_num: String,
    /// Primary name
    pub name: String,
    /// Primary category reference
    #[serde(rename = "category_id")]
    pub part_cat_id: Option<String>,
    /// Material attribute
    pub part_material: Option<String>,
    /// Label file name
    pub label_file: Option<String>,
    /// Curated category reference
    pub ba_cat_id: Option<String>,
    /// Alternate display name
    pub ba_name: Option<String>,
    /// Cached comma-separated related part numbers
    pub alt_part_ids: Option<String>,
    /// Example design reference
    pub example_design_id: Option<String>,
}

impl PartRecord {
    /// Minimal record with only number and name
    pub fn new(part_num: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            part_num: part_num.into(),
            name: name.into(),
            part_cat_id: None,
            part_material: None,
            label_file: None,
            ba_cat_id: None,
            ba_name: None,
            alt_part_ids: None,
            example_design_id: None,
        }
    }

    /// Set the curated category
    pub fn with_ba_category(mut self, ba_cat_id: impl Into<String>) -> Self {
        self.ba_cat_id = Some(ba_cat_id.into());
        self
    }

    /// Set the alternate display name
    pub fn with_ba_name(mut self, ba_name: impl Into<String>) -> Self {
        self.ba_name = Some(ba_name.into());
        self
    }

    /// Set the cached related part numbers
    pub fn with_alt_part_ids(mut self, alt_part_ids: impl Into<String>) -> Self {
        self.alt_part_ids = Some(alt_part_ids.into());
        self
    }
}

/// Part joined with its category names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartView {
    /// Stored part columns
    #[serde(flatten)]
    pub part: PartRecord,
    /// Primary category name
    pub category_name: Option<String>,
    /// Curated category name
    pub ba_category_name: Option<String>,
    /// Parent of the curated category
    pub parent_cat_id: Option<String>,
    /// Parent category name
    pub parent_category: Option<String>,
    /// Grandparent of the curated category
    pub grandparent_cat_id: Option<String>,
    /// Grandparent category name
    pub grandparent_category: Option<String>,
}

impl From<PartRecord> for PartView {
    fn from(part: PartRecord) -> Self {
        Self {
            part,
            category_name: None,
            ba_category_name: None,
            parent_cat_id: None,
            parent_category: None,
            grandparent_cat_id: None,
            grandparent_category: None,
        }
    }
}

const PART_VIEW_SELECT: &str = "
    SELECT p.part_num, p.name, p.part_cat_id, p.part_material, p.label_file,
           p.ba_cat_id, p.ba_name, p.alt_part_ids, p.example_design_id,
           c.name, b.name, parent.id, parent.name, grandparent.id, grandparent.name
    FROM parts p
    LEFT JOIN part_categories c ON p.part_cat_id = c.id
    LEFT JOIN ba_categories b ON p.ba_cat_id = b.id
    LEFT JOIN ba_categories parent ON b.parent_id = parent.id
    LEFT JOIN ba_categories grandparent ON parent.parent_id = grandparent.id";

fn view_from_row(row: &Row<'_>) -> SqliteResult<PartView> {
    Ok(PartView {
        part: PartRecord {
            part_num: row.get(0)?,
            name: row.get(1)?,
            part_cat_id: row.get(2)?,
            part_material: row.get(3)?,
            label_file: row.get(4)?,
            ba_cat_id: row.get(5)?,
            ba_name: row.get(6)?,
            alt_part_ids: row.get(7)?,
            example_design_id: row.get(8)?,
        },
        category_name: row.get(9)?,
        ba_category_name: row.get(10)?,
        parent_cat_id: row.get(11)?,
        parent_category: row.get(12)?,
        grandparent_cat_id: row.get(13)?,
        grandparent_category: row.get(14)?,
    })
}

const INSERT_PART: &str = "INSERT INTO parts (part_num, name, part_cat_id, part_material, label_file, ba_cat_id, ba_name, alt_part_ids, example_design_id)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
     ON CONFLICT(part_num) DO UPDATE SET
        name = excluded.name,
        part_cat_id = excluded.part_cat_id,
        part_material = excluded.part_material,
        label_file = excluded.label_file,
        ba_cat_id = excluded.ba_cat_id,
        ba_name = excluded.ba_name,
        alt_part_ids = excluded.alt_part_ids,
        example_design_id = excluded.example_design_id";

/// Part store for reads and imports
pub struct PartStore<'a> {
    storage: &'a Storage,
}

impl<'a> PartStore<'a> {
    /// Create a new part store
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Insert or replace a part record
    pub fn upsert(&self, record: &PartRecord) -> SqliteResult<()> {
        self.storage.conn().execute(
            INSERT_PART,
            params![
                record.part_num,
                record.name,
                record.part_cat_id,
                record.part_material,
                record.label_file,
                record.ba_cat_id,
                record.ba_name,
                record.alt_part_ids,
                record.example_design_id,
            ],
        )?;
        Ok(())
    }

    /// Batch upsert parts in one transaction
    pub fn batch_upsert(&self, records: &[PartRecord]) -> SqliteResult<()> {
        let tx = self.storage.conn().unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_PART)?;
            for record in records {
                stmt.execute(params![
                    record.part_num,
                    record.name,
                    record.part_cat_id,
                    record.part_material,
                    record.label_file,
                    record.ba_cat_id,
                    record.ba_name,
                    record.alt_part_ids,
                    record.example_design_id,
                ])?;
            }
        }
        tx.commit()
    }

    /// Get one part by exact number
    pub fn get(&self, part_num: &str) -> SqliteResult<Option<PartView>> {
        let sql = format!("{PART_VIEW_SELECT} WHERE p.part_num = ?1");
        self.storage
            .conn()
            .query_row(&sql, params![part_num], view_from_row)
            .optional()
    }

    /// All parts matching a filter, ordered by part number
    pub fn find(&self, filter: &Predicate) -> SqliteResult<Vec<PartView>> {
        let sql_filter = filter.to_sql();
        let sql = format!(
            "{PART_VIEW_SELECT} WHERE {} ORDER BY p.part_num",
            sql_filter.clause
        );

        let mut stmt = self.storage.conn().prepare(&sql)?;
        let parts = stmt
            .query_map(params_from_iter(sql_filter.params.iter()), view_from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(parts)
    }

    /// Number of parts matching a filter
    pub fn count(&self, filter: &Predicate) -> SqliteResult<usize> {
        let sql_filter = filter.to_sql();
        let sql = format!("SELECT COUNT(*) FROM parts p WHERE {}", sql_filter.clause);

        let total: i64 = self.storage.conn().query_row(
            &sql,
            params_from_iter(sql_filter.params.iter()),
            |row| row.get(0),
        )?;

        Ok(usize::try_from(total).unwrap_or(0))
    }

    /// Every stored part number
    pub fn all_part_nums(&self) -> SqliteResult<Vec<String>> {
        let mut stmt = self
            .storage
            .conn()
            .prepare("SELECT part_num FROM parts ORDER BY part_num")?;
        let nums = stmt
            .query_map([], |row| row.get(0))?
            .collect::<SqliteResult<Vec<String>>>()?;
        Ok(nums)
    }
}
