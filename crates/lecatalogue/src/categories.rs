// Curated category hierarchy

use crate::schema::Storage;
use rusqlite::{params, params_from_iter, OptionalExtension, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bound on ancestor walks; the catalog is a handful of levels deep
pub const MAX_PATH_DEPTH: usize = 10;

/// Category record for database storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Category identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Parent identifier; `None` for roots
    pub parent_id: Option<String>,
    /// Display sort order
    pub sort_order: i64,
    /// Cached subtree part count, refreshed out of band
    pub parts_count: i64,
}

impl CategoryRecord {
    /// Create a category with zero sort order and count
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: parent_id.map(str::to_string),
            sort_order: 0,
            parts_count: 0,
        }
    }

    /// Set the display sort order
    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Whether this category has no parent
    pub fn is_root(&self) -> bool {
        normalize_parent(self.parent_id.clone()).is_none()
    }
}

/// One step of a root-to-category path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCrumb {
    /// Category identifier
    pub id: String,
    /// Display name
    pub name: String,
}

// Legacy imports wrote 0 or '' for roots
fn normalize_parent(parent_id: Option<String>) -> Option<String> {
    parent_id.filter(|p| !p.is_empty() && p != "0")
}

fn category_from_row(row: &Row<'_>) -> SqliteResult<CategoryRecord> {
    Ok(CategoryRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: normalize_parent(row.get(2)?),
        sort_order: row.get(3)?,
        parts_count: row.get(4)?,
    })
}

/// Category store
pub struct CategoryStore<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryStore<'a> {
    /// Create a new category store
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Insert or replace a category; the cached count is left as given
    ///
    /// Root markers `''` and `'0'` are stored as NULL.
    pub fn upsert(&self, record: &CategoryRecord) -> SqliteResult<()> {
        let parent_id = normalize_parent(record.parent_id.clone());
        self.storage.conn().execute(
            "INSERT INTO ba_categories (id, name, parent_id, sort_order, parts_count)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                parent_id = excluded.parent_id,
                sort_order = excluded.sort_order",
            params![
                record.id,
                record.name,
                parent_id,
                record.sort_order,
                record.parts_count,
            ],
        )?;
        Ok(())
    }

    /// Insert or replace a primary (source) category
    pub fn upsert_primary(&self, id: &str, name: &str) -> SqliteResult<()> {
        self.storage.conn().execute(
            "INSERT INTO part_categories (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![id, name],
        )?;
        Ok(())
    }

    /// Get a category by identifier
    pub fn get(&self, id: &str) -> SqliteResult<Option<CategoryRecord>> {
        self.storage
            .conn()
            .query_row(
                "SELECT id, name, parent_id, sort_order, parts_count
                 FROM ba_categories WHERE id = ?1",
                params![id],
                category_from_row,
            )
            .optional()
    }

    /// All categories in display order
    pub fn list(&self) -> SqliteResult<Vec<CategoryRecord>> {
        let mut stmt = self.storage.conn().prepare(
            "SELECT id, name, parent_id, sort_order, parts_count
             FROM ba_categories
             ORDER BY sort_order, name",
        )?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(categories)
    }

    /// Direct children of any of the given categories
    pub fn children_of(&self, parent_ids: &[String]) -> SqliteResult<Vec<String>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; parent_ids.len()].join(", ");
        let sql = format!(
            "SELECT id FROM ba_categories
             WHERE parent_id IN ({placeholders}) AND parent_id NOT IN ('', '0')
             ORDER BY sort_order, id"
        );

        let mut stmt = self.storage.conn().prepare(&sql)?;
        let children = stmt
            .query_map(params_from_iter(parent_ids.iter()), |row| row.get(0))?
            .collect::<SqliteResult<Vec<String>>>()?;
        Ok(children)
    }

    /// Path from the root down to the given category
    ///
    /// Unknown categories yield an empty path. The walk stops after
    /// [`MAX_PATH_DEPTH`] steps or when a category repeats.
    pub fn path_to_root(&self, id: &str) -> SqliteResult<Vec<CategoryCrumb>> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id.to_string());

        while let Some(current_id) = current.take() {
            if path.len() >= MAX_PATH_DEPTH || !seen.insert(current_id.clone()) {
                tracing::warn!("Category path for {} truncated at {}", id, current_id);
                break;
            }

            let Some(category) = self.get(&current_id)? else {
                break;
            };

            path.push(CategoryCrumb {
                id: category.id,
                name: category.name,
            });
            current = category.parent_id;
        }

        path.reverse();
        Ok(path)
    }
}
