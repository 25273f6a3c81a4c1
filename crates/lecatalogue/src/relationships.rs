// Part-to-part relationship edges

use crate::schema::Storage;
use rusqlite::{params, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of relationship between two parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// Alternative part number, no physical difference
    Alias,
    /// Same function with minor mold changes
    MoldVariant,
    /// Supersedes the other part
    Replacement,
    /// May perform the same function
    Alternate,
}

impl RelationshipKind {
    /// Every kind, in presentation order
    pub const ALL: [RelationshipKind; 4] = [
        RelationshipKind::Replacement,
        RelationshipKind::MoldVariant,
        RelationshipKind::Alias,
        RelationshipKind::Alternate,
    ];

    /// Single-letter storage code
    pub fn code(&self) -> &'static str {
        match self {
            RelationshipKind::Alias => "T",
            RelationshipKind::MoldVariant => "M",
            RelationshipKind::Replacement => "R",
            RelationshipKind::Alternate => "A",
        }
    }

    /// Parse a storage code; unknown codes are ignored by readers
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "T" => Some(RelationshipKind::Alias),
            "M" => Some(RelationshipKind::MoldVariant),
            "R" => Some(RelationshipKind::Replacement),
            "A" => Some(RelationshipKind::Alternate),
            _ => None,
        }
    }

    /// Whether this kind feeds the cached `alt_part_ids` column
    pub fn is_cross_reference(&self) -> bool {
        !matches!(self, RelationshipKind::Alternate)
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipKind::Alias => "alias",
            RelationshipKind::MoldVariant => "mold_variant",
            RelationshipKind::Replacement => "replacement",
            RelationshipKind::Alternate => "alternate",
        };
        write!(f, "{}", name)
    }
}

/// Relationship edge for database storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Edge kind
    pub kind: RelationshipKind,
    /// Stored "from" endpoint
    pub parent_part_num: String,
    /// Stored "to" endpoint
    pub child_part_num: String,
}

impl RelationshipRecord {
    /// Create an edge
    pub fn new(
        kind: RelationshipKind,
        parent_part_num: impl Into<String>,
        child_part_num: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            parent_part_num: parent_part_num.into(),
            child_part_num: child_part_num.into(),
        }
    }

    /// The endpoint that is not `part_num`, if the edge touches it
    pub fn other_endpoint(&self, part_num: &str) -> Option<&str> {
        if self.parent_part_num == part_num {
            Some(&self.child_part_num)
        } else if self.child_part_num == part_num {
            Some(&self.parent_part_num)
        } else {
            None
        }
    }
}

/// Relationship edge store
pub struct RelationshipStore<'a> {
    storage: &'a Storage,
}

impl<'a> RelationshipStore<'a> {
    /// Create a new relationship store
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Insert an edge; duplicates are ignored
    pub fn insert(&self, record: &RelationshipRecord) -> SqliteResult<()> {
        self.storage.conn().execute(
            "INSERT OR IGNORE INTO part_relationships (rel_type, parent_part_num, child_part_num)
             VALUES (?1, ?2, ?3)",
            params![
                record.kind.code(),
                record.parent_part_num,
                record.child_part_num,
            ],
        )?;
        Ok(())
    }

    /// Batch insert edges in one transaction
    pub fn batch_insert(&self, records: &[RelationshipRecord]) -> SqliteResult<()> {
        let tx = self.storage.conn().unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO part_relationships (rel_type, parent_part_num, child_part_num)
                 VALUES (?1, ?2, ?3)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.kind.code(),
                    record.parent_part_num,
                    record.child_part_num,
                ])?;
            }
        }
        tx.commit()
    }

    /// Every edge with `part_num` at either endpoint
    ///
    /// Rows with unknown kind codes are skipped.
    pub fn edges_touching(&self, part_num: &str) -> SqliteResult<Vec<RelationshipRecord>> {
        let mut stmt = self.storage.conn().prepare(
            "SELECT rel_type, parent_part_num, child_part_num
             FROM part_relationships
             WHERE rel_type IN ('A', 'M', 'R', 'T')
               AND (parent_part_num = ?1 OR child_part_num = ?1)
             ORDER BY rel_type, parent_part_num, child_part_num",
        )?;

        let rows = stmt.query_map(params![part_num], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut edges = Vec::new();
        for row in rows {
            let (code, parent, child) = row?;
            match RelationshipKind::from_code(&code) {
                Some(kind) => edges.push(RelationshipRecord::new(kind, parent, child)),
                None => tracing::debug!("Skipping relationship with unknown kind {}", code),
            }
        }
        Ok(edges)
    }

    /// Total number of stored edges
    pub fn count(&self) -> SqliteResult<usize> {
        let total: i64 =
            self.storage
                .conn()
                .query_row("SELECT COUNT(*) FROM part_relationships", [], |row| row.get(0))?;
        Ok(usize::try_from(total).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for kind in RelationshipKind::ALL {
            assert_eq!(RelationshipKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(RelationshipKind::from_code("P"), None);
    }

    #[test]
    fn test_edges_are_symmetric() {
        let storage = Storage::open_in_memory().unwrap();
        let store = RelationshipStore::new(&storage);
        store
            .insert(&RelationshipRecord::new(RelationshipKind::MoldVariant, "3001", "3001old"))
            .unwrap();
        store
            .insert(&RelationshipRecord::new(RelationshipKind::Alternate, "2456", "3001"))
            .unwrap();

        let edges = store.edges_touching("3001").unwrap();
        assert_eq!(edges.len(), 2);

        let others: Vec<&str> = edges.iter().filter_map(|e| e.other_endpoint("3001")).collect();
        assert!(others.contains(&"3001old"));
        assert!(others.contains(&"2456"));

        assert_eq!(store.edges_touching("3001old").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_kinds_are_ignored() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .conn()
            .execute(
                "INSERT INTO part_relationships VALUES ('P', '3001', '3001pr0001')",
                [],
            )
            .unwrap();

        let store = RelationshipStore::new(&storage);
        assert!(store.edges_touching("3001").unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_insert_is_ignored() {
        let storage = Storage::open_in_memory().unwrap();
        let store = RelationshipStore::new(&storage);
        let edge = RelationshipRecord::new(RelationshipKind::Alias, "3001", "3001a");
        store.batch_insert(&[edge.clone(), edge]).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
