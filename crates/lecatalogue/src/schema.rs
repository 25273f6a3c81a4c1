// Storage schema and database management

use rusqlite::{Connection, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database path
    pub db_path: String,

    /// Whether to enable WAL mode
    pub wal_enabled: bool,

    /// Cache size in pages
    pub cache_size_pages: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "lebrique.sqlite".to_string(),
            wal_enabled: true,
            cache_size_pages: Some(10000),
        }
    }
}

/// Main storage interface
pub struct Storage {
    conn: Connection,
    config: StorageConfig,
}

impl Storage {
    /// Open storage with default config
    pub fn open<P: AsRef<Path>>(path: P) -> SqliteResult<Self> {
        Self::open_with_config(path, StorageConfig::default())
    }

    /// Open storage with custom config
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StorageConfig) -> SqliteResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, config)
    }

    /// Open a private in-memory catalog
    pub fn open_in_memory() -> SqliteResult<Self> {
        let config = StorageConfig {
            db_path: ":memory:".to_string(),
            wal_enabled: false,
            cache_size_pages: None,
        };
        Self::from_connection(Connection::open_in_memory()?, config)
    }

    fn from_connection(conn: Connection, config: StorageConfig) -> SqliteResult<Self> {
        // Enable WAL mode for better concurrency
        if config.wal_enabled {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        if let Some(cache_size) = config.cache_size_pages {
            conn.pragma_update(None, "cache_size", cache_size)?;
        }

        let storage = Self { conn, config };
        storage.initialize_schema()?;

        tracing::debug!("Catalog storage ready at {}", storage.config.db_path);
        Ok(storage)
    }

    /// Initialize database schema
    ///
    /// Every statement is idempotent; an existing catalog is left untouched.
    fn initialize_schema(&self) -> SqliteResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS parts (
                part_num TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                part_cat_id TEXT,
                part_material TEXT,
                label_file TEXT,
                ba_cat_id TEXT,
                ba_name TEXT,
                alt_part_ids TEXT DEFAULT NULL,
                example_design_id TEXT
            )",
            [],
        )?;

        // Primary (source) categories
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS part_categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            )",
            [],
        )?;

        // Curated hierarchical categories
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS ba_categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                parent_id TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0,
                parts_count INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS part_relationships (
                rel_type TEXT NOT NULL,
                parent_part_num TEXT NOT NULL,
                child_part_num TEXT NOT NULL,
                PRIMARY KEY(rel_type, parent_part_num, child_part_num)
            )",
            [],
        )?;

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_parts_name ON parts(name)",
            "CREATE INDEX IF NOT EXISTS idx_parts_ba_name ON parts(ba_name)",
            "CREATE INDEX IF NOT EXISTS idx_parts_ba_cat_id ON parts(ba_cat_id)",
            "CREATE INDEX IF NOT EXISTS idx_parts_alt_part_ids ON parts(alt_part_ids)",
            "CREATE INDEX IF NOT EXISTS idx_ba_categories_parent_id ON ba_categories(parent_id)",
            "CREATE INDEX IF NOT EXISTS idx_relationships_parent ON part_relationships(parent_part_num)",
            "CREATE INDEX IF NOT EXISTS idx_relationships_child ON part_relationships(child_part_num)",
        ];
        for index_sql in indexes {
            self.conn.execute(index_sql, [])?;
        }

        Ok(())
    }

    /// Get the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get mutable connection
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Configuration this storage was opened with
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Checkpoint the WAL into the main database file
    pub fn close(&mut self) -> SqliteResult<()> {
        if self.config.wal_enabled {
            self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE)")?;
        }
        Ok(())
    }
}
