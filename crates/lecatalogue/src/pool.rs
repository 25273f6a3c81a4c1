// Shared, lazily-opened catalog handle

use crate::schema::{Storage, StorageConfig};
use once_cell::sync::OnceCell;
use rusqlite::Result as SqliteResult;
use std::sync::{Arc, Mutex};

/// Catalog connection opened on first use and shared afterwards
///
/// `rusqlite::Connection` is `Send` but not `Sync`, so the opened storage
/// sits behind a mutex. Concurrent first callers race on the cell; exactly
/// one of them opens the database.
pub struct LazyStorage {
    config: StorageConfig,
    cell: OnceCell<Arc<Mutex<Storage>>>,
}

impl LazyStorage {
    /// Defer opening the catalog described by `config`
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Wrap an already opened catalog
    pub fn from_storage(storage: Storage) -> Self {
        let config = storage.config().clone();
        let cell = OnceCell::new();
        let _ = cell.set(Arc::new(Mutex::new(storage)));
        Self { config, cell }
    }

    /// Shared handle, opening the database on the first call
    ///
    /// A failed open leaves the cell empty so a later call can retry.
    pub fn get(&self) -> SqliteResult<Arc<Mutex<Storage>>> {
        self.cell
            .get_or_try_init(|| {
                tracing::info!("Opening catalog at {}", self.config.db_path);
                Storage::open_with_config(&self.config.db_path, self.config.clone())
                    .map(|storage| Arc::new(Mutex::new(storage)))
            })
            .map(Arc::clone)
    }

    /// Whether the database has been opened
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Configuration used to open the catalog
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}
