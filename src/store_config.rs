//! Configuration for the on-device LMDB environment.

use std::path::PathBuf;

/// Default LMDB map size: 10 MiB is plenty for a single farm's records.
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

/// Named databases inside the environment (only one is used today).
pub const DEFAULT_MAX_DBS: u32 = 4;

/// Name of the LMDB database that holds the collection blobs.
pub const RECORDS_DB_NAME: &str = "farm_records";

/// Settings used by [`crate::lmdb_store::LmdbStore::init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base name (or path prefix) of the store; the environment lives in `"{name}.lmdb"`.
    pub name: String,
    pub map_size: usize,
    pub max_dbs: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "agro_records".to_string(),
            map_size: DEFAULT_MAP_SIZE,
            max_dbs: DEFAULT_MAX_DBS,
        }
    }
}

impl StoreConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    /// Directory holding the LMDB data and lock files.
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.lmdb", self.name))
    }
}
