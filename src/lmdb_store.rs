//! LMDB-backed persistence adapter.
//!
//! One LMDB environment per store directory, one named database inside it,
//! one entry per collection key. Every write runs in its own read-write
//! transaction; there is no transaction spanning several keys.

use std::fs;
use std::path::PathBuf;

use lmdb::{Database, DatabaseFlags, Environment, Error as LmdbError, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::kv_store::KeyValueStore;
use crate::store_config::{StoreConfig, RECORDS_DB_NAME};

pub struct LmdbStore {
    env: Environment,
    db: Database,
    path: PathBuf,
}

impl LmdbStore {
    /// Opens (creating if needed) the environment described by `config`.
    pub fn init(config: &StoreConfig) -> Result<Self, AppResponse> {
        let path = config.db_path();

        if let Err(e) = fs::create_dir_all(&path) {
            warn!("Could not create store directory {}: {e}", path.display());
            return Err(AppResponse::DatabaseError(format!(
                "Could not create directory {}: {e}",
                path.display()
            )));
        }

        let env = Environment::new()
            .set_map_size(config.map_size)
            .set_max_dbs(config.max_dbs)
            .open(&path)?;

        let db = env.create_db(Some(RECORDS_DB_NAME), DatabaseFlags::empty())?;

        info!("LMDB store opened at {}", path.display());

        Ok(Self { env, db, path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let txn = self.env.begin_ro_txn()?;

        let value = match txn.get(self.db, &key) {
            Ok(bytes) => Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                AppResponse::SerializationError(format!("Blob under '{key}' is not UTF-8: {e}"))
            })?),
            Err(LmdbError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        txn.commit()?;
        Ok(value)
    }

    /// Flushes buffers to disk. Called before the handle is released.
    pub fn close(&self) -> Result<(), AppResponse> {
        self.env.sync(true)?;
        info!("LMDB store at {} synced and closed", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for LmdbStore {
    fn load(&self, key: &str) -> Option<String> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Reading '{key}' failed, treating as absent: {e}");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;

        debug!("Saved {} bytes under '{key}'", value.len());
        Ok(())
    }

    fn clear_all(&self) -> Result<(), AppResponse> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.clear_db(self.db)?;
        txn.commit()?;

        info!("All keys cleared from {}", self.path.display());
        Ok(())
    }
}
