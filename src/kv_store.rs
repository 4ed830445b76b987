//! Persistence adapter contract.
//!
//! The record store only ever talks to storage through [`KeyValueStore`]: whole
//! text blobs addressed by a string key. Reads are best effort and never fail
//! the caller; writes report failure so the caller can react.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;

use crate::app_response::AppResponse;

/// Opaque key-value persistence used by [`crate::record_store::RecordStore`].
pub trait KeyValueStore {
    /// Returns the blob stored under `key`, or `None` if it was never written
    /// or the underlying storage could not be read.
    fn load(&self, key: &str) -> Option<String>;

    /// Overwrites the blob stored under `key`.
    fn save(&self, key: &str, value: &str) -> Result<(), AppResponse>;

    /// Erases every key written through this adapter.
    fn clear_all(&self) -> Result<(), AppResponse>;
}

/// Volatile adapter keeping blobs in memory.
///
/// Clones share the same entries, so a clone handed to a second
/// [`crate::record_store::RecordStore`] behaves like the same device storage
/// after a restart. Writes can be switched to fail for exercising error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` and `clear_all` fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Writes a raw blob, bypassing the failure switch. Useful to seed corrupt data.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        if self.fail_writes.get() {
            warn!("Memory store rejected write for key '{key}'");
            return Err(AppResponse::DatabaseError(format!("Could not save '{key}'")));
        }
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear_all(&self) -> Result<(), AppResponse> {
        if self.fail_writes.get() {
            warn!("Memory store rejected clear");
            return Err(AppResponse::DatabaseError("Could not clear storage".to_string()));
        }
        self.entries.borrow_mut().clear();
        Ok(())
    }
}
