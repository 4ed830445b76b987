//! The in-memory authority over the four farm collections.
//!
//! Lifecycle: [`RecordStore::new`] -> [`RecordStore::initialize`] -> ready.
//! Each collection is persisted as one JSON array under its own key, rewritten
//! in full after every append.

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::farm_model::{Animal, Collection, FarmRecord, HealthRecord, ProductionRecord, User};
use crate::kv_store::KeyValueStore;
use crate::report::{self, ReportSummary};
use crate::validation;

/// Read-only view of the collections handed to renderers.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub users: &'a [User],
    pub animals: &'a [Animal],
    pub health_records: &'a [HealthRecord],
    pub production_records: &'a [ProductionRecord],
}

impl Snapshot<'_> {
    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Users => self.users.len(),
            Collection::Animals => self.animals.len(),
            Collection::HealthRecords => self.health_records.len(),
            Collection::ProductionRecords => self.production_records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Collection::ALL.into_iter().all(|c| self.len(c) == 0)
    }

    pub fn summary(&self) -> ReportSummary {
        report::summarize(self.animals, self.health_records, self.production_records)
    }
}

pub struct RecordStore<S: KeyValueStore> {
    adapter: S,
    users: Vec<User>,
    animals: Vec<Animal>,
    health_records: Vec<HealthRecord>,
    production_records: Vec<ProductionRecord>,
    ready: bool,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Creates an empty, not yet initialized store over `adapter`.
    pub fn new(adapter: S) -> Self {
        Self {
            adapter,
            users: Vec::new(),
            animals: Vec::new(),
            health_records: Vec::new(),
            production_records: Vec::new(),
            ready: false,
        }
    }

    /// Creates and initializes in one step.
    pub fn open(adapter: S) -> Self {
        let mut store = Self::new(adapter);
        store.initialize();
        store
    }

    /// Loads every collection from the adapter. Missing or undecodable blobs
    /// become empty collections. Only the first call has any effect.
    pub fn initialize(&mut self) {
        if self.ready {
            warn!("Record store already initialized, ignoring");
            return;
        }

        self.users = load_collection(&self.adapter, Collection::Users);
        self.animals = load_collection(&self.adapter, Collection::Animals);
        self.health_records = load_collection(&self.adapter, Collection::HealthRecords);
        self.production_records = load_collection(&self.adapter, Collection::ProductionRecords);
        self.ready = true;

        info!(
            "Record store ready: {} users, {} animals, {} health records, {} production records",
            self.users.len(),
            self.animals.len(),
            self.health_records.len(),
            self.production_records.len()
        );
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Appends an already validated record and persists its whole collection.
    ///
    /// If the write fails the record is taken back out of memory and the
    /// storage error is returned, so memory never runs ahead of storage.
    pub fn append(&mut self, record: FarmRecord) -> Result<(), AppResponse> {
        self.ensure_ready()?;

        let collection = record.collection();
        let result = match record {
            FarmRecord::User(user) => {
                push_and_persist(&self.adapter, &mut self.users, collection, user)
            }
            FarmRecord::Animal(animal) => {
                push_and_persist(&self.adapter, &mut self.animals, collection, animal)
            }
            FarmRecord::Health(health) => {
                push_and_persist(&self.adapter, &mut self.health_records, collection, health)
            }
            FarmRecord::Production(production) => {
                let records = &mut self.production_records;
                push_and_persist(&self.adapter, records, collection, production)
            }
        };

        if let Err(e) = &result {
            warn!("Append to '{collection}' rolled back: {e}");
        }
        result
    }

    /// Validates `record` and appends it when every field is acceptable.
    pub fn submit(&mut self, record: FarmRecord) -> Result<(), AppResponse> {
        validation::validate(&record).map_err(AppResponse::ValidationError)?;
        self.append(record)
    }

    /// Empties every collection, in memory and in storage.
    ///
    /// Memory is cleared even when storage could not be; the storage error is
    /// still returned.
    pub fn clear_all(&mut self) -> Result<(), AppResponse> {
        self.ensure_ready()?;

        self.users.clear();
        self.animals.clear();
        self.health_records.clear();
        self.production_records.clear();

        match self.adapter.clear_all() {
            Ok(()) => {
                info!("All collections cleared");
                Ok(())
            }
            Err(e) => {
                warn!("Collections cleared in memory but storage clear failed: {e}");
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            users: &self.users,
            animals: &self.animals,
            health_records: &self.health_records,
            production_records: &self.production_records,
        }
    }

    /// First user whose e-mail and password both match exactly.
    pub fn find_user(&self, email: &str, senha: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email && u.senha == senha)
    }

    pub fn summary(&self) -> ReportSummary {
        self.snapshot().summary()
    }

    pub fn adapter(&self) -> &S {
        &self.adapter
    }

    fn ensure_ready(&self) -> Result<(), AppResponse> {
        if self.ready {
            Ok(())
        } else {
            Err(AppResponse::BadRequest("Record store has not been initialized".to_string()))
        }
    }
}

fn load_collection<S: KeyValueStore, T: DeserializeOwned>(
    adapter: &S,
    collection: Collection,
) -> Vec<T> {
    let Some(blob) = adapter.load(collection.key()) else {
        return Vec::new();
    };

    match serde_json::from_str(&blob) {
        Ok(records) => records,
        Err(e) => {
            warn!("Stored '{collection}' could not be decoded, starting empty: {e}");
            Vec::new()
        }
    }
}

fn push_and_persist<S: KeyValueStore, T: Serialize>(
    adapter: &S,
    records: &mut Vec<T>,
    collection: Collection,
    record: T,
) -> Result<(), AppResponse> {
    records.push(record);

    let persisted = serde_json::to_string(&*records)
        .map_err(AppResponse::from)
        .and_then(|json| adapter.save(collection.key(), &json));

    if persisted.is_err() {
        records.pop();
    }
    persisted
}
