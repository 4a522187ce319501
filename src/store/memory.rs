//! In-process store client.
//!
//! Backs embedded deployments and tests. Insert uses optimistic
//! semantics: a duplicate identifier is a conflict, not an overwrite.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::errors::{StoreError, StoreResult};
use super::record::StoreRecord;
use super::StoreClient;

/// In-memory document store keyed by record identifier.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, StoreRecord>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of persisted records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true when no records are persisted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether an identifier is present.
    pub fn contains(&self, id: &str) -> bool {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }
}

impl StoreClient for MemoryStore {
    async fn insert(&self, record: &StoreRecord) -> StoreResult<()> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        if records.contains_key(&record.id) {
            return Err(StoreError::conflict(format!(
                "record '{}' already exists",
                record.id
            )));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn fetch(&self, id: &str) -> StoreResult<StoreRecord> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn replace(&self, record: &StoreRecord) -> StoreResult<()> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StoreError::not_found(&record.id)),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        match records.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(id)),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
