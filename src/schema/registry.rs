//! Schema registry with atomic snapshot replacement.
//!
//! Schema files live in an operator-mounted directory, one JSON file per
//! (name, version) pair. A load parses the whole directory into a fresh
//! snapshot and swaps it in atomically: either every definition in the
//! directory replaces the current snapshot, or none does. Readers clone
//! an `Arc` to the current snapshot and never block on a load in
//! progress.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use super::errors::{SchemaError, SchemaResult};
use super::types::SchemaDefinition;
use crate::observability::Logger;

/// One immutable, fully-consistent registry state.
#[derive(Debug, Default, Clone)]
pub struct RegistrySnapshot {
    /// Definitions indexed by (name, version)
    schemas: BTreeMap<(String, u32), Arc<SchemaDefinition>>,
    /// Highest registered version per name
    latest: BTreeMap<String, u32>,
}

impl RegistrySnapshot {
    /// Gets a definition by name and exact version.
    pub fn get(&self, name: &str, version: u32) -> Option<Arc<SchemaDefinition>> {
        self.schemas.get(&(name.to_string(), version)).cloned()
    }

    /// Returns the highest registered version for a name.
    pub fn latest_version(&self, name: &str) -> Option<u32> {
        self.latest.get(name).copied()
    }

    /// Checks whether any version of a name is registered.
    pub fn contains_name(&self, name: &str) -> bool {
        self.latest.contains_key(name)
    }

    /// Returns every registered (name, version) pair in order.
    pub fn catalog(&self) -> impl Iterator<Item = (&str, u32)> {
        self.schemas.keys().map(|(name, version)| (name.as_str(), *version))
    }

    /// Returns the number of registered definitions.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true when no definitions are registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn insert(&mut self, schema: SchemaDefinition) -> SchemaResult<()> {
        let key = (schema.name.clone(), schema.version);
        if self.schemas.contains_key(&key) {
            return Err(SchemaError::duplicate(&schema.name, schema.version));
        }
        let entry = self.latest.entry(schema.name.clone()).or_insert(schema.version);
        if schema.version > *entry {
            *entry = schema.version;
        }
        self.schemas.insert(key, Arc::new(schema));
        Ok(())
    }
}

/// Registry mapping (name, version) to immutable schema definitions.
///
/// `resolve` is lock-free beyond a short read of the snapshot pointer;
/// `load` is serialized by a dedicated writer lock and builds the next
/// snapshot completely before publishing it.
pub struct SchemaRegistry {
    snapshot: RwLock<Arc<RegistrySnapshot>>,
    load_lock: Mutex<()>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(RegistrySnapshot::default())),
            load_lock: Mutex::new(()),
        }
    }

    /// Loads every `*.json` schema file from `dir` and atomically
    /// replaces the current snapshot.
    ///
    /// On any parse failure, structural defect, unresolved reference, or
    /// duplicate (name, version), the whole load is discarded and the
    /// previous snapshot keeps serving.
    ///
    /// Returns the number of definitions published.
    pub fn load(&self, dir: &Path) -> SchemaResult<usize> {
        let _writer = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());

        let next = Self::build_snapshot(dir)?;
        let count = next.len();

        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(next);

        Logger::info(
            "SCHEMA_LOAD",
            &[
                ("dir", &dir.display().to_string()),
                ("schemas", &count.to_string()),
            ],
        );
        Ok(count)
    }

    fn build_snapshot(dir: &Path) -> SchemaResult<RegistrySnapshot> {
        if !dir.is_dir() {
            return Err(SchemaError::load_failed(
                dir.display().to_string(),
                "schema directory does not exist",
            ));
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::load_failed(dir.display().to_string(), format!("read failed: {}", e))
        })?;

        let mut snapshot = RegistrySnapshot::default();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::load_failed(dir.display().to_string(), format!("read failed: {}", e))
            })?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            snapshot.insert(Self::parse_schema_file(&path)?)?;
        }
        Ok(snapshot)
    }

    fn parse_schema_file(path: &Path) -> SchemaResult<SchemaDefinition> {
        let source = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::load_failed(&source, format!("read failed: {}", e)))?;

        let schema: SchemaDefinition = serde_json::from_str(&content)
            .map_err(|e| SchemaError::load_failed(&source, format!("invalid JSON: {}", e)))?;

        schema
            .check_structure()
            .map_err(|e| SchemaError::load_failed(&source, e))?;

        schema
            .resolve_refs()
            .map_err(|e| SchemaError::load_failed(&source, e))
    }

    /// Registers a definition directly, bypassing the filesystem. Used
    /// by tests and programmatic setup. Follows the same all-or-nothing
    /// rule: the new snapshot is built fully before being published.
    pub fn register(&self, schema: SchemaDefinition) -> SchemaResult<()> {
        let _writer = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());

        schema
            .check_structure()
            .map_err(|e| SchemaError::load_failed("<in-memory>", e))?;
        let schema = schema
            .resolve_refs()
            .map_err(|e| SchemaError::load_failed("<in-memory>", e))?;

        let mut next = (*self.snapshot()).clone();
        next.insert(schema)?;

        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(next);
        Ok(())
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Resolves a logical type to a concrete definition.
    ///
    /// With a version, only the exact (name, version) match is returned.
    /// Without one, the highest registered version for the name wins.
    pub fn resolve(
        &self,
        name: &str,
        version: Option<u32>,
    ) -> SchemaResult<Arc<SchemaDefinition>> {
        let snapshot = self.snapshot();
        match version {
            Some(v) => snapshot.get(name, v).ok_or_else(|| {
                if snapshot.contains_name(name) {
                    SchemaError::version_not_found(name, v)
                } else {
                    SchemaError::not_found(name)
                }
            }),
            None => {
                let latest = snapshot
                    .latest_version(name)
                    .ok_or_else(|| SchemaError::not_found(name))?;
                snapshot
                    .get(name, latest)
                    .ok_or_else(|| SchemaError::not_found(name))
            }
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
