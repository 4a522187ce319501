//! Ingestion coordinator.
//!
//! Orchestrates the request path: resolve schema, validate, persist.
//! Each request moves through
//! `Received -> SchemaResolved -> Validated -> Persisted | Rejected`.
//!
//! A rejection terminates before the store is touched, so no partial
//! writes exist. Persistence retries happen inside the gateway only;
//! schema resolution and validation are never repeated for one request.
//! A request cancelled before the store acknowledges never reports
//! success; a write that raced the cancellation is reconciled by the
//! store's identifier-based conflict semantics.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::observability::Logger;
use crate::schema::{
    SchemaError, SchemaRegistry, Strictness, ValidationResult, Validator, Violation,
};
use crate::store::{RecordCandidate, StoreClient, StoreError, StoreGateway, StoreRecord};

/// Terminal state of one ingestion request.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Document accepted and acknowledged by the store
    Persisted(StoreRecord),
    /// Document breached the schema; nothing was written
    Rejected(Vec<Violation>),
}

/// Infrastructure failure during ingestion. Validation defects are not
/// errors; they arrive as `IngestOutcome::Rejected`.
#[derive(Debug, Clone)]
pub enum IngestError {
    /// Schema resolution or consistency failure
    Schema(SchemaError),
    /// Store failure after the gateway's retry policy ran out
    Store(StoreError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Schema(e) => write!(f, "{}", e),
            IngestError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<SchemaError> for IngestError {
    fn from(e: SchemaError) -> Self {
        IngestError::Schema(e)
    }
}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        IngestError::Store(e)
    }
}

/// Coordinates schema resolution, validation, and persistence.
pub struct IngestCoordinator<C: StoreClient> {
    registry: Arc<SchemaRegistry>,
    validator: Validator,
    gateway: StoreGateway<C>,
}

impl<C: StoreClient> IngestCoordinator<C> {
    /// Creates a coordinator over a registry and a store gateway.
    pub fn new(registry: Arc<SchemaRegistry>, strictness: Strictness, gateway: StoreGateway<C>) -> Self {
        Self {
            registry,
            validator: Validator::new(strictness),
            gateway,
        }
    }

    /// Returns the schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Ingests one document against the named schema.
    ///
    /// The schema is resolved once, at ingestion time; a reload that
    /// lands mid-request does not change which definition this request
    /// validates against.
    pub async fn ingest(
        &self,
        document: Value,
        name: &str,
        version: Option<u32>,
    ) -> Result<IngestOutcome, IngestError> {
        let schema = self.registry.resolve(name, version)?;

        match self.validator.validate(&document, &schema)? {
            ValidationResult::Rejected(violations) => {
                Logger::info(
                    "INGEST_REJECTED",
                    &[
                        ("schema", &schema.name),
                        ("version", &schema.version.to_string()),
                        ("violations", &violations.len().to_string()),
                    ],
                );
                Ok(IngestOutcome::Rejected(violations))
            }
            ValidationResult::Accepted(document) => {
                let candidate = RecordCandidate::new(&schema.name, schema.version, document);
                let record = self.gateway.put(candidate).await?;
                Logger::info(
                    "INGEST_PERSISTED",
                    &[
                        ("id", &record.id),
                        ("schema", &record.schema_name),
                        ("version", &record.schema_version.to_string()),
                    ],
                );
                Ok(IngestOutcome::Persisted(record))
            }
        }
    }

    /// Replaces a persisted record's document by identifier.
    ///
    /// The replacement validates against the schema the record was
    /// originally accepted under, so an update can never move a record
    /// to a different contract. Rejection leaves the stored document
    /// untouched.
    pub async fn update(
        &self,
        id: &str,
        document: Value,
    ) -> Result<IngestOutcome, IngestError> {
        let existing = self.gateway.get(id).await?;
        let schema = self
            .registry
            .resolve(&existing.schema_name, Some(existing.schema_version))?;

        match self.validator.validate(&document, &schema)? {
            ValidationResult::Rejected(violations) => {
                Logger::info(
                    "INGEST_UPDATE_REJECTED",
                    &[
                        ("id", id),
                        ("schema", &schema.name),
                        ("version", &schema.version.to_string()),
                        ("violations", &violations.len().to_string()),
                    ],
                );
                Ok(IngestOutcome::Rejected(violations))
            }
            ValidationResult::Accepted(document) => {
                let record = StoreRecord {
                    id: existing.id,
                    schema_name: existing.schema_name,
                    schema_version: existing.schema_version,
                    persisted_at: Utc::now(),
                    document,
                };
                self.gateway.replace(&record).await?;
                Logger::info(
                    "INGEST_UPDATED",
                    &[("id", &record.id), ("schema", &record.schema_name)],
                );
                Ok(IngestOutcome::Persisted(record))
            }
        }
    }

    /// Deletes a persisted record by identifier.
    pub async fn delete(&self, id: &str) -> Result<(), IngestError> {
        self.gateway.delete(id).await?;
        Logger::info("INGEST_DELETED", &[("id", id)]);
        Ok(())
    }

    /// Fetches a persisted record by identifier.
    pub async fn fetch(&self, id: &str) -> Result<StoreRecord, IngestError> {
        Ok(self.gateway.get(id).await?)
    }

    /// Probes store reachability.
    pub async fn ping_store(&self) -> Result<(), IngestError> {
        Ok(self.gateway.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldMap, SchemaDefinition, SchemaErrorKind};
    use crate::store::{GatewayOptions, MemoryStore};
    use serde_json::json;

    fn coordinator() -> IngestCoordinator<MemoryStore> {
        let registry = Arc::new(SchemaRegistry::new());
        let mut fields = FieldMap::new();
        fields.insert("name".into(), FieldDef::required_string());
        fields.insert("age".into(), FieldDef::required_int());
        registry
            .register(SchemaDefinition::new("user", 1, fields))
            .unwrap();

        let gateway = StoreGateway::new(MemoryStore::new(), GatewayOptions::default());
        IngestCoordinator::new(registry, Strictness::Strict, gateway)
    }

    #[tokio::test]
    async fn test_accepted_document_persists() {
        let coordinator = coordinator();
        let outcome = coordinator
            .ingest(json!({"name": "A", "age": 30}), "user", None)
            .await
            .unwrap();

        match outcome {
            IngestOutcome::Persisted(record) => {
                assert_eq!(record.schema_name, "user");
                assert_eq!(record.schema_version, 1);
                let fetched = coordinator.fetch(&record.id).await.unwrap();
                assert_eq!(fetched, record);
            }
            other => panic!("expected persistence, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_document_never_reaches_store() {
        let coordinator = coordinator();
        let outcome = coordinator
            .ingest(json!({"name": "A"}), "user", None)
            .await
            .unwrap();

        match outcome {
            IngestOutcome::Rejected(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].path, "age");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(coordinator.gateway.client().is_empty());
    }

    #[tokio::test]
    async fn test_update_validates_against_original_schema() {
        let coordinator = coordinator();
        let record = match coordinator
            .ingest(json!({"name": "A", "age": 30}), "user", None)
            .await
            .unwrap()
        {
            IngestOutcome::Persisted(record) => record,
            other => panic!("expected persistence, got {:?}", other),
        };

        let updated = coordinator
            .update(&record.id, json!({"name": "B", "age": 31}))
            .await
            .unwrap();
        match updated {
            IngestOutcome::Persisted(updated) => {
                assert_eq!(updated.id, record.id);
                assert_eq!(updated.schema_version, 1);
                assert_eq!(updated.document, json!({"name": "B", "age": 31}));
            }
            other => panic!("expected persistence, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_record_untouched() {
        let coordinator = coordinator();
        let record = match coordinator
            .ingest(json!({"name": "A", "age": 30}), "user", None)
            .await
            .unwrap()
        {
            IngestOutcome::Persisted(record) => record,
            other => panic!("expected persistence, got {:?}", other),
        };

        let outcome = coordinator
            .update(&record.id, json!({"name": "B"}))
            .await
            .unwrap();
        assert!(matches!(outcome, IngestOutcome::Rejected(_)));

        let fetched = coordinator.fetch(&record.id).await.unwrap();
        assert_eq!(fetched.document, json!({"name": "A", "age": 30}));
    }

    #[tokio::test]
    async fn test_delete_then_fetch_is_not_found() {
        let coordinator = coordinator();
        let record = match coordinator
            .ingest(json!({"name": "A", "age": 30}), "user", None)
            .await
            .unwrap()
        {
            IngestOutcome::Persisted(record) => record,
            other => panic!("expected persistence, got {:?}", other),
        };

        coordinator.delete(&record.id).await.unwrap();
        assert!(coordinator.fetch(&record.id).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_schema_surfaces_verbatim() {
        let coordinator = coordinator();
        let err = coordinator
            .ingest(json!({}), "order", None)
            .await
            .unwrap_err();
        match err {
            IngestError::Schema(e) => assert_eq!(e.kind(), SchemaErrorKind::NotFound),
            other => panic!("expected schema error, got {:?}", other),
        }
    }
}
