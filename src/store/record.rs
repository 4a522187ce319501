//! Persisted record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Persisted form of an accepted document plus provenance metadata.
///
/// Immutable after creation; a record only exists once the store has
/// acknowledged the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Assigned identifier
    pub id: String,
    /// Schema the document was validated against
    pub schema_name: String,
    /// Schema version the document was validated against
    pub schema_version: u32,
    /// Time the record was created for persistence
    pub persisted_at: DateTime<Utc>,
    /// The accepted document
    pub document: Value,
}

/// An accepted document awaiting identifier and timestamp assignment.
#[derive(Debug, Clone)]
pub struct RecordCandidate {
    /// Schema the document was validated against
    pub schema_name: String,
    /// Schema version the document was validated against
    pub schema_version: u32,
    /// The accepted document
    pub document: Value,
}

impl RecordCandidate {
    /// Create a candidate for an accepted document.
    pub fn new(schema_name: impl Into<String>, schema_version: u32, document: Value) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema_version,
            document,
        }
    }

    /// Assigns a fresh identifier and timestamp, producing the record
    /// to persist.
    pub fn into_record(self) -> StoreRecord {
        StoreRecord {
            id: Uuid::new_v4().to_string(),
            schema_name: self.schema_name,
            schema_version: self.schema_version,
            persisted_at: Utc::now(),
            document: self.document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_gets_unique_ids() {
        let a = RecordCandidate::new("user", 1, json!({"name": "A"})).into_record();
        let b = RecordCandidate::new("user", 1, json!({"name": "A"})).into_record();
        assert_ne!(a.id, b.id);
        assert_eq!(a.schema_name, "user");
        assert_eq!(a.schema_version, 1);
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = RecordCandidate::new("user", 2, json!({"name": "B"})).into_record();
        let text = serde_json::to_string(&record).unwrap();
        let back: StoreRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }
}
