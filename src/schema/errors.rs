//! Schema error types.
//!
//! Three failure classes:
//! - Load: a schema file is malformed or duplicated; fatal to that load
//!   attempt, the previous snapshot keeps serving.
//! - NotFound: unknown type or version; user-correctable, surfaced
//!   verbatim.
//! - Malformed: the schema itself is inconsistent at validation time.
//!   This should have been caught at load time and is fatal to the
//!   request.
//!
//! Document defects are never errors; they are carried as violations in
//! a `ValidationResult`.

use std::fmt;

/// Schema error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Schema file failed to load (parse failure, structural defect,
    /// duplicate identity)
    Load,
    /// Requested type or version is not registered
    NotFound,
    /// Published schema is internally inconsistent (load-time check gap)
    Malformed,
}

impl SchemaErrorKind {
    /// Returns the kind name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaErrorKind::Load => "LOAD",
            SchemaErrorKind::NotFound => "NOT_FOUND",
            SchemaErrorKind::Malformed => "MALFORMED",
        }
    }
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schema error with context.
#[derive(Debug, Clone)]
pub struct SchemaError {
    kind: SchemaErrorKind,
    message: String,
    schema_name: Option<String>,
    schema_version: Option<u32>,
}

impl SchemaError {
    /// Create a load failure for a schema file.
    pub fn load_failed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: SchemaErrorKind::Load,
            message: format!("failed to load schema '{}': {}", source.into(), reason.into()),
            schema_name: None,
            schema_version: None,
        }
    }

    /// Create a duplicate identity load failure.
    pub fn duplicate(name: impl Into<String>, version: u32) -> Self {
        let name = name.into();
        Self {
            kind: SchemaErrorKind::Load,
            message: format!("duplicate schema '{}' version {}", name, version),
            schema_name: Some(name),
            schema_version: Some(version),
        }
    }

    /// Create an unknown type error.
    pub fn not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: SchemaErrorKind::NotFound,
            message: format!("schema '{}' not found", name),
            schema_name: Some(name),
            schema_version: None,
        }
    }

    /// Create an unknown version error.
    pub fn version_not_found(name: impl Into<String>, version: u32) -> Self {
        let name = name.into();
        Self {
            kind: SchemaErrorKind::NotFound,
            message: format!("schema '{}' version {} not found", name, version),
            schema_name: Some(name),
            schema_version: Some(version),
        }
    }

    /// Create a malformed-schema error for an inconsistency detected
    /// after publication.
    pub fn malformed(name: impl Into<String>, version: u32, reason: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: SchemaErrorKind::Malformed,
            message: format!(
                "schema '{}' version {} is inconsistent: {}",
                name,
                version,
                reason.into()
            ),
            schema_name: Some(name),
            schema_version: Some(version),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SchemaErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the schema name if known.
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    /// Returns the schema version if known.
    pub fn schema_version(&self) -> Option<u32> {
        self.schema_version
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(SchemaError::load_failed("a.json", "bad").kind(), SchemaErrorKind::Load);
        assert_eq!(SchemaError::duplicate("user", 1).kind(), SchemaErrorKind::Load);
        assert_eq!(SchemaError::not_found("user").kind(), SchemaErrorKind::NotFound);
        assert_eq!(
            SchemaError::version_not_found("user", 9).kind(),
            SchemaErrorKind::NotFound
        );
        assert_eq!(
            SchemaError::malformed("user", 1, "unresolved ref").kind(),
            SchemaErrorKind::Malformed
        );
    }

    #[test]
    fn test_display_carries_context() {
        let err = SchemaError::version_not_found("user", 3);
        let text = format!("{}", err);
        assert!(text.contains("NOT_FOUND"));
        assert!(text.contains("user"));
        assert!(text.contains('3'));
    }
}
