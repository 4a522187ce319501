//! Store error types.
//!
//! Failure policy:
//! - Unavailable is the only transient kind; the gateway retries it
//!   within an explicit budget and then surfaces it.
//! - Conflict is never retried; an identifier collision will not heal.
//! - NotFound and PoolExhausted are surfaced immediately.

use std::fmt;

/// Store error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Connectivity loss or store outage (transient, retried)
    Unavailable,
    /// Identifier collision under optimistic-insert semantics
    Conflict,
    /// Lookup miss
    NotFound,
    /// Connection pool exhausted in fail-fast mode
    PoolExhausted,
}

impl StoreErrorKind {
    /// Returns the kind name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::Unavailable => "UNAVAILABLE",
            StoreErrorKind::Conflict => "CONFLICT",
            StoreErrorKind::NotFound => "NOT_FOUND",
            StoreErrorKind::PoolExhausted => "POOL_EXHAUSTED",
        }
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Store error with context.
#[derive(Debug, Clone)]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    /// Create a new store error.
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Conflict, message)
    }

    /// Create a not-found error for an identifier.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::new(
            StoreErrorKind::NotFound,
            format!("record '{}' not found", id.into()),
        )
    }

    /// Create a pool-exhausted error.
    pub fn pool_exhausted(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::PoolExhausted, message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true when the gateway may retry this failure.
    pub fn is_transient(&self) -> bool {
        self.kind == StoreErrorKind::Unavailable
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
