//! Observability subsystem.
//!
//! Structured JSON logging with explicit severity levels and
//! deterministic output. Observability is read-only: logging never
//! affects the ingestion path.

mod logger;

pub use logger::{Logger, Severity};
