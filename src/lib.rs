//! docgate - schema-governed document validation and persistence engine
//!
//! Loads versioned schema definitions from an operator-mounted
//! directory, validates inbound documents against the resolved schema,
//! and persists accepted documents to a document store with traceable
//! provenance.

pub mod cli;
pub mod config;
pub mod http_server;
pub mod ingest;
pub mod observability;
pub mod schema;
pub mod store;
