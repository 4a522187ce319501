//! Schema subsystem: versioned structural contracts for documents.
//!
//! # Design principles
//!
//! - Definitions are immutable once published; a reload replaces the
//!   whole snapshot atomically or not at all
//! - Readers never observe a half-loaded registry
//! - Sub-schema composition is resolved at load time
//! - Validation collects every violation in one pass and never mutates
//!   the document
//! - Document defects are data; schema authoring defects are errors

mod errors;
mod registry;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorKind, SchemaResult};
pub use registry::{RegistrySnapshot, SchemaRegistry};
pub use types::{FieldDef, FieldKind, FieldMap, SchemaDefinition};
pub use validator::{Strictness, ValidationResult, Validator, Violation, ViolationRule};
