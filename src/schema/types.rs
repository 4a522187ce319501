//! Schema definition types.
//!
//! A schema is a versioned structural contract a document must satisfy.
//! Supported field kinds:
//! - string: UTF-8 string, optionally constrained by a pattern or enumeration
//! - int: 64-bit signed integer with optional range bounds
//! - float: 64-bit floating point with optional range bounds
//! - bool: Boolean
//! - object: nested object with its own field schema
//! - array: homogeneous array with an element kind
//! - ref: named sub-schema composition, inlined at load time

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field map keyed by field name. Ordered so that validation walks
/// fields deterministically.
pub type FieldMap = BTreeMap<String, FieldDef>;

/// Supported field kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// UTF-8 string
    String {
        /// Regular expression the value must match
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        /// Closed set of permitted values
        #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
        one_of: Option<Vec<String>>,
    },
    /// 64-bit signed integer
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    /// 64-bit floating point (integer values are accepted)
    Float {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// Boolean
    Bool,
    /// Nested object with its own field schema
    Object {
        /// Nested field definitions
        fields: FieldMap,
    },
    /// Homogeneous array with a single element kind
    Array {
        /// Element kind (boxed to allow recursive kinds)
        #[serde(rename = "element_type")]
        element_type: Box<FieldKind>,
    },
    /// Reference to a named sub-schema in the definition's `definitions`
    /// table. Inlined during load; never present in a published schema.
    Ref {
        /// Name of the referenced sub-schema
        name: String,
    },
}

impl FieldKind {
    /// Returns the kind name for violation messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::String { .. } => "string",
            FieldKind::Int { .. } => "int",
            FieldKind::Float { .. } => "float",
            FieldKind::Bool => "bool",
            FieldKind::Object { .. } => "object",
            FieldKind::Array { .. } => "array",
            FieldKind::Ref { .. } => "ref",
        }
    }

    /// Plain string kind with no constraints.
    pub fn string() -> Self {
        FieldKind::String {
            pattern: None,
            one_of: None,
        }
    }

    /// Plain int kind with no bounds.
    pub fn int() -> Self {
        FieldKind::Int {
            minimum: None,
            maximum: None,
        }
    }

    /// Plain float kind with no bounds.
    pub fn float() -> Self {
        FieldKind::Float {
            minimum: None,
            maximum: None,
        }
    }
}

/// A single field rule: kind plus required/optional marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field kind and constraints
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Whether the field must be present
    pub required: bool,
}

impl FieldDef {
    /// Create a field definition.
    pub fn new(kind: FieldKind, required: bool) -> Self {
        Self { kind, required }
    }

    /// Create a required string field.
    pub fn required_string() -> Self {
        Self::new(FieldKind::string(), true)
    }

    /// Create an optional string field.
    pub fn optional_string() -> Self {
        Self::new(FieldKind::string(), false)
    }

    /// Create a required int field.
    pub fn required_int() -> Self {
        Self::new(FieldKind::int(), true)
    }

    /// Create an optional int field.
    pub fn optional_int() -> Self {
        Self::new(FieldKind::int(), false)
    }

    /// Create a required bool field.
    pub fn required_bool() -> Self {
        Self::new(FieldKind::Bool, true)
    }

    /// Create a required float field.
    pub fn required_float() -> Self {
        Self::new(FieldKind::float(), true)
    }

    /// Create a required object field.
    pub fn required_object(fields: FieldMap) -> Self {
        Self::new(FieldKind::Object { fields }, true)
    }

    /// Create an optional object field.
    pub fn optional_object(fields: FieldMap) -> Self {
        Self::new(FieldKind::Object { fields }, false)
    }

    /// Create a required array field.
    pub fn required_array(element_type: FieldKind) -> Self {
        Self::new(
            FieldKind::Array {
                element_type: Box::new(element_type),
            },
            true,
        )
    }

    /// Create a required reference to a named sub-schema.
    pub fn required_ref(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Ref { name: name.into() }, true)
    }
}

/// Complete schema definition for one (name, version) pair.
///
/// Immutable once published by the registry; a reload replaces the whole
/// snapshot, never an individual definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Logical document type name
    pub name: String,
    /// Monotonic version, starting at 1
    pub version: u32,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Top-level field definitions
    pub fields: FieldMap,
    /// Named sub-schemas referenced via `ref` kinds. Emptied once the
    /// references have been inlined.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, FieldMap>,
}

impl SchemaDefinition {
    /// Create a new schema definition.
    pub fn new(name: impl Into<String>, version: u32, fields: FieldMap) -> Self {
        Self {
            name: name.into(),
            version,
            description: None,
            fields,
            definitions: BTreeMap::new(),
        }
    }

    /// Returns the registry key for this definition.
    pub fn key(&self) -> (&str, u32) {
        (&self.name, self.version)
    }

    /// Checks that the definition is self-consistent: name and version
    /// are sensible, constraints are well-formed, and every sub-schema
    /// reference points at an existing definition.
    ///
    /// Any breach here is a load failure, never a validation result.
    pub fn check_structure(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("schema name must not be empty".into());
        }
        if self.version == 0 {
            return Err("schema version must be >= 1".into());
        }

        for (name, def) in &self.fields {
            check_kind(&def.kind, name, &self.definitions)?;
        }
        for (sub_name, sub_fields) in &self.definitions {
            for (name, def) in sub_fields {
                check_kind(
                    &def.kind,
                    &format!("{}.{}", sub_name, name),
                    &self.definitions,
                )?;
            }
        }

        Ok(())
    }

    /// Inlines every `ref` kind by substituting the referenced
    /// sub-schema as a nested object, recursively. Cyclic references
    /// are rejected.
    ///
    /// After this returns, the definition contains no `ref` kinds and
    /// `definitions` is empty.
    pub fn resolve_refs(mut self) -> Result<Self, String> {
        let definitions = std::mem::take(&mut self.definitions);
        let mut stack = Vec::new();
        for def in self.fields.values_mut() {
            inline_kind(&mut def.kind, &definitions, &mut stack)?;
        }
        Ok(self)
    }
}

fn check_kind(
    kind: &FieldKind,
    path: &str,
    definitions: &BTreeMap<String, FieldMap>,
) -> Result<(), String> {
    match kind {
        FieldKind::String { pattern, one_of } => {
            if let Some(p) = pattern {
                Regex::new(p).map_err(|e| format!("field '{}': invalid pattern: {}", path, e))?;
            }
            if let Some(values) = one_of {
                if values.is_empty() {
                    return Err(format!("field '{}': enumeration must not be empty", path));
                }
            }
        }
        FieldKind::Int { minimum, maximum } => {
            if let (Some(lo), Some(hi)) = (minimum, maximum) {
                if lo > hi {
                    return Err(format!("field '{}': minimum exceeds maximum", path));
                }
            }
        }
        FieldKind::Float { minimum, maximum } => {
            if let (Some(lo), Some(hi)) = (minimum, maximum) {
                if lo > hi {
                    return Err(format!("field '{}': minimum exceeds maximum", path));
                }
            }
        }
        FieldKind::Bool => {}
        FieldKind::Object { fields } => {
            for (name, def) in fields {
                check_kind(&def.kind, &format!("{}.{}", path, name), definitions)?;
            }
        }
        FieldKind::Array { element_type } => {
            check_kind(element_type, path, definitions)?;
        }
        FieldKind::Ref { name } => {
            if !definitions.contains_key(name) {
                return Err(format!(
                    "field '{}': unknown sub-schema reference '{}'",
                    path, name
                ));
            }
        }
    }
    Ok(())
}

fn inline_kind(
    kind: &mut FieldKind,
    definitions: &BTreeMap<String, FieldMap>,
    stack: &mut Vec<String>,
) -> Result<(), String> {
    match kind {
        FieldKind::Object { fields } => {
            for def in fields.values_mut() {
                inline_kind(&mut def.kind, definitions, stack)?;
            }
            Ok(())
        }
        FieldKind::Array { element_type } => inline_kind(element_type, definitions, stack),
        FieldKind::Ref { name } => {
            if stack.contains(name) {
                return Err(format!("cyclic sub-schema reference '{}'", name));
            }
            let mut fields = definitions
                .get(name)
                .ok_or_else(|| format!("unknown sub-schema reference '{}'", name))?
                .clone();
            stack.push(name.clone());
            for def in fields.values_mut() {
                inline_kind(&mut def.kind, definitions, stack)?;
            }
            stack.pop();
            *kind = FieldKind::Object { fields };
            Ok(())
        }
        _ => Ok(()),
    }
}
