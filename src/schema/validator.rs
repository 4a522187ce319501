//! Document validator.
//!
//! Walks a candidate document against a resolved schema and collects
//! every violation in a single pass; there is no fail-fast, so one call
//! surfaces the complete defect list. Malformed documents are reported
//! as violations, never as errors. The only error path is a schema that
//! turns out to be internally inconsistent at validation time, which is
//! a load-time check gap.
//!
//! Validation is pure and deterministic: the same document against the
//! same schema always yields the same result.

use regex::Regex;
use serde_json::Value;
use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldKind, FieldMap, SchemaDefinition};

/// Unknown-field handling mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Unknown fields are violations
    #[default]
    Strict,
    /// Unknown fields pass through unchanged
    Lenient,
}

/// The rule a violation breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationRule {
    /// Required field absent
    RequiredField,
    /// Field not declared by the schema (strict mode)
    UnknownField,
    /// Value kind does not match the rule
    KindMismatch,
    /// Numeric value outside the permitted range
    Range,
    /// String does not match the pattern
    Pattern,
    /// String not in the permitted enumeration
    Enumeration,
}

impl ViolationRule {
    /// Returns the rule name for logs and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationRule::RequiredField => "required_field",
            ViolationRule::UnknownField => "unknown_field",
            ViolationRule::KindMismatch => "kind_mismatch",
            ViolationRule::Range => "range",
            ViolationRule::Pattern => "pattern",
            ViolationRule::Enumeration => "enumeration",
        }
    }
}

/// A single structural defect found during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted/bracketed field path, e.g. `address.lines[2]`
    pub path: String,
    /// Rule that was breached
    pub rule: ViolationRule,
    /// Human-readable description
    pub message: String,
}

impl Violation {
    fn new(path: impl Into<String>, rule: ViolationRule, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule,
            message: message.into(),
        }
    }

    fn missing(path: impl Into<String>) -> Self {
        Self::new(path, ViolationRule::RequiredField, "required field is missing")
    }

    fn unknown(path: impl Into<String>) -> Self {
        Self::new(path, ViolationRule::UnknownField, "field is not declared by the schema")
    }

    fn mismatch(path: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::new(
            path,
            ViolationRule::KindMismatch,
            format!("expected {}, got {}", expected, actual),
        )
    }
}

/// Outcome of one validation call.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Document satisfies the schema; carries the normalized document
    Accepted(Value),
    /// Document breaches the schema; carries the complete defect list
    Rejected(Vec<Violation>),
}

impl ValidationResult {
    /// Returns true for `Accepted`.
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted(_))
    }

    /// Returns the violations of a rejection, if any.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            ValidationResult::Accepted(_) => None,
            ValidationResult::Rejected(v) => Some(v),
        }
    }
}

/// Stateless document validator.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    strictness: Strictness,
}

impl Validator {
    /// Creates a validator with the given strictness mode.
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    /// Returns the configured strictness.
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Validates a document against a schema.
    ///
    /// # Errors
    ///
    /// Only `SchemaError::Malformed` when the schema contains an
    /// unresolved sub-schema reference or an uncompilable pattern, both
    /// of which the registry checks at load time.
    pub fn validate(
        &self,
        document: &Value,
        schema: &SchemaDefinition,
    ) -> SchemaResult<ValidationResult> {
        let mut violations = Vec::new();

        match document.as_object() {
            Some(obj) => {
                self.check_object(obj, &schema.fields, "", schema, &mut violations)?;
            }
            None => {
                violations.push(Violation::mismatch("$", "object", json_kind_name(document)));
            }
        }

        if violations.is_empty() {
            Ok(ValidationResult::Accepted(document.clone()))
        } else {
            Ok(ValidationResult::Rejected(violations))
        }
    }

    fn check_object(
        &self,
        obj: &serde_json::Map<String, Value>,
        fields: &FieldMap,
        prefix: &str,
        schema: &SchemaDefinition,
        out: &mut Vec<Violation>,
    ) -> SchemaResult<()> {
        if self.strictness == Strictness::Strict {
            for key in obj.keys() {
                if !fields.contains_key(key) {
                    out.push(Violation::unknown(make_path(prefix, key)));
                }
            }
        }

        for (name, def) in fields {
            let path = make_path(prefix, name);
            match obj.get(name) {
                Some(value) => {
                    self.check_value(value, &def.kind, &path, schema, out)?;
                }
                None => {
                    if def.required {
                        out.push(Violation::missing(path));
                    }
                }
            }
        }

        Ok(())
    }

    fn check_value(
        &self,
        value: &Value,
        kind: &FieldKind,
        path: &str,
        schema: &SchemaDefinition,
        out: &mut Vec<Violation>,
    ) -> SchemaResult<()> {
        match kind {
            FieldKind::String { pattern, one_of } => match value.as_str() {
                Some(s) => {
                    if let Some(p) = pattern {
                        let re = Regex::new(p).map_err(|e| {
                            SchemaError::malformed(
                                &schema.name,
                                schema.version,
                                format!("invalid pattern at '{}': {}", path, e),
                            )
                        })?;
                        if !re.is_match(s) {
                            out.push(Violation::new(
                                path,
                                ViolationRule::Pattern,
                                format!("value does not match pattern '{}'", p),
                            ));
                        }
                    }
                    if let Some(values) = one_of {
                        if !values.iter().any(|v| v == s) {
                            out.push(Violation::new(
                                path,
                                ViolationRule::Enumeration,
                                format!("value '{}' is not one of {:?}", s, values),
                            ));
                        }
                    }
                }
                None => out.push(Violation::mismatch(path, "string", json_kind_name(value))),
            },
            FieldKind::Int { minimum, maximum } => match value.as_i64() {
                Some(n) => {
                    if minimum.map_or(false, |lo| n < lo) || maximum.map_or(false, |hi| n > hi) {
                        out.push(Violation::new(
                            path,
                            ViolationRule::Range,
                            format!(
                                "value {} is outside [{}, {}]",
                                n,
                                minimum.map_or("-inf".into(), |v| v.to_string()),
                                maximum.map_or("+inf".into(), |v| v.to_string()),
                            ),
                        ));
                    }
                }
                // An integer above i64::MAX is still an integer; call it
                // out of range rather than "expected int, got int".
                None if value.as_u64().is_some() => out.push(Violation::new(
                    path,
                    ViolationRule::Range,
                    format!("value {} exceeds the representable int range", value),
                )),
                None => out.push(Violation::mismatch(path, "int", json_kind_name(value))),
            },
            FieldKind::Float { minimum, maximum } => match value.as_f64() {
                Some(n) => {
                    if minimum.map_or(false, |lo| n < lo) || maximum.map_or(false, |hi| n > hi) {
                        out.push(Violation::new(
                            path,
                            ViolationRule::Range,
                            format!(
                                "value {} is outside [{}, {}]",
                                n,
                                minimum.map_or("-inf".into(), |v| v.to_string()),
                                maximum.map_or("+inf".into(), |v| v.to_string()),
                            ),
                        ));
                    }
                }
                None => out.push(Violation::mismatch(path, "float", json_kind_name(value))),
            },
            FieldKind::Bool => {
                if !value.is_boolean() {
                    out.push(Violation::mismatch(path, "bool", json_kind_name(value)));
                }
            }
            FieldKind::Object { fields } => match value.as_object() {
                Some(obj) => {
                    self.check_object(obj, fields, path, schema, out)?;
                }
                None => out.push(Violation::mismatch(path, "object", json_kind_name(value))),
            },
            FieldKind::Array { element_type } => match value.as_array() {
                Some(items) => {
                    for (i, item) in items.iter().enumerate() {
                        let item_path = format!("{}[{}]", path, i);
                        self.check_value(item, element_type, &item_path, schema, out)?;
                    }
                }
                None => out.push(Violation::mismatch(path, "array", json_kind_name(value))),
            },
            FieldKind::Ref { name } => {
                // Refs are inlined at load time; meeting one here means a
                // definition escaped the registry's checks.
                return Err(SchemaError::malformed(
                    &schema.name,
                    schema.version,
                    format!("unresolved sub-schema reference '{}' at '{}'", name, path),
                ));
            }
        }
        Ok(())
    }
}

/// Returns the JSON value kind name for violation messages.
fn json_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
