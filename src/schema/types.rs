//! Schema type definitions
//!
//! Supported kinds:
//! - string: UTF-8 string
//! - number: integer or floating point
//! - boolean: true / false
//! - array: any sequence, whatever its entries look like
//! - object: any map that is not an array

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use crate::BoxError;

/// Primitive kinds a field can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ValueKind {
    /// Classifies a value. `null` has no kind.
    pub fn of(value: &Value) -> Option<ValueKind> {
        match value {
            Value::String(_) => Some(ValueKind::String),
            Value::Number(_) => Some(ValueKind::Number),
            Value::Bool(_) => Some(ValueKind::Boolean),
            Value::Array(_) => Some(ValueKind::Array),
            Value::Object(_) => Some(ValueKind::Object),
            Value::Null => None,
        }
    }

    /// Returns the kind name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Kind name of any value, including `null`
pub fn kind_name(value: &Value) -> &'static str {
    ValueKind::of(value).map_or("null", |kind| kind.type_name())
}

/// Side condition on a field value. `Err` means the check itself broke.
pub type Predicate = Arc<dyn Fn(&Value) -> Result<bool, BoxError> + Send + Sync>;

/// Validation contract for one semantic field.
///
/// Built once through [`FieldSchema::builder`] and immutable afterwards.
/// Share it between columns with an `Arc`.
pub struct FieldSchema {
    pub(super) kind: ValueKind,
    pub(super) required: bool,
    pub(super) predicates: Vec<Predicate>,
    pub(super) substitute: Option<Value>,
    pub(super) suppress_errors: bool,
}

impl FieldSchema {
    /// Starts a schema for values of `kind`
    pub fn builder(kind: ValueKind) -> FieldSchemaBuilder {
        FieldSchemaBuilder {
            schema: FieldSchema::of_kind(kind),
        }
    }

    /// Schema of `kind` with no predicates and no substitute
    pub fn of_kind(kind: ValueKind) -> Self {
        FieldSchema {
            kind,
            required: false,
            predicates: Vec::new(),
            substitute: None,
            suppress_errors: false,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn substitute(&self) -> Option<&Value> {
        self.substitute.as_ref()
    }

    pub fn suppresses_errors(&self) -> bool {
        self.suppress_errors
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("predicates", &self.predicates.len())
            .field("substitute", &self.substitute)
            .field("suppress_errors", &self.suppress_errors)
            .finish()
    }
}

/// Builder for [`FieldSchema`]
pub struct FieldSchemaBuilder {
    schema: FieldSchema,
}

impl FieldSchemaBuilder {
    /// Marks the field as one the caller must supply
    pub fn required(mut self, required: bool) -> Self {
        self.schema.required = required;
        self
    }

    /// Downgrades predicate errors to rejections
    pub fn suppress_errors(mut self, suppress: bool) -> Self {
        self.schema.suppress_errors = suppress;
        self
    }

    /// Default value for the field
    pub fn substitute(mut self, value: Value) -> Self {
        self.schema.substitute = Some(value);
        self
    }

    /// Appends a predicate. Predicates run in the order they were added.
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.schema.predicates.push(Arc::new(predicate));
        self
    }

    /// Appends a predicate that cannot fail
    pub fn check<F>(self, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.predicate(move |value| Ok(check(value)))
    }

    /// Finishes the schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ConstructionInvalid` if a non-null substitute
    /// is not acceptable under the schema's own rules, including when a
    /// predicate raises while checking it.
    pub fn build(self) -> SchemaResult<FieldSchema> {
        let schema = self.schema;

        if let Some(substitute) = schema.substitute.as_ref().filter(|v| !v.is_null()) {
            let invalid = || SchemaError::ConstructionInvalid {
                kind: schema.kind,
                value: substitute.to_string(),
            };
            match schema.acceptable(substitute) {
                Ok(true) => {}
                Ok(false) | Err(_) => return Err(invalid()),
            }
        }

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classifier_covers_every_kind() {
        assert_eq!(ValueKind::of(&json!("a")), Some(ValueKind::String));
        assert_eq!(ValueKind::of(&json!(2)), Some(ValueKind::Number));
        assert_eq!(ValueKind::of(&json!(0.5)), Some(ValueKind::Number));
        assert_eq!(ValueKind::of(&json!(true)), Some(ValueKind::Boolean));
        assert_eq!(ValueKind::of(&json!([2, 3, 4])), Some(ValueKind::Array));
        assert_eq!(ValueKind::of(&json!({"a": "b"})), Some(ValueKind::Object));
        assert_eq!(ValueKind::of(&Value::Null), None);
    }

    #[test]
    fn test_array_of_objects_is_array() {
        assert_eq!(ValueKind::of(&json!([{"a": 1}])), Some(ValueKind::Array));
        assert_eq!(kind_name(&json!([{"a": 1}])), "array");
        assert_eq!(kind_name(&Value::Null), "null");
    }

    #[test]
    fn test_kind_serde_names() {
        assert_eq!(serde_json::to_value(ValueKind::Boolean).unwrap(), json!("boolean"));
        let kind: ValueKind = serde_json::from_value(json!("array")).unwrap();
        assert_eq!(kind, ValueKind::Array);
    }

    #[test]
    fn test_builder_defaults() {
        let schema = FieldSchema::builder(ValueKind::Number).build().unwrap();
        assert_eq!(schema.kind(), ValueKind::Number);
        assert!(!schema.is_required());
        assert!(!schema.suppresses_errors());
        assert!(schema.substitute().is_none());
        assert_eq!(schema.predicate_count(), 0);
    }

    #[test]
    fn test_valid_substitute_is_kept() {
        let schema = FieldSchema::builder(ValueKind::String)
            .check(|v| v.as_str().map_or(false, |s| s.contains('s')))
            .substitute(json!("sub"))
            .build()
            .unwrap();
        assert_eq!(schema.substitute(), Some(&json!("sub")));
    }

    #[test]
    fn test_null_substitute_is_not_checked() {
        let schema = FieldSchema::builder(ValueKind::String)
            .substitute(Value::Null)
            .build();
        assert!(schema.is_ok());
    }

    #[test]
    fn test_substitute_with_wrong_kind_fails() {
        let result = FieldSchema::builder(ValueKind::String)
            .substitute(json!(12))
            .build();
        assert!(matches!(result, Err(SchemaError::ConstructionInvalid { .. })));
    }

    #[test]
    fn test_substitute_failing_predicate_fails_even_when_suppressed() {
        let result = FieldSchema::builder(ValueKind::String)
            .suppress_errors(true)
            .predicate(|_| Err("broken".into()))
            .substitute(json!("x"))
            .build();
        assert!(matches!(result, Err(SchemaError::ConstructionInvalid { .. })));
    }

    #[test]
    fn test_substitute_raising_predicate_is_construction_error() {
        let result = FieldSchema::builder(ValueKind::String)
            .predicate(|_| Err("broken".into()))
            .substitute(json!("x"))
            .build();
        let err = result.unwrap_err();
        assert_eq!(err.code(), "JSONDB_CONSTRUCTION_INVALID");
    }
}
