//! Acceptance check for field values
//!
//! Validation semantics:
//! - Kind must match exactly; arrays never pass as objects
//! - Predicates run in declared order and stop at the first `false`
//! - A raising predicate propagates unless the schema suppresses errors
//!
//! The check never mutates the value and is deterministic as long as the
//! predicates are.

use serde_json::Value;
use tracing::warn;

use super::errors::{Rejection, SchemaError, SchemaResult};
use super::types::{kind_name, FieldSchema, ValueKind};

/// Outcome of checking a value against a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

impl FieldSchema {
    /// Returns true if the value has the schema's kind and passes every predicate.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::PredicateFailure` if a predicate raises and the
    /// schema does not suppress errors.
    pub fn acceptable(&self, value: &Value) -> SchemaResult<bool> {
        self.evaluate(value).map(|verdict| verdict.is_accepted())
    }

    /// Like [`FieldSchema::acceptable`], but reports why a value was rejected.
    pub fn evaluate(&self, value: &Value) -> SchemaResult<Verdict> {
        if let Some(rejection) = self.shape_rejection(value) {
            return Ok(Verdict::Rejected(rejection));
        }

        for (index, predicate) in self.predicates.iter().enumerate() {
            match predicate(value) {
                Ok(true) => continue,
                Ok(false) => return Ok(Verdict::Rejected(Rejection::Predicate { index })),
                Err(e) => {
                    if !self.suppress_errors {
                        return Err(SchemaError::PredicateFailure {
                            index,
                            message: e.to_string(),
                        });
                    }
                    warn!(
                        event = "SCHEMA_PREDICATE_FAILED",
                        index,
                        kind = %self.kind,
                        error = %e,
                        "predicate raised, value rejected"
                    );
                    return Ok(Verdict::Rejected(Rejection::Predicate { index }));
                }
            }
        }

        Ok(Verdict::Accepted)
    }

    fn shape_rejection(&self, value: &Value) -> Option<Rejection> {
        let matches = match self.kind {
            ValueKind::Array => value.is_array(),
            // an array must never be recognized as an object
            kind => ValueKind::of(value) == Some(kind) && !value.is_array(),
        };

        if matches {
            None
        } else {
            Some(Rejection::Shape {
                expected: self.kind,
                actual: kind_name(value),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn samples() -> Vec<Value> {
        vec![
            json!("text"),
            json!(7),
            json!(1.5),
            json!(false),
            json!([1, 2]),
            json!({"k": "v"}),
            Value::Null,
        ]
    }

    #[test]
    fn test_shape_enforced_for_every_scalar_kind() {
        for kind in [
            ValueKind::String,
            ValueKind::Number,
            ValueKind::Boolean,
            ValueKind::Object,
        ] {
            let schema = FieldSchema::of_kind(kind);
            for value in samples() {
                let expected = ValueKind::of(&value) == Some(kind);
                assert_eq!(
                    schema.acceptable(&value).unwrap(),
                    expected,
                    "kind {} value {}",
                    kind,
                    value
                );
            }
        }
    }

    #[test]
    fn test_array_schema_accepts_only_arrays() {
        let schema = FieldSchema::of_kind(ValueKind::Array);
        assert!(schema.acceptable(&json!([])).unwrap());
        assert!(schema.acceptable(&json!([{"a": 1}, "x"])).unwrap());
        assert!(!schema.acceptable(&json!({"0": "a"})).unwrap());
        assert!(!schema.acceptable(&json!("[]")).unwrap());
    }

    #[test]
    fn test_object_schema_rejects_array_of_maps() {
        let schema = FieldSchema::of_kind(ValueKind::Object);
        let verdict = schema.evaluate(&json!([{"a": 1}])).unwrap();
        assert_eq!(
            verdict,
            Verdict::Rejected(Rejection::Shape {
                expected: ValueKind::Object,
                actual: "array",
            })
        );
    }

    #[test]
    fn test_predicates_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let schema = FieldSchema::builder(ValueKind::String)
            .check(|_| false)
            .check(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .build()
            .unwrap();

        let verdict = schema.evaluate(&json!("anything")).unwrap();
        assert_eq!(verdict, Verdict::Rejected(Rejection::Predicate { index: 0 }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_predicates_not_run_on_shape_mismatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let schema = FieldSchema::builder(ValueKind::Number)
            .check(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .build()
            .unwrap();

        assert!(!schema.acceptable(&json!("12")).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_predicates_pass() {
        let schema = FieldSchema::builder(ValueKind::String)
            .check(|v| v.as_str().map_or(false, |s| s.contains('s')))
            .check(|v| v.as_str().map_or(false, |s| s.contains('T')))
            .build()
            .unwrap();

        assert!(schema.acceptable(&json!("sT")).unwrap());
        assert!(!schema.acceptable(&json!("s")).unwrap());
    }

    #[test]
    fn test_raising_predicate_propagates_when_not_suppressed() {
        let schema = FieldSchema::builder(ValueKind::Number)
            .predicate(|_| Err("divide by zero".into()))
            .build()
            .unwrap();

        let err = schema.acceptable(&json!(1)).unwrap_err();
        match err {
            SchemaError::PredicateFailure { index, message } => {
                assert_eq!(index, 0);
                assert!(message.contains("divide by zero"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_raising_predicate_rejects_when_suppressed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let schema = FieldSchema::builder(ValueKind::Number)
            .suppress_errors(true)
            .predicate(|_| Err("broken".into()))
            .check(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .build()
            .unwrap();

        assert!(!schema.acceptable(&json!(1)).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_validation_is_deterministic() {
        let schema = FieldSchema::builder(ValueKind::Number)
            .check(|v| v.as_f64().map_or(false, |n| n > 0.0))
            .build()
            .unwrap();

        for _ in 0..100 {
            assert!(schema.acceptable(&json!(3)).unwrap());
            assert!(!schema.acceptable(&json!(-3)).unwrap());
        }
    }
}
