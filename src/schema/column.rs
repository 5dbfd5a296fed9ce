//! Columns bind a shared field schema to a field name

use std::sync::Arc;

use tracing::{debug, warn};

use super::errors::{Rejection, SchemaResult};
use super::types::FieldSchema;
use super::validator::Verdict;
use crate::Fields;

/// Result of checking one column against a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCheck {
    Accepted,
    Missing,
    Rejected(Rejection),
}

/// A named binding of a [`FieldSchema`] within a table.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    schema: Arc<FieldSchema>,
    suppress_errors: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, schema: Arc<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            schema,
            suppress_errors: false,
        }
    }

    /// When set, a raising predicate counts as a rejection for this column
    /// and a rejected value may be replaced by the schema's substitute.
    pub fn suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<FieldSchema> {
        &self.schema
    }

    pub fn suppresses_errors(&self) -> bool {
        self.suppress_errors
    }

    /// Checks the record's value for this column.
    ///
    /// # Errors
    ///
    /// Propagates `SchemaError::PredicateFailure` unless either the schema
    /// or this column suppresses errors.
    pub fn check(&self, fields: &Fields) -> SchemaResult<FieldCheck> {
        let Some(value) = fields.get(&self.name) else {
            return Ok(FieldCheck::Missing);
        };

        match self.schema.evaluate(value) {
            Ok(Verdict::Accepted) => Ok(FieldCheck::Accepted),
            Ok(Verdict::Rejected(rejection)) => Ok(FieldCheck::Rejected(rejection)),
            Err(e) if self.suppress_errors => {
                warn!(
                    event = "SCHEMA_PREDICATE_FAILED",
                    column = %self.name,
                    error = %e,
                    "predicate raised, column rejects the value"
                );
                let index = e.predicate_index().unwrap_or(0);
                Ok(FieldCheck::Rejected(Rejection::Predicate { index }))
            }
            Err(e) => Err(e),
        }
    }

    /// Checks the record's value once, filling in the schema's substitute
    /// where this column allows it.
    ///
    /// A missing field gets the substitute when the schema is not required.
    /// A rejected field gets it when this column suppresses errors. A
    /// substitute passed the schema when the schema was built, so a field
    /// that received one is reported as `Accepted` without checking again.
    ///
    /// # Errors
    ///
    /// Same as [`Column::check`].
    pub fn resolve(&self, fields: &mut Fields) -> SchemaResult<FieldCheck> {
        let outcome = self.check(fields)?;
        let Some(substitute) = self.schema.substitute().filter(|v| !v.is_null()) else {
            return Ok(outcome);
        };

        let replace = match &outcome {
            FieldCheck::Accepted => false,
            FieldCheck::Missing => !self.schema.is_required(),
            FieldCheck::Rejected(_) => self.suppress_errors,
        };
        if !replace {
            return Ok(outcome);
        }

        debug!(
            event = "SUBSTITUTE_APPLIED",
            column = %self.name,
            substitute = %substitute,
        );
        fields.insert(self.name.clone(), substitute.clone());
        Ok(FieldCheck::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaError, ValueKind};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn contains_s() -> Arc<FieldSchema> {
        Arc::new(
            FieldSchema::builder(ValueKind::String)
                .check(|v| v.as_str().map_or(false, |s| s.contains('s')))
                .substitute(json!("default-s"))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_schema_shared_between_columns() {
        let schema = contains_s();
        let a = Column::new("a", Arc::clone(&schema));
        let b = Column::new("b", Arc::clone(&schema));
        assert!(Arc::ptr_eq(a.schema(), b.schema()));
        assert_eq!(Arc::strong_count(&schema), 3);
    }

    #[test]
    fn test_check_outcomes() {
        let column = Column::new("tom", contains_s());
        assert_eq!(column.check(&fields(json!({"tom": "sr"}))).unwrap(), FieldCheck::Accepted);
        assert_eq!(column.check(&fields(json!({"tim": "sr"}))).unwrap(), FieldCheck::Missing);
        assert_eq!(
            column.check(&fields(json!({"tom": "xy"}))).unwrap(),
            FieldCheck::Rejected(Rejection::Predicate { index: 0 })
        );
    }

    #[test]
    fn test_column_suppression_downgrades_predicate_error() {
        let schema = Arc::new(
            FieldSchema::builder(ValueKind::Number)
                .predicate(|_| Err("broken".into()))
                .build()
                .unwrap(),
        );
        let record = fields(json!({"n": 1}));

        let loud = Column::new("n", Arc::clone(&schema));
        assert!(matches!(loud.check(&record), Err(SchemaError::PredicateFailure { .. })));

        let quiet = Column::new("n", schema).suppress_errors(true);
        assert_eq!(
            quiet.check(&record).unwrap(),
            FieldCheck::Rejected(Rejection::Predicate { index: 0 })
        );
    }

    #[test]
    fn test_substitute_fills_missing_optional_field() {
        let column = Column::new("tom", contains_s());
        let mut record = fields(json!({"tim": 1}));
        assert_eq!(column.resolve(&mut record).unwrap(), FieldCheck::Accepted);
        assert_eq!(record["tom"], json!("default-s"));
    }

    #[test]
    fn test_substitute_not_used_for_required_field() {
        let schema = Arc::new(
            FieldSchema::builder(ValueKind::String)
                .required(true)
                .substitute(json!("x"))
                .build()
                .unwrap(),
        );
        let column = Column::new("tom", schema);
        let mut record = fields(json!({}));
        assert_eq!(column.resolve(&mut record).unwrap(), FieldCheck::Missing);
        assert!(record.get("tom").is_none());
    }

    #[test]
    fn test_substitute_replaces_rejected_value_only_when_suppressed() {
        let mut record = fields(json!({"tom": "xy"}));

        let strict = Column::new("tom", contains_s());
        assert_eq!(
            strict.resolve(&mut record).unwrap(),
            FieldCheck::Rejected(Rejection::Predicate { index: 0 })
        );
        assert_eq!(record["tom"], json!("xy"));

        let lenient = Column::new("tom", contains_s()).suppress_errors(true);
        assert_eq!(lenient.resolve(&mut record).unwrap(), FieldCheck::Accepted);
        assert_eq!(record["tom"], json!("default-s"));
    }

    #[test]
    fn test_accepted_value_left_alone() {
        let column = Column::new("tom", contains_s()).suppress_errors(true);
        let mut record = fields(json!({"tom": "yes"}));
        assert_eq!(column.resolve(&mut record).unwrap(), FieldCheck::Accepted);
        assert_eq!(record["tom"], json!("yes"));
    }

    #[test]
    fn test_resolve_without_substitute_matches_check() {
        let column = Column::new("n", Arc::new(FieldSchema::of_kind(ValueKind::Number)));
        let mut record = fields(json!({"n": "one"}));
        let expected = column.check(&record).unwrap();
        assert_eq!(column.resolve(&mut record).unwrap(), expected);
        assert_eq!(column.resolve(&mut fields(json!({}))).unwrap(), FieldCheck::Missing);
    }

    #[test]
    fn test_resolve_runs_predicates_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = Arc::new(
            FieldSchema::builder(ValueKind::String)
                .check(move |v| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    v.as_str().map_or(false, |s| s.starts_with('d'))
                })
                .substitute(json!("d"))
                .build()
                .unwrap(),
        );
        // building checked the substitute once
        calls.store(0, Ordering::SeqCst);

        let column = Column::new("n", schema).suppress_errors(true);
        let mut record = fields(json!({"n": "x"}));
        assert_eq!(column.resolve(&mut record).unwrap(), FieldCheck::Accepted);
        assert_eq!(record["n"], json!("d"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
