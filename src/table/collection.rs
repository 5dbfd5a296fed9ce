//! The table: columns, pipeline, identity counter and records

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::config::TableConfig;
use super::errors::{TableError, TableResult};
use super::record::{Record, ID_FIELD};
use crate::persistence::{
    document, JsonFileStore, PersistenceError, PersistenceResult, RecordStore,
};
use crate::pipeline::{Pipeline, Step};
use crate::schema::{kind_name, Column, FieldCheck, SchemaResult};
use crate::{BoxError, Fields};

/// A typed collection of records.
///
/// Every stored record satisfied every column when it was inserted. Ids are
/// assigned from a counter that only moves forward, so an id is never handed
/// out twice, even after its record is removed. Records keep insertion order.
pub struct Table {
    name: String,
    columns: Vec<Column>,
    pipeline: Pipeline,
    config: TableConfig,
    store: Option<Box<dyn RecordStore>>,
    next_id: u64,
    records: Vec<Record>,
    last_persist_error: Option<PersistenceError>,
}

impl Table {
    /// Starts declaring a table
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            name: name.into(),
            columns: Vec::new(),
            pipeline: Pipeline::new(),
            config: TableConfig::default(),
            store: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Id the next inserted record will get
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Records in insertion order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Error from the most recent automatic save, cleared by the next success
    pub fn last_persist_error(&self) -> Option<&PersistenceError> {
        self.last_persist_error.as_ref()
    }

    /// Runs the pipeline on `record`, validates the result and stores it.
    ///
    /// `extra` steps run after the table's own steps. Returns `Ok(true)` when
    /// the record was stored and `Ok(false)` when it was rejected while the
    /// table suppresses errors. A rejected record changes nothing.
    ///
    /// # Errors
    ///
    /// - `MissingField`, `InvalidField`, `NotAnObject` when the record does
    ///   not fit and the table does not suppress errors
    /// - `Pipeline` when a step fails and the table does not suppress errors
    /// - `Schema` when a predicate raises and neither its schema nor its
    ///   column suppresses errors
    pub fn insert_one(&mut self, record: &Value, extra: &[Step]) -> TableResult<bool> {
        let inserted = self.insert_unsaved(record, extra)?.is_some();
        if inserted {
            self.auto_persist();
        }
        Ok(inserted)
    }

    /// Inserts each record independently and in order.
    ///
    /// A rejected record does not stop the ones after it. The table is saved
    /// once after the batch rather than after every record.
    ///
    /// # Errors
    ///
    /// The first error [`Table::insert_one`] would raise. Records inserted
    /// before it stay inserted and are saved.
    pub fn insert_all(&mut self, records: &[Value], extra: &[Step]) -> TableResult<Vec<bool>> {
        let mut results = Vec::with_capacity(records.len());
        let mut failure = None;

        for record in records {
            match self.insert_unsaved(record, extra) {
                Ok(id) => results.push(id.is_some()),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if results.iter().any(|inserted| *inserted) {
            self.auto_persist();
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }

    /// Removes the record with `id`, if there is one
    pub fn remove(&mut self, id: u64) -> Option<Record> {
        let index = self.index_of(id)?;
        let removed = self.records.remove(index);
        debug!(event = "RECORD_REMOVED", table = %self.name, id);
        self.auto_persist();
        Some(removed)
    }

    pub fn get(&self, id: u64) -> Option<&Record> {
        self.find(|record| record.id == id)
    }

    /// First record, in insertion order, matching `predicate`
    pub fn find<P>(&self, mut predicate: P) -> Option<&Record>
    where
        P: FnMut(&Record) -> bool,
    {
        self.records.iter().find(|record| predicate(*record))
    }

    /// Position of the record with `id` in insertion order
    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// True if every column's field is present and acceptable.
    ///
    /// Fields without a column are allowed.
    pub fn row_is_valid(&self, fields: &Fields) -> SchemaResult<bool> {
        for column in &self.columns {
            if column.check(fields)? != FieldCheck::Accepted {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Writes all records to the table's store.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if no store is attached or the write fails.
    pub fn save(&self) -> TableResult<()> {
        Ok(self.persist()?)
    }

    fn persist(&self) -> PersistenceResult<()> {
        let store = self.store()?;
        let result = document::encode(&self.name, &self.records).and_then(|doc| store.write(&doc));

        match &result {
            Ok(()) => debug!(
                event = "TABLE_SAVED",
                table = %self.name,
                target = %store.describe(),
                records = self.records.len(),
            ),
            Err(e) => error!(
                event = "TABLE_PERSIST_FAILED",
                table = %self.name,
                target = %store.describe(),
                error = %e,
            ),
        }
        result
    }

    /// Replaces the in-memory records with the stored ones.
    ///
    /// Every stored record must satisfy the current columns. The id counter
    /// moves past the highest stored id. When nothing has been stored yet the
    /// table is left as it is. Returns the number of records loaded.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if no store is attached, reading fails, the
    /// document is malformed or a stored record is invalid. The table is
    /// unchanged on error.
    pub fn load(&mut self) -> TableResult<usize> {
        match self.read_stored() {
            Ok(None) => {
                info!(event = "TABLE_LOADED", table = %self.name, records = 0, "nothing stored yet");
                Ok(0)
            }
            Ok(Some((records, after_max))) => {
                self.next_id = self.next_id.max(after_max);
                self.records = records;
                info!(
                    event = "TABLE_LOADED",
                    table = %self.name,
                    records = self.records.len(),
                    next_id = self.next_id,
                );
                Ok(self.records.len())
            }
            Err(e) => {
                error!(event = "TABLE_LOAD_FAILED", table = %self.name, error = %e);
                Err(e)
            }
        }
    }

    /// Decoded and validated records plus the id that follows the highest one
    fn read_stored(&self) -> TableResult<Option<(Vec<Record>, u64)>> {
        let Some(bytes) = self.store()?.read()? else {
            return Ok(None);
        };
        let records = document::decode(&self.name, &bytes)?;

        let mut after_max = 0;
        for record in &records {
            let next = record.id.checked_add(1).ok_or_else(|| PersistenceError::InvalidRecord {
                id: record.id,
                reason: "id leaves no room for further inserts".into(),
            })?;
            after_max = after_max.max(next);
        }

        for record in &records {
            if let Err(e) = self.validate(&record.fields) {
                if !e.is_rejection() {
                    return Err(e);
                }
                return Err(PersistenceError::InvalidRecord {
                    id: record.id,
                    reason: e.to_string(),
                }
                .into());
            }
        }

        Ok(Some((records, after_max)))
    }

    fn store(&self) -> PersistenceResult<&dyn RecordStore> {
        self.store
            .as_deref()
            .ok_or_else(|| PersistenceError::NoStore(self.name.clone()))
    }

    /// Inserts without saving. `Ok(None)` means suppressed rejection.
    fn insert_unsaved(&mut self, record: &Value, extra: &[Step]) -> TableResult<Option<u64>> {
        match self.prepare(record, extra) {
            Ok(fields) => {
                let id = self.next_id;
                self.next_id = id.checked_add(1).ok_or_else(|| TableError::IdsExhausted {
                    table: self.name.clone(),
                })?;
                self.records.push(Record { id, fields });
                debug!(event = "RECORD_INSERTED", table = %self.name, id);
                Ok(Some(id))
            }
            Err(e) if e.is_rejection() && self.config.suppress_errors => {
                warn!(
                    event = "INSERT_REJECTED",
                    table = %self.name,
                    code = e.code(),
                    error = %e,
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Pipeline, identity stripping, substitutes, validation
    fn prepare(&self, record: &Value, extra: &[Step]) -> TableResult<Fields> {
        let Value::Object(input) = record else {
            return Err(TableError::NotAnObject {
                table: self.name.clone(),
                actual: kind_name(record),
            });
        };

        let mut fields = self.pipeline.run(input, extra, self.config.suppress_errors)?;

        if fields.remove(ID_FIELD).is_some() {
            debug!(
                event = "CALLER_ID_DROPPED",
                table = %self.name,
                "ids are assigned by the table"
            );
        }

        for column in &self.columns {
            let outcome = column.resolve(&mut fields)?;
            self.field_outcome(column, outcome)?;
        }
        Ok(fields)
    }

    fn validate(&self, fields: &Fields) -> TableResult<()> {
        for column in &self.columns {
            self.field_outcome(column, column.check(fields)?)?;
        }
        Ok(())
    }

    fn field_outcome(&self, column: &Column, outcome: FieldCheck) -> TableResult<()> {
        match outcome {
            FieldCheck::Accepted => Ok(()),
            FieldCheck::Missing => Err(TableError::MissingField {
                table: self.name.clone(),
                field: column.name().to_string(),
            }),
            FieldCheck::Rejected(rejection) => Err(TableError::InvalidField {
                table: self.name.clone(),
                field: column.name().to_string(),
                rejection,
            }),
        }
    }

    fn auto_persist(&mut self) {
        if !self.config.auto_persist || self.store.is_none() {
            return;
        }
        // failures are already logged by persist
        self.last_persist_error = self.persist().err();
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("pipeline", &self.pipeline)
            .field("config", &self.config)
            .field("store", &self.store.as_ref().map(|store| store.describe()))
            .field("next_id", &self.next_id)
            .field("records", &self.records)
            .finish()
    }
}

/// Builder for [`Table`]
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    pipeline: Pipeline,
    config: TableConfig,
    store: Option<Box<dyn RecordStore>>,
}

impl TableBuilder {
    /// Add a column. Columns are checked in the order they were added.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a step to the table's pipeline
    pub fn step<F>(mut self, f: F) -> Self
    where
        F: Fn(Fields) -> Result<Fields, BoxError> + Send + Sync + 'static,
    {
        self.pipeline = self.pipeline.with_step(f);
        self
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    pub fn suppress_errors(mut self, suppress: bool) -> Self {
        self.config.suppress_errors = suppress;
        self
    }

    pub fn auto_persist(mut self, auto_persist: bool) -> Self {
        self.config.auto_persist = auto_persist;
        self
    }

    /// Persist through `store`. Takes precedence over `config.data_file`.
    pub fn store(mut self, store: impl RecordStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Finishes the table with no records and `next_id` at 0.
    ///
    /// # Errors
    ///
    /// `DuplicateColumn` if two columns share a name, `ReservedColumn` if a
    /// column is named `id`.
    pub fn build(self) -> TableResult<Table> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if column.name() == ID_FIELD {
                return Err(TableError::ReservedColumn {
                    table: self.name,
                    column: column.name().to_string(),
                });
            }
            if !seen.insert(column.name()) {
                return Err(TableError::DuplicateColumn {
                    table: self.name,
                    column: column.name().to_string(),
                });
            }
        }

        let store = self.store.or_else(|| {
            self.config
                .data_file
                .clone()
                .map(|path| Box::new(JsonFileStore::new(path)) as Box<dyn RecordStore>)
        });

        Ok(Table {
            name: self.name,
            columns: self.columns,
            pipeline: self.pipeline,
            config: self.config,
            store,
            next_id: 0,
            records: Vec::new(),
            last_persist_error: None,
        })
    }

    /// Builds the table and loads whatever its store holds
    pub fn open(self) -> TableResult<Table> {
        let mut table = self.build()?;
        if table.store.is_some() {
            table.load()?;
        }
        Ok(table)
    }
}
