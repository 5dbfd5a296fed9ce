//! Stored records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Fields;

/// Name of the identity key in the persisted form of a record
pub const ID_FIELD: &str = "id";

/// A field map plus the identity the table assigned to it.
///
/// Serializes as the field map with an integer `id` key added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The record as a single JSON object, `id` included
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert(ID_FIELD.to_string(), Value::from(self.id));
        Value::Object(object)
    }
}
