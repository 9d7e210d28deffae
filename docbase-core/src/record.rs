//! The atomic unit of storage: an identifier plus an opaque JSON payload.
//!
//! Payloads are arbitrary [`serde_json::Value`] trees. No schema is imposed and the
//! core never merges payloads partially; [`Record::set_data`] replaces them whole.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A stored record.
///
/// The identifier is fixed at construction and never changes afterwards. Records
/// serialize as `{"id": ..., "data": ...}`, which is also the shape used by the
/// JSON codec. Deserializing goes through [`Record::from_json`], so the same id and
/// payload defaults apply.
///
/// # Example
///
/// ```ignore
/// use docbase::record::Record;
/// use serde_json::json;
///
/// let record = Record::new(Some("a1".to_string()), Some(json!({ "x": 1 })));
/// assert_eq!(record.id(), "a1");
///
/// let generated = Record::new(None, None);
/// assert!(!generated.id().is_empty());
/// assert_eq!(generated.data(), &json!({}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Record {
    id: String,
    data: Value,
}

impl Record {
    /// Creates a record.
    ///
    /// A present, non-empty `id` is kept; otherwise a random UUID v4 is generated.
    /// A missing payload becomes an empty JSON object.
    pub fn new(id: Option<String>, data: Option<Value>) -> Self {
        Self {
            id: id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(generate_id),
            data: data.unwrap_or_else(empty_payload),
        }
    }

    /// Builds a record from an inbound `{id, data}` value.
    ///
    /// String ids are kept when non-empty and numeric ids are rendered as text. Any
    /// other id (missing, null, empty, structured) is replaced by a generated one.
    /// A missing or null `data` becomes an empty object. Values that are not JSON
    /// objects produce a record with a generated id and an empty payload.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::new(None, None);
        };

        let id = match fields.remove("id") {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        let data = match fields.remove("data") {
            Some(Value::Null) | None => None,
            Some(data) => Some(data),
        };

        Self::new(id, data)
    }

    /// Returns the record identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the record payload.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Replaces the payload wholesale.
    pub fn set_data(&mut self, data: Value) {
        self.data = data;
    }

    /// Consumes the record, returning `(id, data)`.
    pub fn into_parts(self) -> (String, Value) {
        (self.id, self.data)
    }

    /// Returns the `{id, data}` JSON representation of this record.
    pub fn to_json(&self) -> Value {
        let mut fields = Map::with_capacity(2);
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        fields.insert("data".to_string(), self.data.clone());

        Value::Object(fields)
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Record::from_json(value)
    }
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

fn empty_payload() -> Value {
    Value::Object(Map::new())
}
