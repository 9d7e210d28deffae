//! JSON codec.
//!
//! Collection scope is a JSON array of `{id, data}` objects. Store scope is a JSON
//! object mapping each collection name to such an array.

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    codec::{DATABASE_FILE_STEM, ExportFile, ExportFormat},
    collection::Collection,
    error::{DocumentStoreError, DocumentStoreResult},
    record::Record,
};

pub struct JsonCodec;

impl JsonCodec {
    /// Encodes a collection as `<name>.json`.
    pub fn export_collection(collection: &Collection) -> DocumentStoreResult<ExportFile> {
        let records = collection.records().collect::<Vec<_>>();

        Ok(ExportFile::new(
            ExportFormat::Json,
            collection.name(),
            serde_json::to_vec(&records)?,
        ))
    }

    /// Encodes every collection as `database.json`.
    pub fn export_store<'a>(collections: impl IntoIterator<Item = &'a Collection>) -> DocumentStoreResult<ExportFile> {
        let store = collections
            .into_iter()
            .map(|collection| (collection.name(), collection.records().collect::<Vec<_>>()))
            .collect::<IndexMap<_, _>>();

        Ok(ExportFile::new(
            ExportFormat::Json,
            DATABASE_FILE_STEM,
            serde_json::to_vec(&store)?,
        ))
    }

    /// Decodes a collection-scope export into a fresh collection named `name`.
    ///
    /// # Errors
    ///
    /// [`DocumentStoreError::MalformedInput`] if the bytes are not JSON or the top
    /// level is not an array.
    pub fn import_collection(name: &str, data: &[u8]) -> DocumentStoreResult<Collection> {
        match parse(data)? {
            Value::Array(items) => Ok(records_from_array(name, items)),
            other => Err(DocumentStoreError::MalformedInput(format!(
                "expected a JSON array of records, found {}",
                describe(&other)
            ))),
        }
    }

    /// Decodes a store-scope export into one fresh collection per top-level key.
    ///
    /// A key whose value is not an array yields an empty collection.
    ///
    /// # Errors
    ///
    /// [`DocumentStoreError::MalformedInput`] if the bytes are not JSON or the top
    /// level is not an object.
    pub fn import_store(data: &[u8]) -> DocumentStoreResult<Vec<Collection>> {
        match parse(data)? {
            Value::Object(entries) => Ok(entries
                .into_iter()
                .map(|(name, value)| match value {
                    Value::Array(items) => records_from_array(&name, items),
                    _ => Collection::new(name),
                })
                .collect()),
            other => Err(DocumentStoreError::MalformedInput(format!(
                "expected a JSON object of collections, found {}",
                describe(&other)
            ))),
        }
    }
}

fn parse(data: &[u8]) -> DocumentStoreResult<Value> {
    serde_json::from_slice(data).map_err(|e| DocumentStoreError::MalformedInput(e.to_string()))
}

fn records_from_array(name: &str, items: Vec<Value>) -> Collection {
    Collection::with_records(name, items.into_iter().map(Record::from_json))
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Collection {
        Collection::with_records(
            "users",
            [
                Record::new(Some("a1".into()), Some(json!({ "name": "Alice" }))),
                Record::new(Some("b2".into()), Some(json!({ "tags": ["x", "y"], "age": 30 }))),
            ],
        )
    }

    #[test]
    fn export_collection_writes_array_of_records() {
        let file = JsonCodec::export_collection(&users()).unwrap();

        assert_eq!(file.filename, "users.json");
        assert_eq!(file.content_type, "application/json");

        let value: Value = serde_json::from_slice(&file.data).unwrap();
        assert_eq!(
            value,
            json!([
                { "id": "a1", "data": { "name": "Alice" } },
                { "id": "b2", "data": { "tags": ["x", "y"], "age": 30 } },
            ])
        );
    }

    #[test]
    fn collection_round_trip_preserves_ids_and_data() {
        let original = users();
        let file = JsonCodec::export_collection(&original).unwrap();
        let restored = JsonCodec::import_collection("users", &file.data).unwrap();

        assert_eq!(restored, original);
    }

    #[test]
    fn import_collection_generates_missing_ids() {
        let restored = JsonCodec::import_collection("t", br#"[{"data":{"x":1}},{"id":"","data":{"x":2}}]"#).unwrap();

        assert_eq!(restored.len(), 2);
        assert!(restored.records().all(|r| !r.id().is_empty()));
    }

    #[test]
    fn import_collection_rejects_non_array() {
        let err = JsonCodec::import_collection("t", br#"{"id":"a1"}"#).unwrap_err();
        assert!(matches!(err, DocumentStoreError::MalformedInput(_)));

        let err = JsonCodec::import_collection("t", b"[{").unwrap_err();
        assert!(matches!(err, DocumentStoreError::MalformedInput(_)));
    }

    #[test]
    fn store_round_trip() {
        let orders = Collection::with_records("orders", [Record::new(Some("o1".into()), Some(json!({ "total": 9.5 })))]);
        let empty = Collection::new("empty");
        let file = JsonCodec::export_store([&users(), &orders, &empty]).unwrap();

        assert_eq!(file.filename, "database.json");

        let restored = JsonCodec::import_store(&file.data).unwrap();
        assert_eq!(restored, vec![users(), orders, empty]);
    }

    #[test]
    fn import_store_requires_object() {
        let err = JsonCodec::import_store(br#"[{"id":"a1"}]"#).unwrap_err();
        assert!(matches!(err, DocumentStoreError::MalformedInput(_)));
    }

    #[test]
    fn import_store_non_array_value_becomes_empty_collection() {
        let restored = JsonCodec::import_store(br#"{"weird": 5}"#).unwrap();

        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].name(), "weird");
        assert!(restored[0].is_empty());
    }
}
