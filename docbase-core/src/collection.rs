//! Named, mutable sets of records keyed by identifier.
//!
//! A [`Collection`] is owned by exactly one store backend. All record operations
//! are upserts keyed by [`Record::id`], so the map key and the record id can never
//! disagree.
//!
//! # Example
//!
//! ```ignore
//! use docbase::{collection::Collection, record::Record};
//! use serde_json::json;
//!
//! let mut users = Collection::new("users");
//! users.add(Record::new(Some("a1".into()), Some(json!({ "name": "Alice" }))));
//!
//! assert!(users.get("a1").is_some());
//! assert!(users.delete("a1"));
//! assert!(!users.delete("a1"));
//! ```

use indexmap::IndexMap;

use crate::record::Record;

/// A named set of records.
///
/// Iteration follows insertion order. Overwriting an existing id keeps its
/// position. Callers must not depend on this order for correctness; exports do
/// not promise a stable order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    name: String,
    records: IndexMap<String, Record>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: IndexMap::new(),
        }
    }

    /// Creates a collection holding the given records. Later duplicates win.
    pub fn with_records(name: impl Into<String>, records: impl IntoIterator<Item = Record>) -> Self {
        let mut collection = Self::new(name);
        collection.extend(records);
        collection
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a record, replacing any record with the same id.
    pub fn add(&mut self, record: Record) {
        self.records.insert(record.id().to_string(), record);
    }

    /// Returns the record with the given id, if any.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Returns a mutable reference to the record with the given id, if any.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.records.get_mut(id)
    }

    /// Same as [`Collection::add`]. Existence checks belong to the caller.
    pub fn update(&mut self, record: Record) {
        self.add(record);
    }

    /// Removes a record, returning whether it existed.
    pub fn delete(&mut self, id: &str) -> bool {
        self.records.shift_remove(id).is_some()
    }

    /// Returns a snapshot of all records in insertion order.
    pub fn list(&self) -> Vec<Record> {
        self.records.values().cloned().collect()
    }

    /// Iterates over the records without cloning them.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Returns `true` if a record with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Extend<Record> for Collection {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        for record in iter {
            self.add(record);
        }
    }
}
