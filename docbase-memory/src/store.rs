//! In-memory storage implementation for document stores.
//!
//! This module provides the backend that keeps every collection in process memory,
//! behind a single async-aware read-write lock per store.

use std::sync::Arc;
use async_trait::async_trait;
use indexmap::IndexMap;
use mea::rwlock::RwLock;
use serde_json::Value;

use docbase_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    codec::sql::SqlRow,
    collection::Collection,
    error::{DocumentStoreError, DocumentStoreResult},
    record::Record,
};

type StoreMap = IndexMap<String, Collection>;


/// Thread-safe in-memory record storage backend.
///
/// All collections live in one map guarded by one lock: reads share it, every
/// mutation (including whole-collection swaps during imports) takes it exclusively.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be safely shared across async tasks. Multiple clones of the same instance
/// share the same underlying data.
///
/// # Example
///
/// ```ignore
/// use docbase_memory::InMemoryStore;
/// use docbase::{backend::StoreBackend, record::Record};
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///     store.create_collection("users").await?;
///
///     let record = Record::new(Some("a1".into()), Some(json!({ "name": "Alice" })));
///     store.insert_record("users", record).await?;
///
///     let found = store.get_record("users", "a1").await?;
///     assert_eq!(found.data()["name"], "Alice");
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> collection
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::from_collections(StoreMap::new())
    }

    /// Creates a builder for constructing an `InMemoryStore` with custom options.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use docbase_memory::InMemoryStore;
    ///
    /// let store = InMemoryStore::builder()
    ///     .with_collection("users")
    ///     .build()
    ///     .await
    ///     .unwrap();
    /// ```
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    fn from_collections(collections: StoreMap) -> Self {
        Self {
            store: Arc::new(RwLock::new(collections)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(collection: &str) -> DocumentStoreError {
    DocumentStoreError::CollectionNotFound(collection.to_string())
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name));

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        Ok(
            self.store
                .read()
                .await
                .keys()
                .cloned()
                .collect()
        )
    }

    async fn insert_record(&self, collection: &str, record: Record) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let collection_map = store
            .get_mut(collection)
            .ok_or_else(|| not_found(collection))?;

        collection_map.add(record);

        Ok(())
    }

    async fn list_records(&self, collection: &str) -> DocumentStoreResult<Vec<Record>> {
        let store = self.store.read().await;

        store
            .get(collection)
            .map(Collection::list)
            .ok_or_else(|| not_found(collection))
    }

    async fn get_record(&self, collection: &str, id: &str) -> DocumentStoreResult<Record> {
        let store = self.store.read().await;
        let collection_map = store
            .get(collection)
            .ok_or_else(|| not_found(collection))?;

        collection_map
            .get(id)
            .cloned()
            .ok_or_else(|| DocumentStoreError::RecordNotFound(id.to_string(), collection.to_string()))
    }

    async fn replace_record_data(&self, collection: &str, id: &str, data: Value) -> DocumentStoreResult<Record> {
        let mut store = self.store.write().await;
        let collection_map = store
            .get_mut(collection)
            .ok_or_else(|| not_found(collection))?;

        let record = collection_map
            .get_mut(id)
            .ok_or_else(|| DocumentStoreError::RecordNotFound(id.to_string(), collection.to_string()))?;
        record.set_data(data);

        Ok(record.clone())
    }

    async fn delete_record(&self, collection: &str, id: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let collection_map = store
            .get_mut(collection)
            .ok_or_else(|| not_found(collection))?;

        if !collection_map.delete(id) {
            return Err(DocumentStoreError::RecordNotFound(id.to_string(), collection.to_string()));
        }

        Ok(())
    }

    async fn collection_snapshot(&self, name: &str) -> DocumentStoreResult<Collection> {
        self.store
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    async fn snapshot(&self) -> DocumentStoreResult<Vec<Collection>> {
        Ok(
            self.store
                .read()
                .await
                .values()
                .cloned()
                .collect()
        )
    }

    async fn replace_collection(&self, collection: Collection) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let slot = store
            .get_mut(collection.name())
            .ok_or_else(|| not_found(collection.name()))?;

        tracing::debug!(collection = %collection.name(), previous = slot.len(), records = collection.len(), "Replacing collection");
        *slot = collection;

        Ok(())
    }

    async fn put_collections(&self, collections: Vec<Collection>) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;

        for collection in collections {
            tracing::debug!(collection = %collection.name(), records = collection.len(), "Putting collection");
            store.insert(collection.name().to_string(), collection);
        }

        Ok(())
    }

    async fn merge_records(&self, rows: Vec<SqlRow>) -> DocumentStoreResult<usize> {
        let mut store = self.store.write().await;
        let mut merged = 0;

        for SqlRow { table, record } in rows {
            match store.get_mut(&table) {
                Some(collection) => {
                    collection.add(record);
                    merged += 1;
                }
                None => tracing::debug!(table = %table, id = %record.id(), "Dropping row for unknown collection"),
            }
        }

        Ok(merged)
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
///
/// Collections added here exist before the first operation runs, which is how a
/// process seeds its store at startup.
///
/// # Example
///
/// ```ignore
/// use docbase_memory::InMemoryStore;
/// use docbase::backend::StoreBackendBuilder;
///
/// #[tokio::main]
/// async fn main() {
///     let store = InMemoryStore::builder()
///         .with_collection("users")
///         .with_collection("orders")
///         .build()
///         .await
///         .unwrap();
/// }
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    collections: StoreMap,
}

impl InMemoryStoreBuilder {
    /// Pre-creates an empty collection. Does nothing if it is already configured.
    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.collections
            .entry(name.clone())
            .or_insert_with(|| Collection::new(name));
        self
    }

    /// Pre-loads a collection with records, replacing any configured one of the same name.
    pub fn with_seed_collection(mut self, collection: Collection) -> Self {
        self.collections.insert(collection.name().to_string(), collection);
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// This always succeeds.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::from_collections(self.collections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, data: Value) -> Record {
        Record::new(Some(id.to_string()), Some(data))
    }

    #[tokio::test]
    async fn create_collection_is_idempotent() {
        let store = InMemoryStore::new();
        store.create_collection("t").await.unwrap();
        store.insert_record("t", record("a1", json!({ "x": 1 }))).await.unwrap();
        store.create_collection("t").await.unwrap();

        assert_eq!(store.list_records("t").await.unwrap().len(), 1);
        assert_eq!(store.list_collections().await.unwrap(), vec!["t".to_string()]);
    }

    #[tokio::test]
    async fn missing_collection_is_not_found() {
        let store = InMemoryStore::new();

        let err = store.insert_record("nope", record("a1", json!({}))).await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::CollectionNotFound(ref name) if name == "nope"));
        assert!(store.list_records("nope").await.unwrap_err().is_not_found());
        assert!(store.get_record("nope", "a1").await.unwrap_err().is_not_found());
        assert!(store.delete_record("nope", "a1").await.unwrap_err().is_not_found());
        assert!(store.collection_snapshot("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn replace_record_data_requires_existing_record() {
        let store = InMemoryStore::builder().with_collection("t").build().await.unwrap();

        let err = store.replace_record_data("t", "a1", json!({})).await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::RecordNotFound(_, _)));

        store.insert_record("t", record("a1", json!({ "x": 1, "y": 2 }))).await.unwrap();
        let updated = store.replace_record_data("t", "a1", json!({ "z": 3 })).await.unwrap();

        assert_eq!(updated.data(), &json!({ "z": 3 }));
        assert_eq!(store.get_record("t", "a1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn delete_reports_missing_record() {
        let store = InMemoryStore::builder().with_collection("t").build().await.unwrap();
        store.insert_record("t", record("a1", json!({}))).await.unwrap();

        store.delete_record("t", "a1").await.unwrap();
        let err = store.delete_record("t", "a1").await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::RecordNotFound(_, _)));
    }

    #[tokio::test]
    async fn replace_collection_swaps_wholesale() {
        let store = InMemoryStore::builder().with_collection("t").build().await.unwrap();
        store.insert_record("t", record("old", json!({}))).await.unwrap();

        store
            .replace_collection(Collection::with_records("t", [record("new", json!({}))]))
            .await
            .unwrap();

        let ids: Vec<_> = store.list_records("t").await.unwrap().into_iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["new"]);

        let err = store.replace_collection(Collection::new("absent")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn merge_records_only_touches_existing_collections() {
        let store = InMemoryStore::builder()
            .with_seed_collection(Collection::with_records("t", [record("keep", json!({ "v": 1 }))]))
            .build()
            .await
            .unwrap();

        let merged = store
            .merge_records(vec![
                SqlRow { table: "t".into(), record: record("keep", json!({ "v": 2 })) },
                SqlRow { table: "t".into(), record: record("add", json!({})) },
                SqlRow { table: "ghost".into(), record: record("lost", json!({})) },
            ])
            .await
            .unwrap();

        assert_eq!(merged, 2);
        assert_eq!(store.get_record("t", "keep").await.unwrap().data(), &json!({ "v": 2 }));
        assert!(store.collection_snapshot("ghost").await.is_err());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryStore::new();
        let clone = store.clone();

        clone.create_collection("shared").await.unwrap();
        assert_eq!(store.list_collections().await.unwrap(), vec!["shared".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_records() {
        let store = InMemoryStore::builder().with_collection("t").build().await.unwrap();

        let tasks = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_record("t", record(&format!("r{}", i), json!({ "i": i })))
                        .await
                })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.list_records("t").await.unwrap().len(), 32);
    }
}
