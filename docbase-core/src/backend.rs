//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the seam between the operation facade
//! ([`DocumentStore`](crate::store::DocumentStore)) and the place collections live.
//! Backends own their collections exclusively and are responsible for guarding
//! them against concurrent mutation.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use docbase::backend::StoreBackend;
//! use docbase::record::Record;
//!
//! let backend = MyBackendImpl::new();
//!
//! backend.create_collection("users").await?;
//! backend.insert_record("users", Record::new(None, None)).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{
    codec::sql::SqlRow,
    collection::Collection,
    error::DocumentStoreResult,
    record::Record,
};

/// Abstract interface for record storage backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Mutations of one collection must not
/// race; reads may run concurrently with other reads.
///
/// # Error Handling
///
/// Operations naming an absent collection return
/// [`DocumentStoreError::CollectionNotFound`](crate::error::DocumentStoreError::CollectionNotFound);
/// operations naming an absent record return
/// [`DocumentStoreError::RecordNotFound`](crate::error::DocumentStoreError::RecordNotFound).
/// Neither is fatal.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Creates an empty collection. Existing collections are left untouched.
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Returns the names of all collections.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Inserts a record, overwriting any record with the same id.
    async fn insert_record(&self, collection: &str, record: Record) -> DocumentStoreResult<()>;

    /// Returns a snapshot of every record in a collection.
    async fn list_records(&self, collection: &str) -> DocumentStoreResult<Vec<Record>>;

    /// Returns one record.
    async fn get_record(&self, collection: &str, id: &str) -> DocumentStoreResult<Record>;

    /// Replaces the payload of an existing record and returns the updated record.
    ///
    /// The existence check and the replacement happen atomically.
    async fn replace_record_data(&self, collection: &str, id: &str, data: Value) -> DocumentStoreResult<Record>;

    /// Removes one record.
    async fn delete_record(&self, collection: &str, id: &str) -> DocumentStoreResult<()>;

    /// Returns a copy of one collection.
    async fn collection_snapshot(&self, name: &str) -> DocumentStoreResult<Collection>;

    /// Returns a copy of every collection.
    async fn snapshot(&self) -> DocumentStoreResult<Vec<Collection>>;

    /// Swaps an existing collection for `collection`, discarding the old records.
    async fn replace_collection(&self, collection: Collection) -> DocumentStoreResult<()>;

    /// Creates or wholesale replaces each given collection.
    async fn put_collections(&self, collections: Vec<Collection>) -> DocumentStoreResult<()>;

    /// Upserts rows into the collections they name, skipping rows whose collection
    /// does not exist. Returns the number of rows applied.
    async fn merge_records(&self, rows: Vec<SqlRow>) -> DocumentStoreResult<usize>;
}

/// Factory trait for constructing store backend instances.
#[async_trait]
pub trait StoreBackendBuilder: Send + Sync {
    /// The type of backend this builder creates.
    type Backend: StoreBackend;

    /// Builds and returns a new backend instance.
    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
