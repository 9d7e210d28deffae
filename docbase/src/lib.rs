//! Main docbase crate providing a schema-less in-memory document store.
//!
//! This crate is the primary entry point for users of docbase. It re-exports the core
//! types from the sub-crates, the in-memory backend, and a logging initialiser.
//!
//! # Features
//!
//! - **Schema-less records** - Store any JSON payload under a string id
//! - **Bulk codecs** - Export and import collections or the whole store as JSON or SQL text
//! - **Hooks** - Observe or rewrite every operation before and after it runs
//!
//! # Quick Start
//!
//! ```ignore
//! use docbase::{prelude::*, memory::InMemoryStore};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     docbase::logging::init(docbase::logging::Profile::Development);
//!
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());
//!     store.create_collection("users").await.unwrap();
//!
//!     let id = store
//!         .add_record("users", json!({ "data": { "name": "Alice" } }))
//!         .await
//!         .unwrap();
//!
//!     store
//!         .update_record("users", &id, json!({ "name": "Alice", "active": true }))
//!         .await
//!         .unwrap();
//!
//!     let export = store.export_store(ExportFormat::Sql).await.unwrap();
//!     std::fs::write(&export.filename, &export.data).unwrap();
//! }
//! ```
//!
//! # Hooks
//!
//! Hooks are registered on the store's own pipeline, so two stores never see each
//! other's hooks. Global hooks run before route hooks, each in registration order.
//!
//! ```ignore
//! use docbase::{prelude::*, memory::InMemoryStore};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let hooks = HookPipeline::builder()
//!         .global_pre(hook_fn(|ctx| {
//!             tracing::info!(route = %ctx.route, "incoming");
//!             Ok(())
//!         }))
//!         .route_pre(Route::AddRecord, hook_fn(|ctx| {
//!             if let Some(payload) = ctx.payload.as_mut() {
//!                 payload["data"]["source"] = json!("api");
//!             }
//!             Ok(())
//!         }))
//!         .build();
//!
//!     let store = DocumentStore::with_hooks(InMemoryStore::new(), hooks);
//!     store.create_collection("users").await.unwrap();
//!     store.add_record("users", json!({ "data": {} })).await.unwrap();
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-process storage, lost on exit unless exported

pub mod logging;
pub mod prelude;

pub use docbase_core::{backend, codec, collection, error, hook, record, store};

// Re-exported for payload construction and custom `Hook` implementations
pub use serde_json;
pub use async_trait::async_trait;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docbase_memory::{InMemoryStore, InMemoryStoreBuilder};
}
