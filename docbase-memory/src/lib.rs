//! In-memory storage backend for docbase.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! State lives for as long as the process does; export it through the codecs to keep it.
//!
//! # Features
//!
//! - **Thread-safe access** - One async-aware RwLock per store: shared reads, exclusive writes
//! - **Wholesale swaps** - Import replaces collections under a single write lock
//! - **Seeding** - The builder pre-creates or pre-loads collections
//!
//! # Quick Start
//!
//! ```ignore
//! use docbase::{prelude::*, memory::InMemoryStore};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryStore::builder().with_collection("users").build().await?;
//!     let store = DocumentStore::new(backend);
//!
//!     let id = store.add_record("users", json!({ "data": { "name": "Alice" } })).await?;
//!     println!("created {}", id);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbase_memory;

pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
