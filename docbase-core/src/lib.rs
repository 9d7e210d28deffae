//! A schema-less, in-memory JSON document store.
//!
//! This crate is the core of the docbase project and provides:
//!
//! - **Records** ([`record`]) - An id plus an opaque JSON payload
//! - **Collections** ([`collection`]) - Named sets of records keyed by id
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing storage backends
//! - **Document store** ([`store`]) - The operation facade, one method per route
//! - **Codecs** ([`codec`]) - JSON and SQL-text export/import at collection and store scope
//! - **Hooks** ([`hook`]) - Ordered pre/post callbacks around every operation
//! - **Error handling** ([`error`]) - Error taxonomy and result types
//!
//! # Example
//!
//! ```ignore
//! use docbase::{prelude::*, memory::InMemoryStore};
//! use serde_json::json;
//!
//! let store = DocumentStore::new(InMemoryStore::new());
//! store.create_collection("users").await?;
//!
//! let id = store.add_record("users", json!({ "data": { "name": "Alice" } })).await?;
//! let record = store.get_record("users", &id).await?;
//! assert_eq!(record.data()["name"], "Alice");
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbase_core;

pub mod backend;
pub mod codec;
pub mod collection;
pub mod error;
pub mod hook;
pub mod record;
pub mod store;
