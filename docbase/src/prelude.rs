//! Convenient re-exports of commonly used types from docbase.
//!
//! ```ignore
//! use docbase::prelude::*;
//! ```

pub use docbase_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    codec::{ExportFile, ExportFormat, ImportSummary, JsonCodec, SqlCodec},
    collection::Collection,
    error::{DocumentStoreError, DocumentStoreResult, ErrorKind},
    hook::{Hook, HookContext, HookPipeline, HookRef, Outcome, Route, hook_fn},
    record::Record,
    store::DocumentStore,
};
