//! Main document store interface.
//!
//! [`DocumentStore`] is the composition root the request/response layer talks to. It
//! pairs a [`StoreBackend`] with its own [`HookPipeline`] and exposes one method per
//! logical route. Every method runs the pre-hooks for its [`Route`], executes on the
//! backend, then runs the post-hooks.
//!
//! Post-hooks run when the operation succeeded or failed with a not-found error;
//! [`HookContext::outcome`] tells them which. Malformed input and hook failures
//! return immediately.
//!
//! # Example
//!
//! ```ignore
//! use docbase::{prelude::*, memory::InMemoryStore};
//! use serde_json::json;
//!
//! let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!
//! store.create_collection("users").await?;
//! let id = store.add_record("users", json!({ "data": { "name": "Alice" } })).await?;
//! let export = store.export_collection("users", ExportFormat::Json).await?;
//! assert_eq!(export.filename, "users.json");
//! ```

use serde_json::{Map, Value, json};

use crate::{
    backend::StoreBackend,
    codec::{ExportFile, ExportFormat, ImportSummary, JsonCodec, SqlCodec},
    error::{DocumentStoreError, DocumentStoreResult},
    hook::{HookContext, HookPipeline, HookPipelineBuilder, HookRef, Outcome, Route},
    record::Record,
};

/// A document store bound to a specific backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
    hooks: HookPipeline,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend and no hooks.
    pub fn new(backend: B) -> Self {
        Self::with_hooks(backend, HookPipeline::new())
    }

    /// Creates a new document store with a preconfigured hook pipeline.
    pub fn with_hooks(backend: B, hooks: HookPipeline) -> Self {
        Self { backend, hooks }
    }

    /// Starts a store over `backend` whose hooks are configured up front.
    pub fn builder(backend: B) -> DocumentStoreBuilder<B> {
        DocumentStoreBuilder {
            backend,
            hooks: HookPipeline::builder(),
        }
    }

    /// Returns the hook pipeline, for registering hooks after construction.
    pub fn hooks(&self) -> &HookPipeline {
        &self.hooks
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates a collection. Existing collections keep their records.
    pub async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        let mut ctx = HookContext::new(Route::CreateCollection).with_collection(name);
        self.hooks.run_pre(&mut ctx).await?;

        let result = self.backend.create_collection(name).await;
        if result.is_ok() {
            tracing::info!(collection = %name, "Collection created");
        }

        self.finish(ctx, result).await
    }

    /// Returns the names of all collections.
    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        let mut ctx = HookContext::new(Route::ListCollections);
        self.hooks.run_pre(&mut ctx).await?;

        let result = self.backend.list_collections().await;
        if let Ok(names) = &result {
            ctx.payload = Some(json!(names));
        }

        self.finish(ctx, result).await
    }

    /// Adds a record built from an `{id?, data?}` payload and returns its id.
    ///
    /// Pre-hooks may rewrite the payload before the record is built. An existing
    /// record with the same id is overwritten.
    pub async fn add_record(&self, collection: &str, payload: Value) -> DocumentStoreResult<String> {
        let mut ctx = HookContext::new(Route::AddRecord)
            .with_collection(collection)
            .with_payload(payload);
        self.hooks.run_pre(&mut ctx).await?;

        let record = Record::from_json(ctx.payload.take().unwrap_or(Value::Null));
        let id = record.id().to_string();
        ctx.id = Some(id.clone());
        ctx.payload = Some(record.to_json());

        let result = self.backend.insert_record(collection, record).await;
        if result.is_ok() {
            tracing::info!(collection = %collection, id = %id, "Record added");
        }

        self.finish(ctx, result.map(|_| id)).await
    }

    /// Returns every record in a collection.
    pub async fn list_records(&self, collection: &str) -> DocumentStoreResult<Vec<Record>> {
        let mut ctx = HookContext::new(Route::ListRecords).with_collection(collection);
        self.hooks.run_pre(&mut ctx).await?;

        let result = self.backend.list_records(collection).await;
        if let Ok(records) = &result {
            tracing::debug!(collection = %collection, count = records.len(), "Records listed");
            ctx.payload = Some(Value::Array(records.iter().map(Record::to_json).collect()));
        }

        self.finish(ctx, result).await
    }

    /// Returns one record.
    pub async fn get_record(&self, collection: &str, id: &str) -> DocumentStoreResult<Record> {
        let mut ctx = HookContext::new(Route::GetRecord)
            .with_collection(collection)
            .with_id(id);
        self.hooks.run_pre(&mut ctx).await?;

        let result = self.backend.get_record(collection, id).await;
        if let Ok(record) = &result {
            ctx.payload = Some(record.to_json());
        }

        self.finish(ctx, result).await
    }

    /// Replaces the payload of an existing record.
    ///
    /// `payload` is the new `data` value in full; it is not merged, and `null`
    /// becomes an empty object. Pre-hooks may rewrite it. Absent records report not-found rather than being created.
    pub async fn update_record(&self, collection: &str, id: &str, payload: Value) -> DocumentStoreResult<()> {
        let mut ctx = HookContext::new(Route::UpdateRecord)
            .with_collection(collection)
            .with_id(id)
            .with_payload(payload);
        self.hooks.run_pre(&mut ctx).await?;

        let data = match ctx.payload.take() {
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(data) => data,
        };
        let result = self.backend.replace_record_data(collection, id, data).await;
        if let Ok(record) = &result {
            tracing::info!(collection = %collection, id = %id, "Record updated");
            ctx.payload = Some(record.to_json());
        }

        self.finish(ctx, result.map(|_| ())).await
    }

    /// Deletes one record.
    pub async fn delete_record(&self, collection: &str, id: &str) -> DocumentStoreResult<()> {
        let mut ctx = HookContext::new(Route::DeleteRecord)
            .with_collection(collection)
            .with_id(id);
        self.hooks.run_pre(&mut ctx).await?;

        let result = self.backend.delete_record(collection, id).await;
        if result.is_ok() {
            tracing::info!(collection = %collection, id = %id, "Record deleted");
        }

        self.finish(ctx, result).await
    }

    /// Encodes one collection.
    pub async fn export_collection(&self, collection: &str, format: ExportFormat) -> DocumentStoreResult<ExportFile> {
        let route = match format {
            ExportFormat::Json => Route::ExportCollectionJson,
            ExportFormat::Sql => Route::ExportCollectionSql,
        };
        let mut ctx = HookContext::new(route).with_collection(collection);
        self.hooks.run_pre(&mut ctx).await?;

        let result = match self.backend.collection_snapshot(collection).await {
            Ok(snapshot) => match format {
                ExportFormat::Json => JsonCodec::export_collection(&snapshot),
                ExportFormat::Sql => SqlCodec::export_collection(&snapshot),
            },
            Err(err) => Err(err),
        };
        if let Ok(file) = &result {
            tracing::debug!(collection = %collection, format = %format, bytes = file.data.len(), "Collection exported");
            ctx.payload = Some(describe_export(file));
        }

        self.finish(ctx, result).await
    }

    /// Replaces one collection with the decoded contents of `data`.
    ///
    /// JSON imports require the collection to exist and leave it untouched when the
    /// input is malformed. SQL-text imports create the collection if needed and
    /// skip statements they cannot use; the summary reports how many.
    pub async fn import_collection(
        &self,
        collection: &str,
        format: ExportFormat,
        data: Option<&[u8]>,
    ) -> DocumentStoreResult<ImportSummary> {
        let data = data.ok_or(DocumentStoreError::NoPayload)?;
        let route = match format {
            ExportFormat::Json => Route::ImportCollectionJson,
            ExportFormat::Sql => Route::ImportCollectionSql,
        };
        let mut ctx = HookContext::new(route).with_collection(collection);
        self.hooks.run_pre(&mut ctx).await?;

        let result = match format {
            ExportFormat::Json => {
                let decoded = JsonCodec::import_collection(collection, data)?;
                let summary = ImportSummary {
                    imported: decoded.len(),
                    skipped: 0,
                };

                self.backend
                    .replace_collection(decoded)
                    .await
                    .map(|_| summary)
            }
            ExportFormat::Sql => {
                let (decoded, summary) = SqlCodec::import_collection(collection, data)?;
                self.backend
                    .put_collections(vec![decoded])
                    .await
                    .map(|_| summary)
            }
        };
        if let Ok(summary) = &result {
            log_import(Some(collection), format, summary);
            ctx.payload = Some(json!(summary));
        }

        self.finish(ctx, result).await
    }

    /// Encodes every collection.
    pub async fn export_store(&self, format: ExportFormat) -> DocumentStoreResult<ExportFile> {
        let route = match format {
            ExportFormat::Json => Route::ExportStoreJson,
            ExportFormat::Sql => Route::ExportStoreSql,
        };
        let mut ctx = HookContext::new(route);
        self.hooks.run_pre(&mut ctx).await?;

        let snapshot = self.backend.snapshot().await?;
        let file = match format {
            ExportFormat::Json => JsonCodec::export_store(&snapshot)?,
            ExportFormat::Sql => SqlCodec::export_store(&snapshot)?,
        };
        tracing::debug!(format = %format, collections = snapshot.len(), bytes = file.data.len(), "Store exported");
        ctx.payload = Some(describe_export(&file));

        self.finish(ctx, Ok(file)).await
    }

    /// Applies a store-scope import.
    ///
    /// JSON replaces or creates every collection named in the input; a top level that
    /// is not an object fails before anything is touched. SQL-text upserts rows into
    /// collections that already exist and drops rows for any other table.
    ///
    /// Collections are applied one after another. A backend failure part way through
    /// can leave earlier collections already replaced.
    pub async fn import_store(&self, format: ExportFormat, data: Option<&[u8]>) -> DocumentStoreResult<ImportSummary> {
        let data = data.ok_or(DocumentStoreError::NoPayload)?;
        let route = match format {
            ExportFormat::Json => Route::ImportStoreJson,
            ExportFormat::Sql => Route::ImportStoreSql,
        };
        let mut ctx = HookContext::new(route);
        self.hooks.run_pre(&mut ctx).await?;

        let summary = match format {
            ExportFormat::Json => {
                let decoded = JsonCodec::import_store(data)?;
                let summary = ImportSummary {
                    imported: decoded.iter().map(|collection| collection.len()).sum(),
                    skipped: 0,
                };
                self.backend.put_collections(decoded).await?;
                summary
            }
            ExportFormat::Sql => {
                let (rows, mut summary) = SqlCodec::parse(data)?;
                let total = rows.len();
                let merged = self.backend.merge_records(rows).await?;

                summary.imported = merged;
                summary.skipped += total.saturating_sub(merged);
                summary
            }
        };
        log_import(None, format, &summary);
        ctx.payload = Some(json!(summary));

        self.finish(ctx, Ok(summary)).await
    }

    async fn finish<T>(&self, mut ctx: HookContext, result: DocumentStoreResult<T>) -> DocumentStoreResult<T> {
        ctx.outcome = match &result {
            Ok(_) => Some(Outcome::Succeeded),
            Err(err) if err.is_not_found() => Some(Outcome::Failed(err.kind())),
            Err(_) => return result,
        };

        self.hooks.run_post(&mut ctx).await?;
        result
    }
}

/// Builder for [`DocumentStore`].
///
/// # Example
///
/// ```ignore
/// let store = DocumentStore::builder(InMemoryStore::new())
///     .global_pre_hook(audit_hook)
///     .route_post_hook(Route::DeleteRecord, notify_hook)
///     .build();
/// ```
pub struct DocumentStoreBuilder<B: StoreBackend> {
    backend: B,
    hooks: HookPipelineBuilder,
}

impl<B: StoreBackend> DocumentStoreBuilder<B> {
    pub fn global_pre_hook(mut self, hook: HookRef) -> Self {
        self.hooks = self.hooks.global_pre(hook);
        self
    }

    pub fn global_post_hook(mut self, hook: HookRef) -> Self {
        self.hooks = self.hooks.global_post(hook);
        self
    }

    pub fn route_pre_hook(mut self, route: Route, hook: HookRef) -> Self {
        self.hooks = self.hooks.route_pre(route, hook);
        self
    }

    pub fn route_post_hook(mut self, route: Route, hook: HookRef) -> Self {
        self.hooks = self.hooks.route_post(route, hook);
        self
    }

    pub fn build(self) -> DocumentStore<B> {
        DocumentStore::with_hooks(self.backend, self.hooks.build())
    }
}

fn describe_export(file: &ExportFile) -> Value {
    json!({
        "filename": file.filename,
        "contentType": file.content_type,
        "size": file.data.len(),
    })
}

fn log_import(collection: Option<&str>, format: ExportFormat, summary: &ImportSummary) {
    let scope = collection.unwrap_or("*");

    if summary.skipped > 0 {
        tracing::warn!(
            collection = %scope,
            format = %format,
            imported = summary.imported,
            skipped = summary.skipped,
            "Import skipped statements"
        );
    } else {
        tracing::info!(collection = %scope, format = %format, imported = summary.imported, "Import applied");
    }
}
