//! Hooks run around every store operation.
//!
//! A [`HookPipeline`] keeps four append-only sequences: global pre-hooks, global
//! post-hooks, and per-[`Route`] pre- and post-hooks. For each phase the global
//! sequence runs first, then the sequence registered for the operation's route,
//! one hook at a time in registration order. Hooks receive a mutable
//! [`HookContext`] and may rewrite its payload; returning an error fails the
//! operation.
//!
//! # Example
//!
//! ```ignore
//! use docbase::hook::{HookPipeline, Route, hook_fn};
//! use serde_json::json;
//!
//! let hooks = HookPipeline::new();
//!
//! hooks.register_route_pre(Route::AddRecord, hook_fn(|ctx| {
//!     if let Some(payload) = ctx.payload.as_mut() {
//!         payload["data"]["source"] = json!("api");
//!     }
//!     Ok(())
//! })).await;
//! ```

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use mea::rwlock::RwLock;
use serde_json::Value;

use crate::error::{DocumentStoreError, DocumentStoreResult, ErrorKind};

/// Logical operation key used to scope route hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    CreateCollection,
    ListCollections,
    AddRecord,
    ListRecords,
    GetRecord,
    UpdateRecord,
    DeleteRecord,
    ExportCollectionJson,
    ExportCollectionSql,
    ImportCollectionJson,
    ImportCollectionSql,
    ExportStoreJson,
    ExportStoreSql,
    ImportStoreJson,
    ImportStoreSql,
}

impl Route {
    pub const ALL: [Route; 15] = [
        Route::CreateCollection,
        Route::ListCollections,
        Route::AddRecord,
        Route::ListRecords,
        Route::GetRecord,
        Route::UpdateRecord,
        Route::DeleteRecord,
        Route::ExportCollectionJson,
        Route::ExportCollectionSql,
        Route::ImportCollectionJson,
        Route::ImportCollectionSql,
        Route::ExportStoreJson,
        Route::ExportStoreSql,
        Route::ImportStoreJson,
        Route::ImportStoreSql,
    ];

    /// Returns the route key, e.g. `"addRecord"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::CreateCollection => "createCollection",
            Route::ListCollections => "listCollections",
            Route::AddRecord => "addRecord",
            Route::ListRecords => "listRecords",
            Route::GetRecord => "getRecord",
            Route::UpdateRecord => "updateRecord",
            Route::DeleteRecord => "deleteRecord",
            Route::ExportCollectionJson => "exportCollectionJSON",
            Route::ExportCollectionSql => "exportCollectionSQL",
            Route::ImportCollectionJson => "importCollectionJSON",
            Route::ImportCollectionSql => "importCollectionSQL",
            Route::ExportStoreJson => "exportStoreJSON",
            Route::ExportStoreSql => "exportStoreSQL",
            Route::ImportStoreJson => "importStoreJSON",
            Route::ImportStoreSql => "importStoreSQL",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = DocumentStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::ALL
            .into_iter()
            .find(|route| route.as_str() == s)
            .ok_or_else(|| DocumentStoreError::MalformedInput(format!("unknown route: {}", s)))
    }
}

/// Result of the operation as seen by post-hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(ErrorKind),
}

/// State handed to every hook of one operation.
///
/// Pre-hooks see the inbound request body, if the operation has one;
/// post-hooks see the operation's result. Both may replace `payload`.
#[derive(Debug, Clone, PartialEq)]
pub struct HookContext {
    pub route: Route,
    pub collection: Option<String>,
    pub id: Option<String>,
    pub payload: Option<Value>,
    /// `None` during the pre phase.
    pub outcome: Option<Outcome>,
}

impl HookContext {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            collection: None,
            id: None,
            payload: None,
            outcome: None,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// A callback observing or augmenting an operation.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn call(&self, ctx: &mut HookContext) -> DocumentStoreResult<()>;
}

pub type HookRef = Arc<dyn Hook>;

/// Adapts a synchronous closure into a [`Hook`].
pub struct FnHook<F>(F);

#[async_trait]
impl<F> Hook for FnHook<F>
where
    F: Fn(&mut HookContext) -> DocumentStoreResult<()> + Send + Sync,
{
    async fn call(&self, ctx: &mut HookContext) -> DocumentStoreResult<()> {
        (self.0)(ctx)
    }
}

/// Wraps a synchronous closure as a shareable hook.
pub fn hook_fn<F>(f: F) -> HookRef
where
    F: Fn(&mut HookContext) -> DocumentStoreResult<()> + Send + Sync + 'static,
{
    Arc::new(FnHook(f))
}

#[derive(Default)]
struct Registry {
    global_pre: Vec<HookRef>,
    global_post: Vec<HookRef>,
    route_pre: HashMap<Route, Vec<HookRef>>,
    route_post: HashMap<Route, Vec<HookRef>>,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Pre,
    Post,
}

/// Ordered hook registrations for one store.
///
/// Cloning is cheap and clones share registrations. Separate pipelines never do.
#[derive(Clone)]
pub struct HookPipeline {
    registry: Arc<RwLock<Registry>>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a pipeline configured up front, before any operation runs.
    pub fn builder() -> HookPipelineBuilder {
        HookPipelineBuilder::default()
    }

    pub async fn register_global_pre(&self, hook: HookRef) {
        self.registry.write().await.global_pre.push(hook);
    }

    pub async fn register_global_post(&self, hook: HookRef) {
        self.registry.write().await.global_post.push(hook);
    }

    pub async fn register_route_pre(&self, route: Route, hook: HookRef) {
        self.registry
            .write()
            .await
            .route_pre
            .entry(route)
            .or_default()
            .push(hook);
    }

    pub async fn register_route_post(&self, route: Route, hook: HookRef) {
        self.registry
            .write()
            .await
            .route_post
            .entry(route)
            .or_default()
            .push(hook);
    }

    /// Runs global then route pre-hooks for `ctx.route`.
    ///
    /// # Errors
    ///
    /// Stops at the first failing hook and returns its error.
    pub async fn run_pre(&self, ctx: &mut HookContext) -> DocumentStoreResult<()> {
        self.run(Phase::Pre, ctx).await
    }

    /// Runs global then route post-hooks for `ctx.route`.
    ///
    /// # Errors
    ///
    /// Stops at the first failing hook and returns its error.
    pub async fn run_post(&self, ctx: &mut HookContext) -> DocumentStoreResult<()> {
        self.run(Phase::Post, ctx).await
    }

    /// Number of hooks that would run for `route` in each phase, as `(pre, post)`.
    pub async fn hook_counts(&self, route: Route) -> (usize, usize) {
        let registry = self.registry.read().await;
        let count = |global: &Vec<HookRef>, routes: &HashMap<Route, Vec<HookRef>>| {
            global.len() + routes.get(&route).map_or(0, Vec::len)
        };

        (
            count(&registry.global_pre, &registry.route_pre),
            count(&registry.global_post, &registry.route_post),
        )
    }

    async fn run(&self, phase: Phase, ctx: &mut HookContext) -> DocumentStoreResult<()> {
        // Snapshot so hooks can register further hooks without holding the lock.
        let hooks = {
            let registry = self.registry.read().await;
            let (global, routes) = match phase {
                Phase::Pre => (&registry.global_pre, &registry.route_pre),
                Phase::Post => (&registry.global_post, &registry.route_post),
            };

            global
                .iter()
                .chain(routes.get(&ctx.route).into_iter().flatten())
                .cloned()
                .collect::<Vec<_>>()
        };

        for hook in hooks {
            if let Err(err) = hook.call(ctx).await {
                tracing::warn!(route = %ctx.route, phase = ?phase, error = %err, "Hook failed");

                return Err(match err {
                    err @ DocumentStoreError::Hook(_, _) => err,
                    other => DocumentStoreError::hook(ctx.route.as_str(), other.to_string()),
                });
            }
        }

        Ok(())
    }
}

impl Default for HookPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookPipeline").finish_non_exhaustive()
    }
}

/// Builder for [`HookPipeline`].
///
/// # Example
///
/// ```ignore
/// let hooks = HookPipeline::builder()
///     .global_pre(audit_hook)
///     .route_post(Route::AddRecord, notify_hook)
///     .build();
/// ```
#[derive(Default)]
pub struct HookPipelineBuilder {
    registry: Registry,
}

impl HookPipelineBuilder {
    pub fn global_pre(mut self, hook: HookRef) -> Self {
        self.registry.global_pre.push(hook);
        self
    }

    pub fn global_post(mut self, hook: HookRef) -> Self {
        self.registry.global_post.push(hook);
        self
    }

    pub fn route_pre(mut self, route: Route, hook: HookRef) -> Self {
        self.registry.route_pre.entry(route).or_default().push(hook);
        self
    }

    pub fn route_post(mut self, route: Route, hook: HookRef) -> Self {
        self.registry.route_post.entry(route).or_default().push(hook);
        self
    }

    pub fn build(self) -> HookPipeline {
        HookPipeline {
            registry: Arc::new(RwLock::new(self.registry)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> HookRef {
        let log = Arc::clone(log);
        hook_fn(move |_| {
            log.lock().unwrap().push(name);
            Ok(())
        })
    }

    #[tokio::test]
    async fn global_hooks_run_before_route_hooks_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hooks = HookPipeline::new();

        hooks.register_route_pre(Route::AddRecord, recorder(&log, "route-1")).await;
        hooks.register_global_pre(recorder(&log, "global-1")).await;
        hooks.register_route_pre(Route::AddRecord, recorder(&log, "route-2")).await;
        hooks.register_global_pre(recorder(&log, "global-2")).await;
        hooks.register_route_pre(Route::GetRecord, recorder(&log, "other-route")).await;

        hooks.run_pre(&mut HookContext::new(Route::AddRecord)).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["global-1", "global-2", "route-1", "route-2"]);
    }

    #[tokio::test]
    async fn pre_and_post_are_separate() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hooks = HookPipeline::new();

        hooks.register_global_pre(recorder(&log, "pre")).await;
        hooks.register_global_post(recorder(&log, "post")).await;

        hooks.run_post(&mut HookContext::new(Route::ListRecords)).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["post"]);
        assert_eq!(hooks.hook_counts(Route::ListRecords).await, (1, 1));
    }

    #[tokio::test]
    async fn hooks_can_rewrite_the_payload() {
        let hooks = HookPipeline::new();
        hooks
            .register_global_pre(hook_fn(|ctx| {
                ctx.payload = Some(serde_json::json!({ "rewritten": true }));
                Ok(())
            }))
            .await;

        let mut ctx = HookContext::new(Route::AddRecord).with_payload(serde_json::json!({}));
        hooks.run_pre(&mut ctx).await.unwrap();

        assert_eq!(ctx.payload, Some(serde_json::json!({ "rewritten": true })));
    }

    #[tokio::test]
    async fn first_error_stops_the_phase() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hooks = HookPipeline::new();

        hooks
            .register_global_pre(hook_fn(|_| Err(DocumentStoreError::NoPayload)))
            .await;
        hooks.register_route_pre(Route::DeleteRecord, recorder(&log, "never")).await;

        let err = hooks.run_pre(&mut HookContext::new(Route::DeleteRecord)).await.unwrap_err();

        assert!(matches!(err, DocumentStoreError::Hook(ref route, _) if route == "deleteRecord"));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn separate_pipelines_do_not_share_hooks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = HookPipeline::new();
        let second = HookPipeline::new();

        first.register_global_pre(recorder(&log, "first")).await;
        second.run_pre(&mut HookContext::new(Route::AddRecord)).await.unwrap();

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn builder_registrations_keep_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hooks = HookPipeline::builder()
            .route_post(Route::ExportStoreSql, recorder(&log, "route"))
            .global_post(recorder(&log, "global"))
            .build();

        hooks.run_post(&mut HookContext::new(Route::ExportStoreSql)).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["global", "route"]);
    }

    #[test]
    fn route_keys_parse_back() {
        for route in Route::ALL {
            assert_eq!(route.as_str().parse::<Route>().unwrap(), route);
        }
        assert!("nope".parse::<Route>().is_err());
    }
}
