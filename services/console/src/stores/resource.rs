//! services/console/src/stores/resource.rs
//!
//! The generic remote-backed collection store. One implementation covers
//! every managed entity: it caches the last known-good server response,
//! applies successful mutations in place, and never leaves the cache
//! partially updated after a failed call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use school_console_core::ports::{CollectionApi, PortResult, Resource};

use super::notify::{Subscribers, SubscriptionId};
use super::session::SessionStore;

struct CacheInner<R: Resource> {
    items: Vec<R>,
    error: Option<String>,
    filters: R::Filters,
}

/// A cached mirror of one remote collection.
///
/// The cache is only ever replaced wholesale (on a successful list) or
/// patched at a single id (on a successful create/update/delete). Callers
/// are expected to serialize edits per entity; two concurrent updates of
/// the same id settle as last-response-wins.
pub struct ResourceStore<R: Resource> {
    api: Arc<dyn CollectionApi<R>>,
    session: Arc<SessionStore>,
    inner: RwLock<CacheInner<R>>,
    /// In-flight operation count, not a boolean: one completion cannot
    /// mask another still-pending call's loading state.
    in_flight: AtomicUsize,
    subscribers: Subscribers,
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(api: Arc<dyn CollectionApi<R>>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            inner: RwLock::new(CacheInner {
                items: Vec::new(),
                error: None,
                filters: R::Filters::default(),
            }),
            in_flight: AtomicUsize::new(0),
            subscribers: Subscribers::new(),
        }
    }

    //=====================================================================================
    // Internal commit/notify discipline
    //=====================================================================================

    fn commit(&self, apply: impl FnOnce(&mut CacheInner<R>)) {
        {
            let mut inner = self.inner.write();
            apply(&mut inner);
        }
        self.subscribers.notify();
    }

    fn track_start(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.subscribers.notify();
    }

    fn track_finish(&self, apply: impl FnOnce(&mut CacheInner<R>)) {
        {
            let mut inner = self.inner.write();
            apply(&mut inner);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.subscribers.notify();
    }

    /// Fetches the bearer token, failing fast before any network call and
    /// recording the failure; the cache is left untouched.
    fn authorize(&self) -> PortResult<String> {
        self.session.bearer_token().map_err(|err| {
            warn!(resource = R::NAME, "operation attempted without a valid session");
            self.commit(|inner| inner.error = Some(err.to_string()));
            err
        })
    }

    //=====================================================================================
    // Remote operations
    //=====================================================================================

    /// Fetches the collection with default (empty) filters.
    pub async fn refresh(&self) -> PortResult<()> {
        self.refresh_filtered(R::Filters::default()).await
    }

    /// Fetches the collection and replaces the entire cache on success.
    /// On any failure the cache is reset to empty rather than left stale,
    /// so it can never disagree with the applied filters.
    pub async fn refresh_filtered(&self, filters: R::Filters) -> PortResult<()> {
        let token = match self.session.bearer_token() {
            Ok(token) => token,
            Err(err) => {
                // No fetch happened, so the requested filters are not
                // recorded as the last applied ones.
                self.commit(|inner| {
                    inner.items.clear();
                    inner.error = Some(err.to_string());
                });
                return Err(err);
            }
        };

        self.track_start();
        match self.api.list(&token, &filters).await {
            Ok(items) => {
                debug!(resource = R::NAME, count = items.len(), "collection fetched");
                self.track_finish(|inner| {
                    inner.items = items;
                    inner.error = None;
                    inner.filters = filters;
                });
                Ok(())
            }
            Err(err) => {
                warn!(resource = R::NAME, error = %err, "fetch failed");
                self.track_finish(|inner| {
                    inner.items.clear();
                    inner.error = Some(err.to_string());
                    inner.filters = filters;
                });
                Err(err)
            }
        }
    }

    /// Creates an entity; on success the server-returned record (with its
    /// assigned id) is appended to the cache.
    pub async fn create(&self, data: R::Create) -> PortResult<R> {
        let token = self.authorize()?;
        self.track_start();
        match self.api.create(&token, &data).await {
            Ok(entity) => {
                debug!(resource = R::NAME, id = %entity.id(), "created");
                let cached = entity.clone();
                self.track_finish(move |inner| {
                    inner.items.push(cached);
                    inner.error = None;
                });
                Ok(entity)
            }
            Err(err) => {
                warn!(resource = R::NAME, error = %err, "create failed");
                self.track_finish(|inner| inner.error = Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Updates an entity; on success the cache entry is replaced with the
    /// server's full representation, never a local merge. An id no longer
    /// in the cache is a silent no-op.
    pub async fn update(&self, id: R::Id, data: R::Update) -> PortResult<R> {
        let token = self.authorize()?;
        self.track_start();
        match self.api.update(&token, &id, &data).await {
            Ok(entity) => {
                debug!(resource = R::NAME, id = %id, "updated");
                let cached = entity.clone();
                self.track_finish(move |inner| {
                    if let Some(slot) = inner.items.iter_mut().find(|e| e.id() == id) {
                        *slot = cached;
                    }
                    inner.error = None;
                });
                Ok(entity)
            }
            Err(err) => {
                warn!(resource = R::NAME, id = %id, error = %err, "update failed");
                self.track_finish(|inner| inner.error = Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Deletes an entity; on success the matching cache entry is removed.
    pub async fn remove(&self, id: R::Id) -> PortResult<()> {
        let token = self.authorize()?;
        self.track_start();
        match self.api.delete(&token, &id).await {
            Ok(()) => {
                debug!(resource = R::NAME, id = %id, "deleted");
                self.track_finish(|inner| {
                    inner.items.retain(|e| e.id() != id);
                    inner.error = None;
                });
                Ok(())
            }
            Err(err) => {
                warn!(resource = R::NAME, id = %id, error = %err, "delete failed");
                self.track_finish(|inner| inner.error = Some(err.to_string()));
                Err(err)
            }
        }
    }

    //=====================================================================================
    // Queries
    //=====================================================================================

    /// A snapshot of the cached collection.
    pub fn items(&self) -> Vec<R> {
        self.inner.read().items.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }

    pub fn get(&self, id: &R::Id) -> Option<R> {
        self.inner.read().items.iter().find(|e| e.id() == *id).cloned()
    }

    /// The filters used by the most recent fetch.
    pub fn last_filters(&self) -> R::Filters {
        self.inner.read().filters.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.commit(|inner| inner.error = None);
    }

    /// True while at least one operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    //=====================================================================================
    // Subscriptions
    //=====================================================================================

    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.subscribers.add(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}
