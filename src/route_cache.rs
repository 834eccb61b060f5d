// Copyright 2025 Cowboy AI, LLC.

//! Route table memoization keyed by delegate type sequence

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use lru::LruCache;
use tracing::{debug, trace};

use crate::metrics::CacheStats;
use crate::route::{RouteTable, TypeSequence};

/// Storage backing a [`RouteCache`]
///
/// Stores never replace a published entry: `publish` is insert-if-absent and
/// returns whichever table is cached for the key afterwards.
pub trait RouteStore: Send + Sync {
    /// Look up a published route
    fn get(&self, key: &TypeSequence) -> Option<Arc<RouteTable>>;

    /// Publish a route unless one is already present; returns the cached route
    fn publish(&self, key: TypeSequence, table: Arc<RouteTable>) -> Arc<RouteTable>;

    /// Drop every entry
    fn clear(&self);

    /// Number of cached routes
    fn len(&self) -> usize;

    /// Check if nothing is cached
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Store that keeps every route for its whole lifetime
#[derive(Debug, Default)]
pub struct UnboundedRouteStore {
    entries: DashMap<TypeSequence, Arc<RouteTable>>,
}

impl UnboundedRouteStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl RouteStore for UnboundedRouteStore {
    fn get(&self, key: &TypeSequence) -> Option<Arc<RouteTable>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn publish(&self, key: TypeSequence, table: Arc<RouteTable>) -> Arc<RouteTable> {
        self.entries.entry(key).or_insert(table).value().clone()
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Store bounded to the most recently used routes
pub struct LruRouteStore {
    entries: Mutex<LruCache<TypeSequence, Arc<RouteTable>>>,
}

impl LruRouteStore {
    /// Create a store holding at most `capacity` routes
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<TypeSequence, Arc<RouteTable>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RouteStore for LruRouteStore {
    fn get(&self, key: &TypeSequence) -> Option<Arc<RouteTable>> {
        self.lock().get(key).cloned()
    }

    fn publish(&self, key: TypeSequence, table: Arc<RouteTable>) -> Arc<RouteTable> {
        self.lock().get_or_insert(key, || table).clone()
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Memoizes route resolution per ordered delegate type sequence
///
/// Two unrelated delegate lists with the same concrete types reuse one route.
/// Concurrent misses may each resolve the route, which is cheap and
/// deterministic; only the first published table is ever handed out.
pub struct RouteCache {
    store: Box<dyn RouteStore>,
    stats: Arc<CacheStats>,
}

impl RouteCache {
    /// Create a cache over `store`
    pub fn new(store: Box<dyn RouteStore>, stats: Arc<CacheStats>) -> Self {
        Self { store, stats }
    }

    /// Return the cached route for `key`, resolving it with `compute` on a miss
    pub fn get_or_compute<F>(&self, key: TypeSequence, compute: F) -> Arc<RouteTable>
    where
        F: FnOnce() -> RouteTable,
    {
        if let Some(table) = self.store.get(&key) {
            trace!(delegates = key.len(), "route cache hit");
            self.stats.record_route_hit();
            return table;
        }
        debug!(delegates = key.len(), "route cache miss");
        self.stats.record_route_miss();
        self.store.publish(key, Arc::new(compute()))
    }

    /// Drop every cached route
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Number of cached routes
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if no route is cached
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
