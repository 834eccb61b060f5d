// Copyright 2025 Cowboy AI, LLC.

//! Composition entry points
//!
//! A [`CompositionContext`] owns every cache used while composing: delegate
//! type descriptions, routes per delegate type sequence and blueprints per scope
//! and key. Independent contexts share nothing, which keeps tenants and tests
//! isolated from each other.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::debug;

use crate::blueprint::{Blueprint, BlueprintBackend, DispatchTableBackend};
use crate::blueprint_cache::BlueprintCache;
use crate::capability::Capability;
use crate::composite::Composite;
use crate::config::CompositionConfig;
use crate::delegate::Delegate;
use crate::errors::{CompositionError, CompositionResult};
use crate::key::{CompositionKey, Scope};
use crate::metrics::{CacheStats, CacheStatsSnapshot};
use crate::registry::TypeRegistry;
use crate::route::{RouteTable, TypeSequence};
use crate::route_cache::{LruRouteStore, RouteCache, RouteStore, UnboundedRouteStore};

/// Owner of the caches behind composition
pub struct CompositionContext {
    config: CompositionConfig,
    scope: Scope,
    types: TypeRegistry,
    routes: RouteCache,
    blueprints: BlueprintCache,
    backend: Arc<dyn BlueprintBackend>,
    stats: Arc<CacheStats>,
}

impl Default for CompositionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositionContext {
    /// Create a context with the default configuration
    pub fn new() -> Self {
        Self::from_config(CompositionConfig::default())
    }

    /// Create a context from a validated configuration
    pub fn with_config(config: CompositionConfig) -> CompositionResult<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: CompositionConfig) -> Self {
        let stats = Arc::new(CacheStats::new());
        let store: Box<dyn RouteStore> = match config.route_capacity() {
            Some(capacity) => Box::new(LruRouteStore::new(capacity)),
            None => Box::new(UnboundedRouteStore::new()),
        };
        Self {
            scope: Scope::new(&config.default_scope),
            types: TypeRegistry::new(),
            routes: RouteCache::new(store, stats.clone()),
            blueprints: BlueprintCache::new(stats.clone()),
            backend: Arc::new(DispatchTableBackend),
            stats,
            config,
        }
    }

    /// Use `backend` to build blueprints
    pub fn with_backend(mut self, backend: impl BlueprintBackend + 'static) -> Self {
        self.backend = Arc::new(backend);
        self
    }

    /// Use `store` to hold routes
    pub fn with_route_store(mut self, store: impl RouteStore + 'static) -> Self {
        self.routes = RouteCache::new(Box::new(store), self.stats.clone());
        self
    }

    /// Compose `delegates` in the default scope, routing every capability they offer
    ///
    /// Earlier delegates take priority: a capability offered by several
    /// delegates goes to the first one.
    pub fn compose_auto<'d>(
        &self,
        delegates: &'d [&'d dyn Delegate],
    ) -> CompositionResult<Composite<'d>> {
        self.compose_auto_in(&self.scope, delegates)
    }

    /// Compose `delegates` in `scope`, routing every capability they offer
    pub fn compose_auto_in<'d>(
        &self,
        scope: &Scope,
        delegates: &'d [&'d dyn Delegate],
    ) -> CompositionResult<Composite<'d>> {
        let table = self.route_table(delegates);
        let blueprint = self.blueprint(scope, table.key())?;
        blueprint.instantiate(delegates, &self.types)
    }

    /// Compose `capabilities` over `delegates` in the default scope
    ///
    /// Without a `route`, capability `i` goes to delegate `i` and the two lists
    /// must have equal length. With a `route`, `route[i]` names the delegate
    /// owning capability `i`.
    pub fn compose_explicit<'d>(
        &self,
        capabilities: &[Capability],
        delegates: &'d [&'d dyn Delegate],
        route: Option<&[usize]>,
    ) -> CompositionResult<Composite<'d>> {
        self.compose_explicit_in(&self.scope, capabilities, delegates, route)
    }

    /// Compose `capabilities` over `delegates` in `scope`
    pub fn compose_explicit_in<'d>(
        &self,
        scope: &Scope,
        capabilities: &[Capability],
        delegates: &'d [&'d dyn Delegate],
        route: Option<&[usize]>,
    ) -> CompositionResult<Composite<'d>> {
        let key = explicit_key(capabilities, delegates.len(), route)?;
        let blueprint = self.blueprint(scope, &key)?;
        blueprint.instantiate(delegates, &self.types)
    }

    /// Stamp a new composite from an existing blueprint
    ///
    /// Neither the route cache nor the backend is consulted; see
    /// [`Blueprint::instantiate`] for the binding cost.
    pub fn instantiate<'d>(
        &self,
        blueprint: &Arc<Blueprint>,
        delegates: &'d [&'d dyn Delegate],
    ) -> CompositionResult<Composite<'d>> {
        blueprint.instantiate(delegates, &self.types)
    }

    /// Blueprint for `key` in `scope`, built by the backend on first request
    pub fn blueprint(&self, scope: &Scope, key: &CompositionKey) -> CompositionResult<Arc<Blueprint>> {
        let backend = &self.backend;
        self.blueprints
            .get_or_build(scope, key, |key| backend.build(key))
    }

    /// Route table auto-derived for `delegates`
    pub fn route_table(&self, delegates: &[&dyn Delegate]) -> Arc<RouteTable> {
        self.routes.get_or_compute(TypeSequence::of(delegates), || {
            let types = self.types.describe_all(delegates);
            RouteTable::resolve(&types, self.config.marker_capabilities)
        })
    }

    /// Capabilities an auto composition of `delegates` would declare
    pub fn capabilities(&self, delegates: &[&dyn Delegate]) -> Vec<Capability> {
        self.route_table(delegates).capabilities()
    }

    /// Owner positions an auto composition of `delegates` would use
    pub fn route(&self, delegates: &[&dyn Delegate]) -> Vec<usize> {
        self.route_table(delegates).route()
    }

    /// Forget every cached type description, route and blueprint
    pub fn clear(&self) {
        debug!(
            routes = self.routes.len(),
            blueprints = self.blueprints.len(),
            "clearing composition caches"
        );
        self.routes.clear();
        self.blueprints.clear();
        self.types.clear();
    }

    /// Forget the blueprints built in `scope`
    pub fn clear_scope(&self, scope: &Scope) {
        self.blueprints.clear_scope(scope);
    }

    /// Cache activity so far
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of cached routes
    pub fn cached_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of built blueprints across scopes
    pub fn cached_blueprints(&self) -> usize {
        self.blueprints.len()
    }

    /// Active configuration
    pub fn config(&self) -> &CompositionConfig {
        &self.config
    }

    /// Scope used when none is given
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

/// Validate an explicit request and turn it into a key
fn explicit_key(
    capabilities: &[Capability],
    delegate_count: usize,
    route: Option<&[usize]>,
) -> CompositionResult<CompositionKey> {
    let mut seen = IndexSet::with_capacity(capabilities.len());
    if let Some(duplicate) = capabilities.iter().find(|capability| !seen.insert(**capability)) {
        return Err(CompositionError::malformed(format!(
            "capability {duplicate} is listed more than once"
        )));
    }

    let route = match route {
        Some(route) => {
            if route.len() != capabilities.len() {
                return Err(CompositionError::malformed(format!(
                    "route has {} entries for {} capabilities",
                    route.len(),
                    capabilities.len()
                )));
            }
            if let Some((position, owner)) = route
                .iter()
                .enumerate()
                .find(|(_, owner)| **owner >= delegate_count)
            {
                return Err(CompositionError::malformed(format!(
                    "route entry {position} points at delegate {owner} but only {delegate_count} delegates were given"
                )));
            }
            route.to_vec()
        }
        None => {
            if delegate_count != capabilities.len() {
                return Err(CompositionError::malformed(format!(
                    "{delegate_count} delegates given for {} capabilities without a route",
                    capabilities.len()
                )));
            }
            (0..capabilities.len()).collect()
        }
    };
    Ok(CompositionKey::new(capabilities.to_vec(), route))
}
