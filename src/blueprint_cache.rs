// Copyright 2025 Cowboy AI, LLC.

//! Per-scope blueprint cache with single-flight builds
//!
//! Each (scope, key) pair is built at most once at a time. The first caller to
//! miss becomes the leader and runs the build outside any map lock; callers that
//! arrive while the build is running wait on the leader's flight and receive the
//! same outcome. Successful blueprints stay cached; failures are handed to every
//! waiter of that attempt and then forgotten, so a later request retries.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, trace, warn};

use crate::blueprint::Blueprint;
use crate::errors::{CompositionError, CompositionResult};
use crate::key::{CompositionKey, Scope};
use crate::metrics::CacheStats;

type CacheKey = (Scope, CompositionKey);
type Outcome = CompositionResult<Arc<Blueprint>>;

enum Slot {
    Ready(Arc<Blueprint>),
    Building(Arc<Flight>),
}

impl Slot {
    fn is_flight(&self, flight: &Arc<Flight>) -> bool {
        matches!(self, Slot::Building(current) if Arc::ptr_eq(current, flight))
    }
}

/// An in-progress build other callers can wait on
struct Flight {
    leader: ThreadId,
    outcome: Mutex<Option<Outcome>>,
    done: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self {
            leader: thread::current().id(),
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn complete(&self, outcome: Outcome) {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(outcome);
        }
        drop(slot);
        self.done.notify_all();
    }

    fn wait(&self) -> Outcome {
        let mut slot = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            slot = self.done.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Completes a flight with a failure if its build unwinds
struct LeaderGuard<'c> {
    entries: &'c DashMap<CacheKey, Slot>,
    cache_key: &'c CacheKey,
    flight: &'c Arc<Flight>,
    armed: bool,
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.entries
            .remove_if(self.cache_key, |_, slot| slot.is_flight(self.flight));
        self.flight.complete(Err(CompositionError::build_failure(
            &self.cache_key.1,
            "blueprint build panicked",
        )));
    }
}

enum Claim {
    Hit(Arc<Blueprint>),
    Wait(Arc<Flight>),
    Lead(Arc<Flight>),
}

/// Blueprints cached per scope and composition key
pub struct BlueprintCache {
    entries: DashMap<CacheKey, Slot>,
    stats: Arc<CacheStats>,
}

impl BlueprintCache {
    /// Create an empty cache
    pub fn new(stats: Arc<CacheStats>) -> Self {
        Self {
            entries: DashMap::new(),
            stats,
        }
    }

    /// Return the blueprint for `key` in `scope`, building it with `build` on a miss
    ///
    /// `build` runs at most once for concurrent requests of the same scope and
    /// key. It must not request the same scope and key again; such a request
    /// fails instead of waiting on itself.
    pub fn get_or_build<F>(&self, scope: &Scope, key: &CompositionKey, build: F) -> Outcome
    where
        F: FnOnce(&CompositionKey) -> CompositionResult<Blueprint>,
    {
        let cache_key = (scope.clone(), key.clone());
        let claim = match self.entries.entry(cache_key.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Ready(blueprint) => Claim::Hit(blueprint.clone()),
                Slot::Building(flight) => Claim::Wait(flight.clone()),
            },
            Entry::Vacant(entry) => {
                let flight = Arc::new(Flight::new());
                entry.insert(Slot::Building(flight.clone()));
                Claim::Lead(flight)
            }
        };

        match claim {
            Claim::Hit(blueprint) => {
                trace!(%scope, %key, "blueprint cache hit");
                self.stats.record_blueprint_hit();
                Ok(blueprint)
            }
            Claim::Wait(flight) => {
                if flight.leader == thread::current().id() {
                    warn!(%scope, %key, "re-entrant blueprint request");
                    return Err(CompositionError::build_failure(
                        key,
                        "re-entrant request for a blueprint that is being built",
                    ));
                }
                debug!(%scope, %key, "waiting for in-flight blueprint build");
                self.stats.record_blueprint_wait();
                flight.wait()
            }
            Claim::Lead(flight) => self.lead(&cache_key, &flight, build),
        }
    }

    fn lead<F>(&self, cache_key: &CacheKey, flight: &Arc<Flight>, build: F) -> Outcome
    where
        F: FnOnce(&CompositionKey) -> CompositionResult<Blueprint>,
    {
        let (scope, key) = cache_key;
        debug!(%scope, %key, "building blueprint");
        self.stats.record_blueprint_miss();

        let mut guard = LeaderGuard {
            entries: &self.entries,
            cache_key,
            flight,
            armed: true,
        };
        let outcome = build(key).map(Arc::new);
        guard.armed = false;

        match &outcome {
            Ok(blueprint) => {
                self.entries
                    .insert(cache_key.clone(), Slot::Ready(blueprint.clone()));
                self.stats.record_build(true);
            }
            Err(err) => {
                warn!(%scope, %key, error = %err, "blueprint build failed");
                self.entries
                    .remove_if(cache_key, |_, slot| slot.is_flight(flight));
                self.stats.record_build(false);
            }
        }
        flight.complete(outcome.clone());
        outcome
    }

    /// Cached blueprint for `key` in `scope`, without building
    pub fn get(&self, scope: &Scope, key: &CompositionKey) -> Option<Arc<Blueprint>> {
        let cache_key = (scope.clone(), key.clone());
        match self.entries.get(&cache_key)?.value() {
            Slot::Ready(blueprint) => Some(blueprint.clone()),
            Slot::Building(_) => None,
        }
    }

    /// Check if a built blueprint is cached for `key` in `scope`
    pub fn contains(&self, scope: &Scope, key: &CompositionKey) -> bool {
        self.get(scope, key).is_some()
    }

    /// Drop every built blueprint; in-flight builds are left to finish
    pub fn clear(&self) {
        self.entries
            .retain(|_, slot| matches!(slot, Slot::Building(_)));
    }

    /// Drop the built blueprints of one scope
    pub fn clear_scope(&self, scope: &Scope) {
        self.entries
            .retain(|(entry_scope, _), slot| entry_scope != scope || matches!(slot, Slot::Building(_)));
    }

    /// Number of built blueprints across all scopes
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.value(), Slot::Ready(_)))
            .count()
    }

    /// Check if no blueprint is built
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
