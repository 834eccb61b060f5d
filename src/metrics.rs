// Copyright 2025 Cowboy AI, LLC.

//! Counters for route and blueprint cache activity

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Cache activity counters shared by a composition context
#[derive(Debug, Default)]
pub struct CacheStats {
    route_hits: AtomicU64,
    route_misses: AtomicU64,
    blueprint_hits: AtomicU64,
    blueprint_misses: AtomicU64,
    blueprint_waits: AtomicU64,
    builds_succeeded: AtomicU64,
    builds_failed: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatsSnapshot {
    /// Route lookups served from cache
    pub route_hits: u64,
    /// Route lookups that resolved a route
    pub route_misses: u64,
    /// Blueprint lookups served from cache
    pub blueprint_hits: u64,
    /// Blueprint lookups that started a build
    pub blueprint_misses: u64,
    /// Blueprint lookups that waited on another caller's build
    pub blueprint_waits: u64,
    /// Builds that produced a blueprint
    pub builds_succeeded: u64,
    /// Builds that failed
    pub builds_failed: u64,
}

impl CacheStatsSnapshot {
    /// Builds started, whatever their outcome
    pub fn builds(&self) -> u64 {
        self.builds_succeeded + self.builds_failed
    }
}

impl CacheStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_route_hit(&self) {
        self.route_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_route_miss(&self) {
        self.route_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_blueprint_hit(&self) {
        self.blueprint_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_blueprint_miss(&self) {
        self.blueprint_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_blueprint_wait(&self) {
        self.blueprint_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_build(&self, succeeded: bool) {
        if succeeded {
            self.builds_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.builds_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            route_hits: self.route_hits.load(Ordering::Relaxed),
            route_misses: self.route_misses.load(Ordering::Relaxed),
            blueprint_hits: self.blueprint_hits.load(Ordering::Relaxed),
            blueprint_misses: self.blueprint_misses.load(Ordering::Relaxed),
            blueprint_waits: self.blueprint_waits.load(Ordering::Relaxed),
            builds_succeeded: self.builds_succeeded.load(Ordering::Relaxed),
            builds_failed: self.builds_failed.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter
    pub fn reset(&self) {
        for counter in [
            &self.route_hits,
            &self.route_misses,
            &self.blueprint_hits,
            &self.blueprint_misses,
            &self.blueprint_waits,
            &self.builds_succeeded,
            &self.builds_failed,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
