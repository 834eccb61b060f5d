// Copyright 2025 Cowboy AI, LLC.

//! Route resolution
//!
//! A route assigns every capability offered by an ordered delegate list to the
//! delegate that owns it. Earlier delegates take priority: once a capability is
//! claimed, later delegates offering it are ignored for that capability.

use std::any::{Any, TypeId};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::capability::Capability;
use crate::collector::collect;
use crate::config::MarkerPolicy;
use crate::delegate::{Delegate, DelegateType};
use crate::key::CompositionKey;

/// Ordered concrete types of a delegate list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSequence(Arc<[TypeId]>);

impl TypeSequence {
    /// Read the concrete types of `delegates`, in order
    pub fn of(delegates: &[&dyn Delegate]) -> Self {
        Self(
            delegates
                .iter()
                .map(|delegate| (*delegate as &dyn Any).type_id())
                .collect(),
        )
    }

    /// Types in delegate order
    pub fn types(&self) -> &[TypeId] {
        &self.0
    }

    /// Number of delegates
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Immutable capability-to-owner assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    owners: IndexMap<Capability, usize>,
    key: CompositionKey,
}

impl RouteTable {
    /// Resolve a route over delegate types with the first-delegate-wins policy
    pub fn resolve(delegate_types: &[Arc<DelegateType>], markers: MarkerPolicy) -> Self {
        let mut owners = IndexMap::new();
        for (index, delegate_type) in delegate_types.iter().enumerate() {
            for capability in collect(delegate_type) {
                if !markers.admits(capability.is_marker()) {
                    continue;
                }
                owners.entry(capability).or_insert(index);
            }
        }
        debug!(
            delegates = delegate_types.len(),
            capabilities = owners.len(),
            "resolved route"
        );
        Self::from_owners(owners)
    }

    /// Take a caller supplied route as-is
    ///
    /// `capabilities` and `route` are parallel lists; the caller has already
    /// checked their lengths and the uniqueness of `capabilities`.
    pub fn explicit(capabilities: &[Capability], route: &[usize]) -> Self {
        let owners = capabilities.iter().copied().zip(route.iter().copied()).collect();
        Self::from_owners(owners)
    }

    fn from_owners(owners: IndexMap<Capability, usize>) -> Self {
        let capabilities: Vec<Capability> = owners.keys().copied().collect();
        let route: Vec<usize> = owners.values().copied().collect();
        Self {
            key: CompositionKey::new(capabilities, route),
            owners,
        }
    }

    /// Capabilities in discovery order (a copy)
    pub fn capabilities(&self) -> Vec<Capability> {
        self.key.capabilities().to_vec()
    }

    /// Owner position per capability (a copy)
    pub fn route(&self) -> Vec<usize> {
        self.key.route().to_vec()
    }

    /// Owner position of a capability
    pub fn owner_of(&self, capability: &Capability) -> Option<usize> {
        self.owners.get(capability).copied()
    }

    /// Iterate `(capability, owner)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (Capability, usize)> + '_ {
        self.owners.iter().map(|(capability, owner)| (*capability, *owner))
    }

    /// Number of routed capabilities
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Check if nothing is routed
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Composition key for this route
    pub fn key(&self) -> &CompositionKey {
        &self.key
    }
}
