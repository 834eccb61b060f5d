// Copyright 2025 Cowboy AI, LLC.

//! Composite blueprints
//!
//! A blueprint is the reusable half of a composite: the capability list, the
//! owner of each capability and a slot index for constant-time dispatch. It is
//! produced once per composition key by a [`BlueprintBackend`] and then bound to
//! any number of delegate arrays.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::capability::Capability;
use crate::composite::Composite;
use crate::delegate::Delegate;
use crate::errors::{CompositionError, CompositionResult};
use crate::key::CompositionKey;
use crate::registry::TypeRegistry;

/// Builds blueprints for composition keys
///
/// The cache calls `build` at most once per key and scope at a time; a failed
/// build is not remembered.
pub trait BlueprintBackend: Send + Sync {
    /// Build the blueprint for `key`
    fn build(&self, key: &CompositionKey) -> CompositionResult<Blueprint>;
}

/// Backend that builds a plain dispatch table
#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchTableBackend;

impl BlueprintBackend for DispatchTableBackend {
    fn build(&self, key: &CompositionKey) -> CompositionResult<Blueprint> {
        let blueprint = Blueprint::new(key.clone());
        if blueprint.len() != key.len() {
            return Err(CompositionError::build_failure(
                key,
                "capabilities must be unique within a composite",
            ));
        }
        Ok(blueprint)
    }
}

/// Reusable dispatch table for one composition key
pub struct Blueprint {
    key: CompositionKey,
    slots: IndexMap<Capability, usize>,
}

impl Blueprint {
    /// Index the capabilities of `key`
    pub fn new(key: CompositionKey) -> Self {
        let slots = key
            .capabilities()
            .iter()
            .copied()
            .zip(key.route().iter().copied())
            .collect();
        Self { key, slots }
    }

    /// Key this blueprint was built for
    pub fn key(&self) -> &CompositionKey {
        &self.key
    }

    /// Declared capabilities in order
    pub fn capabilities(&self) -> &[Capability] {
        self.key.capabilities()
    }

    /// Owner position per capability
    pub fn route(&self) -> &[usize] {
        self.key.route()
    }

    /// Dispatch slot of a capability
    pub fn slot_of(&self, capability: &Capability) -> Option<usize> {
        self.slots.get_index_of(capability)
    }

    /// Owner position of a capability
    pub fn owner_of(&self, capability: &Capability) -> Option<usize> {
        self.slots.get(capability).copied()
    }

    pub(crate) fn locate(&self, capability: &Capability) -> Option<(usize, usize)> {
        self.slots
            .get_full(capability)
            .map(|(slot, _, owner)| (slot, *owner))
    }

    /// Number of declared capabilities
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the blueprint declares nothing
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bind a delegate array, checking every owner implements what it is routed
    ///
    /// Capabilities and routes are never re-derived here. Binding does one
    /// accessor lookup per routed capability against the owner's cached type
    /// description, so its cost is linear in the capability count; that lookup
    /// is also the check behind [`CompositionError::CapabilityNotImplemented`].
    pub fn instantiate<'d>(
        self: &Arc<Self>,
        delegates: &'d [&'d dyn Delegate],
        types: &TypeRegistry,
    ) -> CompositionResult<Composite<'d>> {
        let needed = self.key.min_delegates();
        if delegates.len() < needed {
            return Err(CompositionError::malformed(format!(
                "blueprint routes to {needed} delegates but only {} were given",
                delegates.len()
            )));
        }
        let accessors = self
            .slots
            .iter()
            .map(|(capability, &owner)| {
                let delegate_type = types.describe(delegates[owner]);
                delegate_type.accessor(capability).cloned().ok_or(
                    CompositionError::CapabilityNotImplemented {
                        capability: capability.name(),
                        delegate: owner,
                        delegate_type: delegate_type.name(),
                    },
                )
            })
            .collect::<CompositionResult<Vec<_>>>()?;
        Ok(Composite::new(self.clone(), delegates, accessors.into_boxed_slice()))
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint").field("key", &self.key.to_string()).finish()
    }
}
