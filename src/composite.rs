// Copyright 2025 Cowboy AI, LLC.

//! Composite instances
//!
//! A [`Composite`] borrows the caller's delegate array and exposes every
//! capability of its blueprint. Asking it for a capability hands back the owning
//! delegate's own trait object, so a call through the composite is the call on
//! the delegate: same arguments, same result, same side effects.

use std::fmt;
use std::sync::Arc;

use crate::blueprint::Blueprint;
use crate::capability::{Capability, Contract};
use crate::delegate::{view_as, Delegate, ErasedAccessor};
use crate::errors::{CompositionError, CompositionResult};

/// A set of delegates seen as one object
pub struct Composite<'d> {
    blueprint: Arc<Blueprint>,
    delegates: &'d [&'d dyn Delegate],
    accessors: Box<[Arc<dyn ErasedAccessor>]>,
}

impl<'d> Composite<'d> {
    pub(crate) fn new(
        blueprint: Arc<Blueprint>,
        delegates: &'d [&'d dyn Delegate],
        accessors: Box<[Arc<dyn ErasedAccessor>]>,
    ) -> Self {
        Self {
            blueprint,
            delegates,
            accessors,
        }
    }

    /// The delegate owning `C`, viewed as `C`
    pub fn get<C: ?Sized + Contract>(&self) -> Option<&'d C> {
        let (slot, owner) = self.blueprint.locate(&Capability::of::<C>())?;
        view_as::<C>(self.accessors[slot].as_ref(), self.delegates[owner])
    }

    /// Like [`Composite::get`], failing when the composite does not declare `C`
    pub fn require<C: ?Sized + Contract>(&self) -> CompositionResult<&'d C> {
        self.get::<C>()
            .ok_or(CompositionError::CapabilityNotDeclared(C::NAME))
    }

    /// Check if the composite declares `C`
    pub fn implements<C: ?Sized + Contract>(&self) -> bool {
        self.declares(&Capability::of::<C>())
    }

    /// Check if the composite declares `capability`
    pub fn declares(&self, capability: &Capability) -> bool {
        self.blueprint.slot_of(capability).is_some()
    }

    /// Position of the delegate owning `C`
    pub fn owner_of<C: ?Sized + Contract>(&self) -> Option<usize> {
        self.blueprint.owner_of(&Capability::of::<C>())
    }

    /// Declared capabilities (a copy)
    pub fn capabilities(&self) -> Vec<Capability> {
        self.blueprint.capabilities().to_vec()
    }

    /// Owner position per declared capability (a copy)
    pub fn route(&self) -> Vec<usize> {
        self.blueprint.route().to_vec()
    }

    /// The bound delegate array
    pub fn delegates(&self) -> &'d [&'d dyn Delegate] {
        self.delegates
    }

    /// Blueprint this composite was stamped from
    pub fn blueprint(&self) -> &Arc<Blueprint> {
        &self.blueprint
    }

    /// Number of declared capabilities
    pub fn len(&self) -> usize {
        self.blueprint.len()
    }

    /// Check if the composite declares nothing
    pub fn is_empty(&self) -> bool {
        self.blueprint.is_empty()
    }
}

impl fmt::Debug for Composite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("route", &self.blueprint.key().to_string())
            .field("delegates", &self.delegates.len())
            .finish()
    }
}
