// Copyright 2025 Cowboy AI, LLC.

//! Composition keys and isolation scopes

use std::fmt;
use std::sync::Arc;

use crate::capability::Capability;
use crate::errors::{CompositionError, CompositionResult};

/// Structural identity of a composition
///
/// Equal keys describe interchangeable composites: the same capabilities in the
/// same order, each owned by the same delegate position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositionKey {
    capabilities: Arc<[Capability]>,
    route: Arc<[usize]>,
}

impl CompositionKey {
    /// Create a key from parallel capability and route lists
    ///
    /// Fails with [`CompositionError::MalformedRequest`] when the lists differ in length.
    pub fn try_new(
        capabilities: impl Into<Arc<[Capability]>>,
        route: impl Into<Arc<[usize]>>,
    ) -> CompositionResult<Self> {
        let capabilities: Arc<[Capability]> = capabilities.into();
        let route: Arc<[usize]> = route.into();
        if capabilities.len() != route.len() {
            return Err(CompositionError::malformed(format!(
                "route has {} entries for {} capabilities",
                route.len(),
                capabilities.len()
            )));
        }
        Ok(Self::new(capabilities, route))
    }

    /// Create a key from lists already known to be parallel
    pub(crate) fn new(capabilities: impl Into<Arc<[Capability]>>, route: impl Into<Arc<[usize]>>) -> Self {
        let key = Self {
            capabilities: capabilities.into(),
            route: route.into(),
        };
        debug_assert_eq!(key.capabilities.len(), key.route.len());
        key
    }

    /// Key routing capability `i` to delegate `i`
    pub fn identity(capabilities: &[Capability]) -> Self {
        Self::new(capabilities, (0..capabilities.len()).collect::<Vec<_>>())
    }

    /// Capabilities in exposure order
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Owner position for each capability
    pub fn route(&self) -> &[usize] {
        &self.route
    }

    /// Number of routed capabilities
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if the key routes nothing
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Smallest delegate count this key can be bound to
    pub fn min_delegates(&self) -> usize {
        self.route.iter().max().map_or(0, |owner| owner + 1)
    }
}

impl fmt::Display for CompositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (capability, owner)) in self.capabilities.iter().zip(self.route.iter()).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{capability} -> {owner}")?;
        }
        f.write_str("]")
    }
}

/// Isolation boundary for built blueprints
///
/// Blueprints built under one scope are never handed out under another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(Arc<str>);

impl Scope {
    /// Create a named scope
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Scope name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new("default")
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
