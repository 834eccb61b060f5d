// Copyright 2025 Cowboy AI, LLC.

//! Capability descriptors
//!
//! A capability is a trait contract a delegate can satisfy. It is described by
//! implementing [`Contract`] for the trait object type (`dyn Trait`), which gives
//! the contract a stable identity and a list of its operations.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marks a trait object type as a capability contract
///
/// # Example
///
/// ```
/// use cim_composite::{Capability, Contract};
///
/// trait Print {
///     fn print(&self, line: &str) -> String;
/// }
///
/// impl Contract for dyn Print {
///     const NAME: &'static str = "Print";
///     const OPERATIONS: &'static [&'static str] = &["print"];
/// }
///
/// let print = Capability::of::<dyn Print>();
/// assert_eq!(print.name(), "Print");
/// assert!(!print.is_marker());
/// ```
pub trait Contract: 'static {
    /// Human readable contract name
    const NAME: &'static str;

    /// Names of the operations the contract declares
    const OPERATIONS: &'static [&'static str];
}

/// Opaque, comparable descriptor of a capability contract
///
/// Capabilities compare by contract identity only. Two contracts declaring the
/// same operations are still distinct capabilities.
#[derive(Clone, Copy)]
pub struct Capability {
    id: TypeId,
    name: &'static str,
    operations: &'static [&'static str],
}

impl Capability {
    /// Describe the contract `C`
    pub fn of<C: ?Sized + Contract>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: C::NAME,
            operations: C::OPERATIONS,
        }
    }

    /// Contract name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Operation names declared by the contract
    pub fn operations(&self) -> &'static [&'static str] {
        self.operations
    }

    /// A marker capability declares no operations
    pub fn is_marker(&self) -> bool {
        self.operations.is_empty()
    }

    /// Identity of the contract's trait object type
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Capability {}

impl Hash for Capability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("operations", &self.operations)
            .finish()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
