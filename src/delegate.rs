// Copyright 2025 Cowboy AI, LLC.

//! Delegates and their type descriptors
//!
//! A delegate is any value whose concrete type describes the capabilities it
//! provides. The description is a [`DelegateType`]: an ordered chain of levels,
//! the delegate's own level first, followed by the levels of every base type it
//! embeds. Each declared capability carries a typed accessor that turns the
//! delegate (seen as `&dyn Any`) back into the capability's trait object.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use crate::capability::{Capability, Contract};

/// Trait for values that can take part in a composite
///
/// # Example
///
/// ```
/// use cim_composite::{Contract, Delegate, DelegateType};
/// use std::any::Any;
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
/// struct Printer;
///
/// impl Print for Printer {
///     fn print(&self, line: &str) -> String { format!("> {line}") }
/// }
///
/// impl Delegate for Printer {
///     fn as_any(&self) -> &dyn Any { self }
///     fn describe(&self) -> DelegateType {
///         DelegateType::builder::<Printer>()
///             .implements::<dyn Print>(|p| p)
///             .build()
///     }
/// }
/// ```
pub trait Delegate: Any + Send + Sync {
    /// Get the delegate as Any for downcasting
    ///
    /// Composition never relies on this view: caches are keyed by the
    /// delegate's concrete type and accessors downcast the delegate itself.
    fn as_any(&self) -> &dyn Any;

    /// Describe the capabilities of this delegate's concrete type
    fn describe(&self) -> DelegateType;
}

/// Turns an outer delegate into one of its embedded base values
pub(crate) type Projection =
    Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync>;

fn projection<F>(project: F) -> Projection
where
    F: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync + 'static,
{
    Arc::new(project)
}

/// Typed view from a type-erased delegate to the capability `C`
pub(crate) struct Accessor<C: ?Sized + 'static> {
    view: Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a C> + Send + Sync>,
}

impl<C: ?Sized + 'static> Accessor<C> {
    fn new<F>(view: F) -> Self
    where
        F: for<'a> Fn(&'a dyn Any) -> Option<&'a C> + Send + Sync + 'static,
    {
        Self {
            view: Arc::new(view),
        }
    }

    /// Apply the view to a delegate
    pub(crate) fn view<'a>(&self, delegate: &'a dyn Any) -> Option<&'a C> {
        (self.view)(delegate)
    }
}

/// Accessor with its capability type erased
pub(crate) trait ErasedAccessor: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Reach the same capability through an embedding outer type
    fn rebase(&self, projection: &Projection) -> Arc<dyn ErasedAccessor>;
}

impl<C: ?Sized + 'static> ErasedAccessor for Accessor<C> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn rebase(&self, projection: &Projection) -> Arc<dyn ErasedAccessor> {
        let view = self.view.clone();
        let projection = projection.clone();
        Arc::new(Accessor::<C>::new(move |delegate| {
            projection(delegate).and_then(|base| view(base))
        }))
    }
}

#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) capability: Capability,
    pub(crate) accessor: Arc<dyn ErasedAccessor>,
}

/// One level of a delegate type's ancestry
#[derive(Clone)]
pub struct Level {
    name: &'static str,
    type_id: TypeId,
    bindings: Vec<Binding>,
}

impl Level {
    /// Name of the type declaring this level
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type declaring this level
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Capabilities declared directly at this level, in declaration order
    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.bindings.iter().map(|binding| binding.capability)
    }
}

/// Capability description of a concrete delegate type
#[derive(Clone)]
pub struct DelegateType {
    name: &'static str,
    type_id: TypeId,
    levels: Vec<Level>,
}

impl DelegateType {
    /// Start describing `T`, named after its Rust type
    pub fn builder<T: Delegate>() -> DelegateTypeBuilder<T> {
        Self::builder_named::<T>(std::any::type_name::<T>())
    }

    /// Start describing `T` under an explicit name
    pub fn builder_named<T: Delegate>(name: &'static str) -> DelegateTypeBuilder<T> {
        DelegateTypeBuilder {
            name,
            own: Vec::new(),
            bases: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Name of the described type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Concrete type described
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Ancestry levels, concrete type first
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Check if any level declares the capability
    pub fn implements(&self, capability: &Capability) -> bool {
        self.binding(capability).is_some()
    }

    pub(crate) fn accessor(&self, capability: &Capability) -> Option<&Arc<dyn ErasedAccessor>> {
        self.binding(capability).map(|binding| &binding.accessor)
    }

    fn binding(&self, capability: &Capability) -> Option<&Binding> {
        self.levels
            .iter()
            .flat_map(|level| level.bindings.iter())
            .find(|binding| binding.capability == *capability)
    }
}

impl fmt::Debug for DelegateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<(&str, Vec<&str>)> = self
            .levels
            .iter()
            .map(|level| (level.name, level.capabilities().map(|c| c.name()).collect()))
            .collect();
        f.debug_struct("DelegateType")
            .field("name", &self.name)
            .field("levels", &levels)
            .finish()
    }
}

/// Builder for [`DelegateType`]
pub struct DelegateTypeBuilder<T> {
    name: &'static str,
    own: Vec<Binding>,
    bases: Vec<Level>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Delegate> DelegateTypeBuilder<T> {
    /// Declare that `T` provides the capability `C` through `view`
    ///
    /// Declaring the same capability twice keeps the first declaration.
    pub fn implements<C>(mut self, view: fn(&T) -> &C) -> Self
    where
        C: ?Sized + Contract,
    {
        let capability = Capability::of::<C>();
        if self.own.iter().any(|binding| binding.capability == capability) {
            return self;
        }
        let accessor = Accessor::<C>::new(move |delegate| delegate.downcast_ref::<T>().map(view));
        self.own.push(Binding {
            capability,
            accessor: Arc::new(accessor),
        });
        self
    }

    /// Inherit every level of `base`, reached through the embedded value `project` returns
    pub fn extends<B: Delegate>(mut self, base: DelegateType, project: fn(&T) -> &B) -> Self {
        if base.type_id != TypeId::of::<B>() {
            warn!(
                outer = self.name,
                base = base.name,
                "base descriptor does not describe the projected type"
            );
        }
        let projection = projection(move |delegate| {
            delegate
                .downcast_ref::<T>()
                .map(|outer| project(outer) as &dyn Any)
        });
        self.bases.extend(base.levels.into_iter().map(|level| Level {
            name: level.name,
            type_id: level.type_id,
            bindings: level
                .bindings
                .iter()
                .map(|binding| Binding {
                    capability: binding.capability,
                    accessor: binding.accessor.rebase(&projection),
                })
                .collect(),
        }));
        self
    }

    /// Finish the description
    pub fn build(self) -> DelegateType {
        let mut levels = Vec::with_capacity(self.bases.len() + 1);
        levels.push(Level {
            name: self.name,
            type_id: TypeId::of::<T>(),
            bindings: self.own,
        });
        levels.extend(self.bases);
        DelegateType {
            name: self.name,
            type_id: TypeId::of::<T>(),
            levels,
        }
    }
}

/// View `delegate` as the capability `C` using its type's accessor
pub(crate) fn view_as<'a, C: ?Sized + 'static>(
    accessor: &dyn ErasedAccessor,
    delegate: &'a dyn Delegate,
) -> Option<&'a C> {
    accessor
        .as_any()
        .downcast_ref::<Accessor<C>>()
        .and_then(|accessor| accessor.view(delegate as &dyn Any))
}
