// Copyright 2025 Cowboy AI, LLC.

//! Cache of delegate type descriptions keyed by concrete type

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;

use crate::delegate::{Delegate, DelegateType};

/// Remembers the [`DelegateType`] of every concrete delegate type seen
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: DashMap<TypeId, Arc<DelegateType>>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Description of the delegate's concrete type, describing it on first sight
    pub fn describe(&self, delegate: &dyn Delegate) -> Arc<DelegateType> {
        let type_id = (delegate as &dyn Any).type_id();
        if let Some(described) = self.types.get(&type_id) {
            return described.value().clone();
        }
        let described = Arc::new(delegate.describe());
        self.types.entry(type_id).or_insert(described).value().clone()
    }

    /// Descriptions for each delegate, in order
    pub fn describe_all(&self, delegates: &[&dyn Delegate]) -> Vec<Arc<DelegateType>> {
        delegates.iter().map(|delegate| self.describe(*delegate)).collect()
    }

    /// Forget every description
    pub fn clear(&self) {
        self.types.clear();
    }

    /// Number of described types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no type has been described
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DESCRIBED: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Delegate for Counted {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn describe(&self) -> DelegateType {
            DESCRIBED.fetch_add(1, Ordering::SeqCst);
            DelegateType::builder_named::<Counted>("Counted").build()
        }
    }

    #[test]
    fn test_describe_once_per_type() {
        let registry = TypeRegistry::new();
        let first = registry.describe(&Counted);
        let second = registry.describe(&Counted);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(DESCRIBED.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);

        registry.clear();
        assert!(registry.is_empty());
    }

    struct Plain;

    impl Delegate for Plain {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn describe(&self) -> DelegateType {
            DelegateType::builder_named::<Plain>("Plain").build()
        }
    }

    struct Masked {
        inner: Plain,
    }

    impl Delegate for Masked {
        fn as_any(&self) -> &dyn Any {
            &self.inner
        }

        fn describe(&self) -> DelegateType {
            DelegateType::builder_named::<Masked>("Masked").build()
        }
    }

    #[test]
    fn test_keyed_by_concrete_type() {
        let registry = TypeRegistry::new();
        let masked = registry.describe(&Masked { inner: Plain });
        let plain = registry.describe(&Plain);

        assert_eq!(masked.name(), "Masked");
        assert_eq!(DelegateType::type_id(&masked), TypeId::of::<Masked>());
        assert_eq!(plain.name(), "Plain");
        assert_eq!(registry.len(), 2);
    }
}
