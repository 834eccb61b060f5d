// Copyright 2025 Cowboy AI, LLC.

//! Capability collection over a delegate type's ancestry

use indexmap::IndexSet;

use crate::capability::Capability;
use crate::delegate::DelegateType;

/// Collect every capability a delegate type satisfies
///
/// Levels are walked from the concrete type toward its outermost base. The
/// result keeps first-occurrence order, so capabilities declared by the
/// concrete type come before inherited ones.
pub fn collect(delegate_type: &DelegateType) -> IndexSet<Capability> {
    delegate_type
        .levels()
        .iter()
        .flat_map(|level| level.capabilities())
        .collect()
}
