// Copyright 2025 Cowboy AI, LLC.

mod support;

use std::sync::Arc;

use cim_composite::{collect, CompositionContext, Delegate, DelegateType};
use proptest::prelude::*;
use support::*;

/// Every fixture delegate, indexed by the generated sequence
fn fixtures() -> Vec<Box<dyn Delegate>> {
    vec![
        Box::new(Printer::new("p")),
        Box::new(Logger::default()),
        Box::new(FileLogger::default()),
        Box::new(Counter::default()),
        Box::new(Inert),
    ]
}

fn delegate_sequence() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..5, 0..8)
}

fn described(delegates: &[&dyn Delegate]) -> Vec<DelegateType> {
    delegates.iter().map(|d| d.describe()).collect()
}

proptest! {
    #[test]
    fn owner_is_the_earliest_offering_delegate(sequence in delegate_sequence()) {
        let pool = fixtures();
        let delegates: Vec<&dyn Delegate> = sequence.iter().map(|&i| pool[i].as_ref()).collect();
        let types = described(&delegates);
        let context = CompositionContext::new();

        let table = context.route_table(&delegates);
        for (capability, owner) in table.iter() {
            prop_assert!(types[owner].implements(&capability));
            prop_assert!(types[..owner].iter().all(|t| !t.implements(&capability)));
        }
    }

    #[test]
    fn every_offered_capability_is_routed_once(sequence in delegate_sequence()) {
        let pool = fixtures();
        let delegates: Vec<&dyn Delegate> = sequence.iter().map(|&i| pool[i].as_ref()).collect();
        let context = CompositionContext::new();

        let mut offered = Vec::new();
        for delegate_type in described(&delegates) {
            for capability in collect(&delegate_type) {
                if !offered.contains(&capability) {
                    offered.push(capability);
                }
            }
        }
        prop_assert_eq!(context.capabilities(&delegates), offered);
        prop_assert_eq!(context.route(&delegates).len(), context.capabilities(&delegates).len());
    }

    #[test]
    fn routes_are_cached_per_type_sequence(sequence in delegate_sequence()) {
        let pool = fixtures();
        let again = fixtures();
        let first: Vec<&dyn Delegate> = sequence.iter().map(|&i| pool[i].as_ref()).collect();
        let second: Vec<&dyn Delegate> = sequence.iter().map(|&i| again[i].as_ref()).collect();
        let context = CompositionContext::new();

        let a = context.route_table(&first);
        let b = context.route_table(&second);
        prop_assert!(Arc::ptr_eq(&a, &b));
        prop_assert_eq!(context.cached_routes(), 1);
        prop_assert_eq!(context.stats().route_misses, 1);
    }

    #[test]
    fn composed_views_match_routed_owner(sequence in delegate_sequence()) {
        let pool = fixtures();
        let delegates: Vec<&dyn Delegate> = sequence.iter().map(|&i| pool[i].as_ref()).collect();
        let context = CompositionContext::new();

        let composite = context.compose_auto(&delegates).unwrap();
        prop_assert_eq!(composite.route(), context.route(&delegates));
        prop_assert_eq!(composite.implements::<dyn Print>(), composite.get::<dyn Print>().is_some());
        prop_assert_eq!(
            composite.implements::<dyn Count>(),
            sequence.iter().any(|&i| i == 2 || i == 3)
        );
    }
}
