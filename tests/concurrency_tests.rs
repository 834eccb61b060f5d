// Copyright 2025 Cowboy AI, LLC.

mod support;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use cim_composite::{CompositionContext, Delegate, Scope};
use support::*;

const THREADS: usize = 8;

#[test]
fn concurrent_first_requests_build_once() {
    let backend = CountingBackend::slow(Duration::from_millis(100));
    let context = CompositionContext::new().with_backend(backend.clone());
    let barrier = Barrier::new(THREADS);

    let blueprints: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let context = &context;
                let barrier = &barrier;
                s.spawn(move || {
                    let printer = Printer::new(&format!("thread-{i}"));
                    let logger = Logger::default();
                    let delegates: [&dyn Delegate; 2] = [&printer, &logger];
                    barrier.wait();
                    let composite = context.compose_auto(&delegates).unwrap();
                    assert_eq!(
                        composite.require::<dyn Print>().unwrap().print("x"),
                        Ok(format!("thread-{i}: x"))
                    );
                    composite.blueprint().clone()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(backend.builds(), 1);
    assert!(blueprints.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));

    let stats = context.stats();
    assert_eq!(stats.builds_succeeded, 1);
    assert_eq!(stats.blueprint_misses, 1);
}

#[test]
fn failed_build_reaches_every_waiter_and_is_retried() {
    let backend = CountingBackend {
        delay: Some(Duration::from_millis(200)),
        ..CountingBackend::failing(1)
    };
    let context = CompositionContext::new().with_backend(backend.clone());
    let barrier = Barrier::new(THREADS);

    let failures = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let context = &context;
                let barrier = &barrier;
                s.spawn(move || {
                    let printer = Printer::new("p");
                    let delegates: [&dyn Delegate; 1] = [&printer];
                    barrier.wait();
                    context.compose_auto(&delegates).map(|_| ()).unwrap_err()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(backend.builds(), 1);
    assert!(failures.iter().all(|err| err.is_build_failure()));
    assert!(failures.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(context.cached_blueprints(), 0);

    let printer = Printer::new("p");
    let delegates: [&dyn Delegate; 1] = [&printer];
    assert!(context.compose_auto(&delegates).is_ok());
    assert_eq!(backend.builds(), 2);
}

#[test]
fn distinct_keys_build_independently() {
    let backend = CountingBackend::slow(Duration::from_millis(20));
    let context = CompositionContext::new().with_backend(backend.clone());
    let barrier = Barrier::new(4);

    thread::scope(|s| {
        for i in 0..4 {
            let context = &context;
            let barrier = &barrier;
            s.spawn(move || {
                let printer = Printer::new("p");
                let counter = Counter::default();
                let delegates: [&dyn Delegate; 2] = [&printer, &counter];
                let scope = Scope::new(format!("tenant-{i}"));
                barrier.wait();
                let composite = context.compose_auto_in(&scope, &delegates).unwrap();
                assert_eq!(composite.require::<dyn Count>().unwrap().increment(), 1);
            });
        }
    });

    assert_eq!(backend.builds(), 4);
    assert_eq!(context.cached_blueprints(), 4);
    assert_eq!(context.cached_routes(), 1);
}

#[test]
fn cached_composition_is_shared_across_threads() {
    let context = CompositionContext::new();
    let warm_printer = Printer::new("warm");
    let warm: [&dyn Delegate; 1] = [&warm_printer];
    let expected = context.compose_auto(&warm).unwrap().blueprint().clone();

    thread::scope(|s| {
        for _ in 0..THREADS {
            let context = &context;
            let expected = &expected;
            s.spawn(move || {
                let printer = Printer::new("p");
                let delegates: [&dyn Delegate; 1] = [&printer];
                for _ in 0..100 {
                    let composite = context.compose_auto(&delegates).unwrap();
                    assert!(Arc::ptr_eq(composite.blueprint(), expected));
                }
            });
        }
    });

    assert_eq!(context.stats().builds(), 1);
}
