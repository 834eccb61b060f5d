// Copyright 2025 Cowboy AI, LLC.

//! Delegates and backends shared by the integration tests

#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cim_composite::{
    Blueprint, BlueprintBackend, CompositionError, CompositionKey, CompositionResult, Contract,
    Delegate, DelegateType, DispatchTableBackend,
};

pub trait Print {
    fn print(&self, line: &str) -> Result<String, String>;
}

pub trait Log {
    fn log(&self, line: &str) -> usize;
    fn lines(&self) -> Vec<String>;
}

pub trait Count {
    fn increment(&self) -> usize;
}

/// Marker contract with no operations
pub trait Audited {}

impl Contract for dyn Print {
    const NAME: &'static str = "Print";
    const OPERATIONS: &'static [&'static str] = &["print"];
}

impl Contract for dyn Log {
    const NAME: &'static str = "Log";
    const OPERATIONS: &'static [&'static str] = &["log", "lines"];
}

impl Contract for dyn Count {
    const NAME: &'static str = "Count";
    const OPERATIONS: &'static [&'static str] = &["increment"];
}

impl Contract for dyn Audited {
    const NAME: &'static str = "Audited";
    const OPERATIONS: &'static [&'static str] = &[];
}

#[derive(Debug, Default)]
pub struct Printer {
    pub prefix: String,
}

impl Printer {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl Print for Printer {
    fn print(&self, line: &str) -> Result<String, String> {
        if line.is_empty() {
            return Err(format!("{}: nothing to print", self.prefix));
        }
        Ok(format!("{}: {line}", self.prefix))
    }
}

impl Delegate for Printer {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn describe(&self) -> DelegateType {
        DelegateType::builder_named::<Printer>("Printer")
            .implements::<dyn Print>(|p| p)
            .build()
    }
}

#[derive(Debug, Default)]
pub struct Logger {
    pub lines: Mutex<Vec<String>>,
}

impl Log for Logger {
    fn log(&self, line: &str) -> usize {
        let mut lines = self.lines.lock().unwrap();
        lines.push(line.to_string());
        lines.len()
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Print for Logger {
    fn print(&self, line: &str) -> Result<String, String> {
        Ok(format!("logged {}", self.log(line)))
    }
}

impl Audited for Logger {}

impl Delegate for Logger {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn describe(&self) -> DelegateType {
        DelegateType::builder_named::<Logger>("Logger")
            .implements::<dyn Log>(|l| l)
            .implements::<dyn Print>(|l| l)
            .implements::<dyn Audited>(|l| l)
            .build()
    }
}

/// Logs through an embedded [`Logger`] and counts on its own
#[derive(Debug, Default)]
pub struct FileLogger {
    pub logger: Logger,
    pub writes: AtomicUsize,
}

impl Count for FileLogger {
    fn increment(&self) -> usize {
        self.writes.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Delegate for FileLogger {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn describe(&self) -> DelegateType {
        DelegateType::builder_named::<FileLogger>("FileLogger")
            .implements::<dyn Count>(|f| f)
            .extends::<Logger>(self.logger.describe(), |f| &f.logger)
            .build()
    }
}

#[derive(Debug, Default)]
pub struct Counter {
    pub hits: AtomicUsize,
}

impl Count for Counter {
    fn increment(&self) -> usize {
        self.hits.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Delegate for Counter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn describe(&self) -> DelegateType {
        DelegateType::builder_named::<Counter>("Counter")
            .implements::<dyn Count>(|c| c)
            .build()
    }
}

/// Offers nothing at all
#[derive(Debug, Default)]
pub struct Inert;

impl Delegate for Inert {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn describe(&self) -> DelegateType {
        DelegateType::builder_named::<Inert>("Inert").build()
    }
}

/// Backend counting builds, optionally failing or stalling them
#[derive(Clone, Default)]
pub struct CountingBackend {
    pub builds: Arc<AtomicUsize>,
    pub failures_left: Arc<AtomicUsize>,
    pub delay: Option<std::time::Duration>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(times: usize) -> Self {
        let backend = Self::default();
        backend.failures_left.store(times, Ordering::SeqCst);
        backend
    }

    pub fn slow(delay: std::time::Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl BlueprintBackend for CountingBackend {
    fn build(&self, key: &CompositionKey) -> CompositionResult<Blueprint> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CompositionError::build_failure(key, "injected failure"));
        }
        DispatchTableBackend.build(key)
    }
}
