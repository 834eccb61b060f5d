// Copyright 2025 Cowboy AI, LLC.

//! # CIM Composite
//!
//! Combine independent delegate values into one composite object that exposes
//! the union of their capabilities, forwarding each capability to the delegate
//! that owns it.
//!
//! The crate is organised around a small set of building blocks:
//! - **Capability**: a trait contract, described by implementing [`Contract`] for `dyn Trait`
//! - **Delegate**: a value whose concrete type describes the capabilities it provides
//! - **RouteTable**: which delegate owns which capability (earlier delegates win)
//! - **Blueprint**: a reusable dispatch table built once per composition key and scope
//! - **Composite**: a delegate array bound to a blueprint
//! - **CompositionContext**: the owner of every cache involved
//!
//! ## Example
//!
//! ```
//! use cim_composite::{CompositionContext, Contract, Delegate, DelegateType};
//! use std::any::Any;
//!
//! trait Print {
//!     fn print(&self, line: &str) -> String;
//! }
//!
//! trait Log {
//!     fn log(&self, line: &str) -> String;
//! }
//!
//! impl Contract for dyn Print {
//!     const NAME: &'static str = "Print";
//!     const OPERATIONS: &'static [&'static str] = &["print"];
//! }
//!
//! impl Contract for dyn Log {
//!     const NAME: &'static str = "Log";
//!     const OPERATIONS: &'static [&'static str] = &["log"];
//! }
//!
//! struct Printer;
//! struct Logger;
//!
//! impl Print for Printer {
//!     fn print(&self, line: &str) -> String { format!("printer: {line}") }
//! }
//!
//! impl Print for Logger {
//!     fn print(&self, line: &str) -> String { format!("logger: {line}") }
//! }
//!
//! impl Log for Logger {
//!     fn log(&self, line: &str) -> String { format!("log: {line}") }
//! }
//!
//! impl Delegate for Printer {
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn describe(&self) -> DelegateType {
//!         DelegateType::builder::<Printer>().implements::<dyn Print>(|p| p).build()
//!     }
//! }
//!
//! impl Delegate for Logger {
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn describe(&self) -> DelegateType {
//!         DelegateType::builder::<Logger>()
//!             .implements::<dyn Log>(|l| l)
//!             .implements::<dyn Print>(|l| l)
//!             .build()
//!     }
//! }
//!
//! let context = CompositionContext::new();
//! let delegates: [&dyn Delegate; 2] = [&Printer, &Logger];
//! let composite = context.compose_auto(&delegates).unwrap();
//!
//! assert_eq!(composite.require::<dyn Print>().unwrap().print("hi"), "printer: hi");
//! assert_eq!(composite.require::<dyn Log>().unwrap().log("hi"), "log: hi");
//! ```

#![warn(missing_docs)]

mod blueprint;
mod blueprint_cache;
mod capability;
mod collector;
mod composite;
mod config;
mod context;
mod delegate;
mod errors;
mod key;
mod metrics;
mod registry;
mod route;
mod route_cache;

pub use blueprint::{Blueprint, BlueprintBackend, DispatchTableBackend};
pub use blueprint_cache::BlueprintCache;
pub use capability::{Capability, Contract};
pub use collector::collect;
pub use composite::Composite;
pub use config::{CompositionConfig, MarkerPolicy};
pub use context::CompositionContext;
pub use delegate::{Delegate, DelegateType, DelegateTypeBuilder, Level};
pub use errors::{CompositionError, CompositionResult};
pub use key::{CompositionKey, Scope};
pub use metrics::{CacheStats, CacheStatsSnapshot};
pub use registry::TypeRegistry;
pub use route::{RouteTable, TypeSequence};
pub use route_cache::{LruRouteStore, RouteCache, RouteStore, UnboundedRouteStore};
