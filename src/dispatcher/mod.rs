//! # Dispatcher Module
//!
//! The dispatcher invokes the [`crate::target::DispatchTarget`] of a matched
//! route. It resolves the target's declared dependencies through an
//! [`Injector`], assembles the [`Arguments`] list and calls the entry the
//! [`crate::target::TargetRegistry`] holds for the target.
//!
//! ## Overview
//!
//! - Dependencies are resolved first, in declared order
//! - Instance methods and instance properties also resolve their receiver,
//!   using the class identifier as the dependency id
//! - Bound route parameters are appended after the dependencies
//! - If any resolution fails the target is never called
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use routeflow::dispatcher::{Container, Dispatcher};
//! use routeflow::route::BoundParams;
//! use routeflow::surface::Reply;
//! use routeflow::target::{DispatchTarget, TargetRegistry};
//!
//! let mut container = Container::new();
//! container.instance("greeting", String::from("hello"));
//!
//! let mut targets = TargetRegistry::new();
//! targets.function("greet", |args| {
//!     let greeting = args.service::<String>("greeting")?;
//!     Ok(Reply::text(format!("{greeting}!")))
//! });
//!
//! let dispatcher = Dispatcher::new(Arc::new(targets), Arc::new(container));
//! let target = DispatchTarget::function("greet").with_dependency("greeting");
//! let reply = dispatcher.dispatch(&target, BoundParams::new()).unwrap();
//! assert_eq!(reply, Reply::text("hello!"));
//! ```
//!
//! ## Error Handling
//!
//! - Unknown or failing dependencies: [`crate::error::RouteError::DependencyResolution`]
//! - Errors returned by the target pass through; a panic becomes a handler error
//! - There are no retries: one invocation per dispatch

mod arguments;
mod core;
mod injector;

pub use arguments::{Argument, Arguments};
pub use core::Dispatcher;
pub use injector::{downcast, Container, Factory, Injector, Service};
