//! # Route Module
//!
//! The data model of the routing engine: what a route is, how its template is
//! compiled, and how a set of routes is stored on disk.
//!
//! ## Overview
//!
//! A [`RouteDefinition`] is one routable unit. It carries:
//!
//! - a match key (an HTTP path, a command name, or a template source)
//! - an optional [`CompiledPattern`], present iff the route has capture parameters
//! - an ordered list of [`Parameter`]s
//! - a [`crate::target::DispatchTarget`] describing what to invoke
//! - middleware references per [`Stage`]
//!
//! Definitions are immutable once built and shared process-wide behind `Arc`.
//!
//! ## Templates
//!
//! ```text
//! /users/{id}                 required segment, captures [^/]+
//! /post/{id:int}              eager cast to i64
//! /files/{path*}              array capture, split on the array delimiter
//! /posts/{slug<[a-z-]+>}      custom capture regex
//! /docs[/{lang=en}]           optional section with a default
//! ```
//!
//! Templates without placeholders are literal routes and are matched through
//! the exact table only.
//!
//! ## Building Routes
//!
//! ```rust
//! use routeflow::route::RouteBuilder;
//! use routeflow::target::DispatchTarget;
//!
//! let docs = RouteBuilder::new("/docs[/{lang}]", DispatchTarget::function("docs"))
//!     .default("lang", "en")
//!     .build()
//!     .unwrap();
//! assert_eq!(docs.parameters.len(), 1);
//! ```
//!
//! Command routes declare their inputs explicitly:
//!
//! ```rust
//! use routeflow::route::RouteBuilder;
//! use routeflow::target::DispatchTarget;
//!
//! let greet = RouteBuilder::new("greet", DispatchTarget::function("greet"))
//!     .argument("name")
//!     .option("shout", &["s"])
//!     .build()
//!     .unwrap();
//! assert!(!greet.is_dynamic());
//! ```

mod build;
mod cache;
mod pattern;
mod types;

pub use build::RouteBuilder;
pub use cache::{RouteTable, TableFormat, TABLE_VERSION};
pub use pattern::{compile_template, sample_key, CompiledPattern, Template};
pub use types::{
    BoundParams, CastSpec, CastType, MiddlewareRef, ParamValue, ParamVec, Parameter,
    ParameterSource, RouteDefinition, Stage, MAX_INLINE_PARAMS,
};

#[cfg(test)]
mod tests;
