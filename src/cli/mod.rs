//! # CLI Module
//!
//! Command-line tooling for route tables, shipped as the `routeflow` binary.
//!
//! A route table is a YAML or JSON file holding exact and dynamic routes;
//! the same format is used for hand-authored route files and for caches
//! written by [`crate::router::RouteCollection::to_table`].
//!
//! ```yaml
//! version: 1
//! exact:
//!   - key: /health
//!     target: { kind: function, name: health }
//! dynamic:
//!   - key: /post/{id:int}
//!     target: { kind: function, name: show_post }
//! ```
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! List every route in match order, with parameters and middleware:
//!
//! ```bash
//! routeflow inspect --routes routes.yaml
//! ```
//!
//! ### `match`
//!
//! Show which route an input hits and what it binds:
//!
//! ```bash
//! routeflow match --routes routes.yaml /post/42
//! routeflow match --routes routes.yaml --command deploy prod --force
//! ```
//!
//! ### `compile`
//!
//! Validate a hand-authored table and write it back as a cache file, with
//! capture parameters filled in from the templates:
//!
//! ```bash
//! routeflow compile --routes routes.yaml --out routes.cache.json
//! ```
//!
//! Logging goes to stderr and is configured with `ROUTEFLOW_LOG_*`
//! variables; see [`crate::logging`].

mod commands;


pub use commands::{
    describe_match, describe_route, load_collection, run, run_cli, Cli, Commands,
};
