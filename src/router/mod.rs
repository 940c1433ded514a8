//! # Router Module
//!
//! Route storage and matching: the [`RouteCollection`] index and the
//! [`Matcher`] that resolves an incoming path or command name against it.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Storing routes in an exact table and an ordered dynamic list
//! - Rejecting duplicate keys and duplicate pattern sources at registration
//! - Matching inputs, exact lookup first, then dynamic patterns in
//!   registration order
//! - Binding and casting parameters from captures and command-line inputs
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: at registration, templates such as `/posts/{id:int}` are
//!    compiled into anchored regexes (see [`crate::route`]). Literal routes
//!    skip this and go straight into the exact table.
//!
//! 2. **Matching**: for each input, the exact table is consulted in O(1).
//!    On a miss the dynamic list is scanned and the first matching pattern
//!    wins. Its captures are bound to parameters in declaration order.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use routeflow::route::{ParamValue, RouteBuilder};
//! use routeflow::router::{Matcher, RouteCollection};
//! use routeflow::target::DispatchTarget;
//!
//! let mut routes = RouteCollection::new();
//! routes
//!     .add(RouteBuilder::new("/post/{id:int}", DispatchTarget::function("show")).build().unwrap())
//!     .unwrap();
//!
//! let matcher = Matcher::new(Arc::new(routes));
//! let result = matcher.match_route("/post/42").unwrap();
//! assert_eq!(result.param("id"), Some(&ParamValue::Int(42)));
//! ```
//!
//! ## Performance
//!
//! - Exact routes never touch a regex
//! - Bound parameters live in a `SmallVec`; parameter names are `Arc<str>`
//!   clones of the route definition
//! - The collection is immutable after startup and shared without locking

mod args;
mod collection;
mod core;
#[cfg(test)]
mod tests;

pub use args::CommandArgs;
pub use collection::RouteCollection;
pub use core::{MatchResult, Matcher};
