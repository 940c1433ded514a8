//! # Middleware Module
//!
//! Onion-style interception around the routing lifecycle.
//!
//! ## Model
//!
//! Each stage owns a [`Pipeline`]: an ordered list of [`Middleware`] layers
//! plus one terminal operation supplied by the router. A layer receives the
//! stage input and a [`Next`] continuation and may:
//!
//! - call `next.run(input)` to continue inward,
//! - return a value without calling `next`, skipping everything inward,
//! - fail, aborting the chain.
//!
//! Layers run in registration order on the way in and in reverse order on
//! the way out:
//!
//! ```text
//! A:in -> B:in -> terminal -> B:out -> A:out
//! ```
//!
//! ## Stages
//!
//! | Stage | Input | Terminal |
//! |-------|-------|----------|
//! | matched | [`Routed`] | dispatch, then the dispatched stage |
//! | dispatched | [`Dispatched`] | identity |
//! | not_matched | [`Unmatched`] | surface not-found output |
//! | exception | [`Failure`] | client errors rendered, others re-thrown |
//! | terminated | [`Finished`] | no-op; errors are logged and dropped |
//!
//! Routes reference middleware by name. Names are resolved through a
//! [`MiddlewareRegistry`] when the router is built, and router-level
//! middleware always runs outside route-level middleware.
//!
//! ## Stock middleware
//!
//! - [`TracingMiddleware`] - enters a `dispatch` span with route and target
//! - [`TimingMiddleware`] - logs `latency_ms` and keeps latency counters

mod core;
mod registry;
mod stages;
mod timing;
mod tracing;

pub use self::core::{from_fn, FnMiddleware, Middleware, Next, Pipeline, Terminal};
pub use self::registry::MiddlewareRegistry;
pub use self::stages::{
    Dispatched, DispatchedLayer, ExceptionLayer, Failure, Finished, MatchedLayer,
    NotMatchedLayer, Routed, StagePipelines, TerminatedLayer, Unmatched,
};
pub use self::timing::TimingMiddleware;
pub use self::tracing::TracingMiddleware;
