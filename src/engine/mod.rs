//! # Engine Module
//!
//! The [`Router`] ties matching, middleware and dispatch together behind a
//! single entry point, [`Router::handle`], for one [`crate::surface::Surface`].
//!
//! ## Flow
//!
//! ```text
//! input ─► match ─┬─ matched ──► [matched stage ─► dispatch ─► dispatched stage]
//!                 ├─ no match ─► [not_matched stage ─► not found]
//!                 └─ error ────┐
//!        any error ────────────┴─► [exception stage ─► client error | re-throw]
//!                                  re-throw ─► failure output
//! output ─► [terminated stage] ─► caller
//! ```
//!
//! `handle` never fails. Client errors (bad casts, malformed CLI input) are
//! rendered by the default exception terminal; anything else that escapes
//! the exception stage is logged at `error` and becomes the surface's
//! failure output.
//!
//! ## Building
//!
//! [`RouterBuilder`] collects routes, the target registry, the injector and
//! named middleware, then validates everything at once: every route's
//! target must be registered and every middleware name must resolve for its
//! stage.
//!
//! ```rust
//! use routeflow::engine::Router;
//! use routeflow::route::RouteBuilder;
//! use routeflow::surface::{Http, HttpRequest, Reply};
//! use routeflow::target::{DispatchTarget, TargetRegistry};
//!
//! let mut targets = TargetRegistry::new();
//! targets.function("show_post", |args| Ok(Reply::text(format!("post {}", args.int("id")?))));
//!
//! let router = Router::<Http>::builder()
//!     .route(
//!         RouteBuilder::new("/post/{id:int}", DispatchTarget::function("show_post"))
//!             .build()
//!             .unwrap(),
//!     )
//!     .targets(targets)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(router.handle(HttpRequest::get("/post/42")).status, 200);
//! assert_eq!(router.handle(HttpRequest::get("/post/abc")).status, 400);
//! assert_eq!(router.handle(HttpRequest::get("/missing")).status, 404);
//! ```

mod core;

pub use self::core::{Router, RouterBuilder};
