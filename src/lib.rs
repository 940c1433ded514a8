//! # routeflow
//!
//! **routeflow** is a synchronous route matching and dispatch engine shared
//! by two front ends: HTTP requests and command-line invocations. Routes are
//! declared as templates, compiled once at startup, matched in O(1) for
//! literal keys and in registration order for patterns, and dispatched to
//! targets looked up in an explicit interface table.
//!
//! ## Architecture
//!
//! - **[`route`]** - Route definitions, the template compiler, the fluent
//!   [`route::RouteBuilder`] and the route-table cache format
//! - **[`router`]** - [`router::RouteCollection`] (exact map plus ordered
//!   dynamic list) and the [`router::Matcher`]
//! - **[`target`]** - Dispatch targets and the [`target::TargetRegistry`]
//!   that maps them to callables
//! - **[`dispatcher`]** - Dependency injection and target invocation
//! - **[`middleware`]** - Onion pipelines for the five lifecycle stages
//! - **[`surface`]** - The HTTP and console front ends
//! - **[`engine`]** - The [`engine::Router`] orchestrator
//! - **[`config`]**, **[`logging`]**, **[`ids`]**, **[`error`]** - Ambient
//!   configuration, structured logging, invocation ids and the error taxonomy
//! - **[`cli`]** - The `routeflow` route-table tool
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Router as engine::Router
//!     participant Matcher as router::Matcher
//!     participant Stages as middleware stages
//!     participant Dispatcher
//!     participant Target
//!
//!     Caller->>Router: handle(input)
//!     Router->>Matcher: match input
//!     alt matched
//!         Router->>Stages: matched stage
//!         Stages->>Dispatcher: dispatch(target, params)
//!         Dispatcher->>Dispatcher: resolve dependencies
//!         Dispatcher->>Target: call(arguments)
//!         Target-->>Stages: Reply
//!         Stages->>Stages: dispatched stage
//!     else no match
//!         Router->>Stages: not_matched stage
//!     end
//!     opt any error
//!         Router->>Stages: exception stage
//!     end
//!     Router->>Stages: terminated stage
//!     Router-->>Caller: output
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use routeflow::prelude::*;
//!
//! let mut targets = TargetRegistry::new();
//! targets.function("greet", |args| {
//!     Ok(Reply::text(format!("hello {}", args.text("name")?)))
//! });
//!
//! let router = Router::<Console>::builder()
//!     .route(
//!         RouteBuilder::new("greet", DispatchTarget::function("greet"))
//!             .argument("name")
//!             .build()
//!             .unwrap(),
//!     )
//!     .targets(targets)
//!     .build()
//!     .unwrap();
//!
//! let output = router.handle(CommandInput::parse(["greet", "ada"]));
//! assert_eq!(output.exit_code, 0);
//! assert_eq!(output.stdout, "hello ada");
//!
//! let output = router.handle(CommandInput::parse(["greet"]));
//! assert_eq!(output.exit_code, 2);
//! ```
//!
//! ## Templates
//!
//! | Template | Matches | Binds |
//! |----------|---------|-------|
//! | `/health` | `/health` | nothing (exact table) |
//! | `/post/{id:int}` | `/post/42` | `id = 42` |
//! | `/docs[/{lang=en}]` | `/docs`, `/docs/fr` | `lang = "en"`, `lang = "fr"` |
//! | `/files/{path*}` | `/files/a/b` | `path = ["a", "b"]` |
//! | `/v/{ver<\d+>}` | `/v/2` | `ver = "2"` |
//!
//! ## Configuration
//!
//! [`config::RouterConfig::from_env`] and [`logging::LogConfig::from_env`]
//! read `ROUTEFLOW_*` variables; every value has a default.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod route;
pub mod router;
pub mod surface;
pub mod target;

pub use config::RouterConfig;
pub use engine::{Router, RouterBuilder};
pub use error::{ErrorClass, RouteError};

/// Common imports for building a router
pub mod prelude {
    pub use crate::config::RouterConfig;
    pub use crate::dispatcher::{Arguments, Container, Injector};
    pub use crate::engine::{Router, RouterBuilder};
    pub use crate::error::RouteError;
    pub use crate::middleware::{from_fn, MiddlewareRegistry, Next};
    pub use crate::route::{CastSpec, ParamValue, RouteBuilder, RouteDefinition, Stage};
    pub use crate::router::{CommandArgs, MatchResult};
    pub use crate::surface::{
        CommandInput, CommandOutput, Console, Http, HttpRequest, HttpResponse, Reply,
    };
    pub use crate::target::{DispatchTarget, TargetRegistry};
}
