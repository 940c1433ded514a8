use crate::config::RouterConfig;
use crate::dispatcher::{Container, Dispatcher, Injector};
use crate::error::RouteError;
use crate::middleware::{
    Dispatched, Failure, Finished, MiddlewareRegistry, Routed, StagePipelines, Unmatched,
};
use crate::route::{RouteDefinition, RouteTable, Stage};
use crate::router::{MatchResult, Matcher, RouteCollection};
use crate::surface::Surface;
use crate::target::TargetRegistry;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};

/// Owner name used in errors for router-level middleware
const GLOBAL_OWNER: &str = "*";

/// Matches, dispatches and runs the stage pipelines for one surface.
///
/// Immutable once built; share it behind an `Arc` across threads.
pub struct Router<S: Surface> {
    matcher: Matcher,
    dispatcher: Dispatcher,
    global: StagePipelines<S>,
    /// Global plus route-level pipelines, only for routes that declare middleware
    routes: HashMap<String, StagePipelines<S>>,
}

impl<S: Surface> std::fmt::Debug for Router<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("surface", &S::NAME)
            .field("routes", &self.matcher.collection().len())
            .field("global_middleware", &self.global.len())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl<S: Surface> Router<S> {
    #[must_use]
    pub fn builder() -> RouterBuilder<S> {
        RouterBuilder::new()
    }

    #[must_use]
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    #[must_use]
    pub fn collection(&self) -> &RouteCollection {
        self.matcher.collection()
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serve one request or command.
    ///
    /// Never fails: every error ends either in the output of the exception
    /// stage or in the surface's failure output. The terminated stage runs
    /// exactly once afterwards.
    pub fn handle(&self, input: S::Input) -> S::Output {
        let id = S::invocation_id(&input);
        let span = info_span!("invocation", id = %id, surface = S::NAME, key = %S::key(&input));
        let _entered = span.enter();

        let request = Arc::new(input);
        let matched = catch_unwind(AssertUnwindSafe(|| {
            S::match_input(&self.matcher, &request)
        }))
        .unwrap_or_else(|_| Err(panicked("matching")));
        // Known before any stage runs, so a panicking stage still reaches
        // this route's exception and terminated middleware.
        let route = match &matched {
            Ok(MatchResult::Matched { route, .. }) => Some(Arc::clone(route)),
            _ => None,
        };
        let result = catch_unwind(AssertUnwindSafe(|| self.execute(&request, matched)))
            .unwrap_or_else(|_| Err(panicked("middleware")));
        let output = match result {
            Ok(output) => output,
            Err(err) => self.recover(&request, route.clone(), err),
        };
        self.terminate(&request, route, &output);
        output
    }

    fn pipelines_for(&self, route: Option<&Arc<RouteDefinition>>) -> &StagePipelines<S> {
        route
            .and_then(|r| self.routes.get(&r.key))
            .unwrap_or(&self.global)
    }

    fn execute(
        &self,
        request: &Arc<S::Input>,
        matched: Result<MatchResult, RouteError>,
    ) -> Result<S::Output, RouteError> {
        match matched? {
            MatchResult::Matched { route, params } => {
                debug!(route = %route.key, params_count = params.len(), "Route matched");
                let pipelines = self.pipelines_for(Some(&route));
                let routed = Routed {
                    request: Arc::clone(request),
                    route,
                    params,
                };
                pipelines
                    .matched
                    .run(routed, |routed| self.dispatch(pipelines, routed))
            }
            MatchResult::NoMatch => {
                debug!("No route matched");
                let unmatched = Unmatched {
                    request: Arc::clone(request),
                };
                self.global
                    .not_matched
                    .run(unmatched, |u| Ok(S::not_found(&u.request)))
            }
        }
    }

    /// Terminal operation of the matched stage
    fn dispatch(
        &self,
        pipelines: &StagePipelines<S>,
        routed: Routed<S>,
    ) -> Result<S::Output, RouteError> {
        let Routed {
            request,
            route,
            params,
        } = routed;
        let reply = self.dispatcher.dispatch(&route.target, params)?;
        let output = S::coerce(reply)?;
        pipelines.dispatched.run(
            Dispatched {
                request,
                route,
                output,
            },
            |dispatched| Ok(dispatched.output),
        )
    }

    fn recover(
        &self,
        request: &Arc<S::Input>,
        route: Option<Arc<RouteDefinition>>,
        err: RouteError,
    ) -> S::Output {
        let pipelines = self.pipelines_for(route.as_ref());
        let summary = err.to_string();
        let failure = Failure {
            request: Arc::clone(request),
            route,
            error: err,
        };
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            pipelines.exception.run(failure, render_client_error::<S>)
        }));
        match outcome {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                error!(error = %err, class = ?err.class(), "Unhandled routing error");
                S::failure(request, &err)
            }
            Err(_) => {
                let err = RouteError::Handler(anyhow::anyhow!(
                    "exception stage panicked while handling: {summary}"
                ));
                error!(error = %err, "Exception stage panicked");
                S::failure(request, &err)
            }
        }
    }

    fn terminate(
        &self,
        request: &Arc<S::Input>,
        route: Option<Arc<RouteDefinition>>,
        output: &S::Output,
    ) {
        let pipelines = self.pipelines_for(route.as_ref());
        if pipelines.terminated.is_empty() {
            return;
        }
        let finished = Finished {
            request: Arc::clone(request),
            route,
            output: output.clone(),
        };
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            pipelines.terminated.run(finished, |_| Ok(()))
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "Terminated stage failed"),
            Err(_) => warn!("Terminated stage panicked"),
        }
    }
}

fn panicked(stage: &str) -> RouteError {
    error!(stage, "Panic during invocation");
    RouteError::Handler(anyhow::anyhow!("{stage} panicked"))
}

/// Default terminal of the exception stage
fn render_client_error<S: Surface>(failure: Failure<S>) -> Result<S::Output, RouteError> {
    if failure.error.is_client_error() {
        warn!(error = %failure.error, "Client error");
        Ok(S::client_error(&failure.request, &failure.error))
    } else {
        Err(failure.error)
    }
}

/// Collects routes, targets and middleware, then validates them all at once.
pub struct RouterBuilder<S: Surface> {
    config: RouterConfig,
    routes: Vec<RouteDefinition>,
    tables: Vec<RouteTable>,
    targets: TargetRegistry,
    injector: Arc<dyn Injector>,
    middleware: MiddlewareRegistry<S>,
    global: Vec<(Stage, String)>,
}

impl<S: Surface> Default for RouterBuilder<S> {
    fn default() -> Self {
        Self {
            config: RouterConfig::default(),
            routes: Vec::new(),
            tables: Vec::new(),
            targets: TargetRegistry::new(),
            injector: Arc::new(Container::new()),
            middleware: MiddlewareRegistry::new(),
            global: Vec::new(),
        }
    }
}

impl<S: Surface> RouterBuilder<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn route(mut self, route: RouteDefinition) -> Self {
        self.routes.push(route);
        self
    }

    #[must_use]
    pub fn routes(mut self, routes: impl IntoIterator<Item = RouteDefinition>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Register every route of a table, before the routes added one by one
    #[must_use]
    pub fn table(mut self, table: RouteTable) -> Self {
        self.tables.push(table);
        self
    }

    #[must_use]
    pub fn targets(mut self, targets: TargetRegistry) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn injector(mut self, injector: impl Injector + 'static) -> Self {
        self.injector = Arc::new(injector);
        self
    }

    #[must_use]
    pub fn middleware(mut self, middleware: MiddlewareRegistry<S>) -> Self {
        self.middleware = middleware;
        self
    }

    /// Run a registered middleware for every invocation, outside route-level middleware
    #[must_use]
    pub fn global(mut self, stage: Stage, name: &str) -> Self {
        self.global.push((stage, name.to_string()));
        self
    }

    /// Register every route and resolve every reference.
    ///
    /// Routes from the configured cache file come first, then tables, then
    /// routes added one by one.
    ///
    /// # Errors
    ///
    /// The first registration error: an unreadable cache, a duplicate or
    /// invalid route, a target missing from the registry, or unknown
    /// middleware.
    pub fn build(self) -> Result<Router<S>, RouteError> {
        let mut collection = RouteCollection::with_config(&self.config);
        let mut tables = self.tables;
        if let Some(path) = &self.config.route_cache {
            tables.insert(0, RouteTable::load(path)?);
        }
        for table in tables {
            for route in table.into_routes()? {
                collection.add(route)?;
            }
        }
        for route in self.routes {
            collection.add(route)?;
        }

        let mut global = StagePipelines::new();
        for (stage, name) in &self.global {
            self.middleware
                .resolve_into(&mut global, GLOBAL_OWNER, *stage, name)?;
        }

        let mut routes = HashMap::new();
        for route in collection.all() {
            if !self.targets.contains(&route.target.kind) {
                return Err(RouteError::UnknownTarget {
                    route: route.key.clone(),
                    target: route.target.to_string(),
                });
            }
            if route.middleware.is_empty() {
                continue;
            }
            if !route.middleware_for(Stage::NotMatched).is_empty() {
                warn!(
                    route = %route.key,
                    "Route-level not_matched middleware never runs; register it globally"
                );
            }
            let mut pipelines = global.clone();
            for (stage, names) in &route.middleware {
                for name in names {
                    self.middleware
                        .resolve_into(&mut pipelines, &route.key, *stage, name)?;
                }
            }
            routes.insert(route.key.clone(), pipelines);
        }

        info!(
            surface = S::NAME,
            routes_count = collection.len(),
            targets_count = self.targets.len(),
            global_middleware = global.len(),
            "Router built"
        );

        let collection = Arc::new(collection);
        Ok(Router {
            matcher: Matcher::with_config(collection, &self.config),
            dispatcher: Dispatcher::new(Arc::new(self.targets), self.injector),
            global,
            routes,
        })
    }
}
