use super::core::{Middleware, Next};
use super::stages::Routed;
use crate::error::RouteError;
use crate::surface::Surface;
use tracing::{debug, info_span};

/// Enters a `dispatch` span around everything inward of it on the matched
/// stage, recording the route key and target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl<S: Surface> Middleware<Routed<S>, S::Output> for TracingMiddleware {
    fn handle(
        &self,
        input: Routed<S>,
        next: Next<'_, Routed<S>, S::Output>,
    ) -> Result<S::Output, RouteError> {
        let span = info_span!(
            "dispatch",
            route = %input.route.key,
            target = %input.route.target,
            params_count = input.params.len()
        );
        let _entered = span.enter();
        let result = next.run(input);
        if let Err(ref e) = result {
            debug!(error = %e, "Dispatch span closed with error");
        }
        result
    }
}
