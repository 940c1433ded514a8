//! Inputs and pipeline types for the five lifecycle stages.

use super::core::{Middleware, Pipeline};
use crate::error::RouteError;
use crate::route::{BoundParams, RouteDefinition};
use crate::surface::Surface;
use std::sync::Arc;

/// Input of the `matched` stage: a route was found and its parameters bound.
///
/// Middleware may rewrite `params` before the target sees them.
pub struct Routed<S: Surface> {
    pub request: Arc<S::Input>,
    pub route: Arc<RouteDefinition>,
    pub params: BoundParams,
}

/// Input of the `dispatched` stage: the target ran and its reply was coerced
pub struct Dispatched<S: Surface> {
    pub request: Arc<S::Input>,
    pub route: Arc<RouteDefinition>,
    pub output: S::Output,
}

/// Input of the `not_matched` stage
pub struct Unmatched<S: Surface> {
    pub request: Arc<S::Input>,
}

/// Input of the `exception` stage.
///
/// `route` is `None` when the failure happened before a route was chosen.
pub struct Failure<S: Surface> {
    pub request: Arc<S::Input>,
    pub route: Option<Arc<RouteDefinition>>,
    pub error: RouteError,
}

/// Input of the `terminated` stage; runs once per invocation with the final output
pub struct Finished<S: Surface> {
    pub request: Arc<S::Input>,
    pub route: Option<Arc<RouteDefinition>>,
    pub output: S::Output,
}

pub type MatchedLayer<S> = Arc<dyn Middleware<Routed<S>, <S as Surface>::Output>>;
pub type DispatchedLayer<S> = Arc<dyn Middleware<Dispatched<S>, <S as Surface>::Output>>;
pub type NotMatchedLayer<S> = Arc<dyn Middleware<Unmatched<S>, <S as Surface>::Output>>;
pub type ExceptionLayer<S> = Arc<dyn Middleware<Failure<S>, <S as Surface>::Output>>;
pub type TerminatedLayer<S> = Arc<dyn Middleware<Finished<S>, ()>>;

/// One pipeline per stage, in registration order
pub struct StagePipelines<S: Surface> {
    pub matched: Pipeline<Routed<S>, S::Output>,
    pub dispatched: Pipeline<Dispatched<S>, S::Output>,
    pub not_matched: Pipeline<Unmatched<S>, S::Output>,
    pub exception: Pipeline<Failure<S>, S::Output>,
    pub terminated: Pipeline<Finished<S>, ()>,
}

impl<S: Surface> Default for StagePipelines<S> {
    fn default() -> Self {
        Self {
            matched: Pipeline::new(),
            dispatched: Pipeline::new(),
            not_matched: Pipeline::new(),
            exception: Pipeline::new(),
            terminated: Pipeline::new(),
        }
    }
}

impl<S: Surface> Clone for StagePipelines<S> {
    fn clone(&self) -> Self {
        Self {
            matched: self.matched.clone(),
            dispatched: self.dispatched.clone(),
            not_matched: self.not_matched.clone(),
            exception: self.exception.clone(),
            terminated: self.terminated.clone(),
        }
    }
}

impl<S: Surface> StagePipelines<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total layers across all stages
    #[must_use]
    pub fn len(&self) -> usize {
        self.matched.len()
            + self.dispatched.len()
            + self.not_matched.len()
            + self.exception.len()
            + self.terminated.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
