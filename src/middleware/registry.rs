use super::stages::{
    DispatchedLayer, ExceptionLayer, MatchedLayer, NotMatchedLayer, StagePipelines,
    TerminatedLayer,
};
use crate::error::RouteError;
use crate::route::Stage;
use crate::surface::Surface;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Named middleware, one table per stage.
///
/// Routes refer to middleware by name; the `Router` resolves those names
/// here once at build time.
pub struct MiddlewareRegistry<S: Surface> {
    matched: HashMap<String, MatchedLayer<S>>,
    dispatched: HashMap<String, DispatchedLayer<S>>,
    not_matched: HashMap<String, NotMatchedLayer<S>>,
    exception: HashMap<String, ExceptionLayer<S>>,
    terminated: HashMap<String, TerminatedLayer<S>>,
}

impl<S: Surface> Default for MiddlewareRegistry<S> {
    fn default() -> Self {
        Self {
            matched: HashMap::new(),
            dispatched: HashMap::new(),
            not_matched: HashMap::new(),
            exception: HashMap::new(),
            terminated: HashMap::new(),
        }
    }
}

impl<S: Surface> std::fmt::Debug for MiddlewareRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |stage| {
            let mut names = self.names(stage);
            names.sort_unstable();
            names
        };
        f.debug_struct("MiddlewareRegistry")
            .field("matched", &names(Stage::Matched))
            .field("dispatched", &names(Stage::Dispatched))
            .field("not_matched", &names(Stage::NotMatched))
            .field("exception", &names(Stage::Exception))
            .field("terminated", &names(Stage::Terminated))
            .finish()
    }
}

fn insert<L>(table: &mut HashMap<String, L>, stage: Stage, name: &str, layer: L) {
    if table.insert(name.to_string(), layer).is_some() {
        warn!(stage = stage.as_str(), middleware = %name, "Replacing registered middleware");
    } else {
        info!(stage = stage.as_str(), middleware = %name, "Registered middleware");
    }
}

fn lookup<L: Clone>(
    table: &HashMap<String, L>,
    route: &str,
    stage: Stage,
    name: &str,
) -> Result<L, RouteError> {
    table
        .get(name)
        .cloned()
        .ok_or_else(|| RouteError::UnknownMiddleware {
            route: route.to_string(),
            stage: stage.as_str().to_string(),
            name: name.to_string(),
        })
}

impl<S: Surface> MiddlewareRegistry<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_matched(&mut self, name: &str, layer: MatchedLayer<S>) -> &mut Self {
        insert(&mut self.matched, Stage::Matched, name, layer);
        self
    }

    pub fn on_dispatched(&mut self, name: &str, layer: DispatchedLayer<S>) -> &mut Self {
        insert(&mut self.dispatched, Stage::Dispatched, name, layer);
        self
    }

    pub fn on_not_matched(&mut self, name: &str, layer: NotMatchedLayer<S>) -> &mut Self {
        insert(&mut self.not_matched, Stage::NotMatched, name, layer);
        self
    }

    pub fn on_exception(&mut self, name: &str, layer: ExceptionLayer<S>) -> &mut Self {
        insert(&mut self.exception, Stage::Exception, name, layer);
        self
    }

    pub fn on_terminated(&mut self, name: &str, layer: TerminatedLayer<S>) -> &mut Self {
        insert(&mut self.terminated, Stage::Terminated, name, layer);
        self
    }

    #[must_use]
    pub fn contains(&self, stage: Stage, name: &str) -> bool {
        match stage {
            Stage::Matched => self.matched.contains_key(name),
            Stage::Dispatched => self.dispatched.contains_key(name),
            Stage::NotMatched => self.not_matched.contains_key(name),
            Stage::Exception => self.exception.contains_key(name),
            Stage::Terminated => self.terminated.contains_key(name),
        }
    }

    /// Names registered for a stage, in no particular order
    #[must_use]
    pub fn names(&self, stage: Stage) -> Vec<&str> {
        match stage {
            Stage::Matched => self.matched.keys().map(String::as_str).collect(),
            Stage::Dispatched => self.dispatched.keys().map(String::as_str).collect(),
            Stage::NotMatched => self.not_matched.keys().map(String::as_str).collect(),
            Stage::Exception => self.exception.keys().map(String::as_str).collect(),
            Stage::Terminated => self.terminated.keys().map(String::as_str).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        Stage::ALL.iter().map(|stage| self.names(*stage).len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the named middleware to the pipeline of `stage`.
    ///
    /// `owner` names the route (or `*` for router-level middleware) in the
    /// error.
    ///
    /// # Errors
    ///
    /// [`RouteError::UnknownMiddleware`] if nothing is registered under `name`
    /// for that stage.
    pub fn resolve_into(
        &self,
        pipelines: &mut StagePipelines<S>,
        owner: &str,
        stage: Stage,
        name: &str,
    ) -> Result<(), RouteError> {
        match stage {
            Stage::Matched => pipelines
                .matched
                .push(lookup(&self.matched, owner, stage, name)?),
            Stage::Dispatched => pipelines
                .dispatched
                .push(lookup(&self.dispatched, owner, stage, name)?),
            Stage::NotMatched => pipelines
                .not_matched
                .push(lookup(&self.not_matched, owner, stage, name)?),
            Stage::Exception => pipelines
                .exception
                .push(lookup(&self.exception, owner, stage, name)?),
            Stage::Terminated => pipelines
                .terminated
                .push(lookup(&self.terminated, owner, stage, name)?),
        }
        Ok(())
    }
}
