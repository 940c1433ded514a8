use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::route::{sample_key, RouteDefinition, RouteTable};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registered routes, split into an exact table and an ordered dynamic list.
///
/// Exact routes are looked up by key in O(1). Dynamic routes are scanned in
/// registration order, so an earlier pattern shadows a later overlapping one.
/// The collection is built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    exact: HashMap<String, Arc<RouteDefinition>>,
    /// Exact routes in registration order, for `all()`
    exact_order: Vec<Arc<RouteDefinition>>,
    dynamic: Vec<Arc<RouteDefinition>>,
    warn_on_overlap: bool,
}

impl RouteCollection {
    #[must_use]
    pub fn new() -> Self {
        Self {
            warn_on_overlap: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_config(config: &RouterConfig) -> Self {
        Self {
            warn_on_overlap: config.warn_on_overlap,
            ..Self::default()
        }
    }

    /// Register a route.
    ///
    /// # Errors
    ///
    /// - [`RouteError::DuplicateRoute`] if the key is already registered, or
    ///   a dynamic route with the same template source exists. The
    ///   collection is left unchanged.
    /// - [`RouteError::InvalidPattern`] if the definition is inconsistent.
    pub fn add(&mut self, route: RouteDefinition) -> Result<(), RouteError> {
        route.validate()?;

        let source = route
            .pattern
            .as_ref()
            .map_or(route.key.as_str(), |p| p.source());
        let duplicate = self.exact.contains_key(&route.key)
            || self.dynamic.iter().any(|existing| {
                existing.key == route.key
                    || existing.pattern.as_ref().map(|p| p.source()) == Some(source)
            });
        if duplicate {
            warn!(key = %route.key, "Duplicate route rejected");
            return Err(RouteError::DuplicateRoute { key: route.key });
        }

        let route = Arc::new(route);
        match &route.pattern {
            Some(pattern) => {
                if self.warn_on_overlap {
                    self.warn_if_shadowed(&route);
                }
                debug!(
                    key = %route.key,
                    regex = %pattern.regex().as_str(),
                    target = %route.target,
                    "Dynamic route registered"
                );
                self.dynamic.push(route);
            }
            None => {
                debug!(key = %route.key, target = %route.target, "Exact route registered");
                self.exact.insert(route.key.clone(), Arc::clone(&route));
                self.exact_order.push(route);
            }
        }
        Ok(())
    }

    fn warn_if_shadowed(&self, route: &RouteDefinition) {
        if let Some((earlier, sample)) = self.shadowing(route) {
            warn!(
                route = %route.key,
                shadowed_by = %earlier.key,
                sample = %sample,
                "Route may be shadowed by an earlier pattern"
            );
        }
    }

    /// First earlier pattern matching a sample key built from the route's
    /// own template, with that sample key
    fn shadowing(&self, route: &RouteDefinition) -> Option<(&Arc<RouteDefinition>, String)> {
        let source = route.pattern.as_ref()?.source();
        let sample = sample_key(source, &route.parameters)?;
        self.dynamic
            .iter()
            .find(|earlier| {
                earlier
                    .pattern
                    .as_ref()
                    .is_some_and(|p| p.regex().is_match(&sample))
            })
            .map(|earlier| (earlier, sample))
    }

    /// Exact lookup by key; dynamic routes are never consulted
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arc<RouteDefinition>> {
        self.exact.get(key)
    }

    /// Exact routes first, then dynamic routes, each in registration order
    pub fn all(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
        self.exact_order.iter().chain(self.dynamic.iter())
    }

    /// Dynamic routes in match-priority order
    #[must_use]
    pub fn dynamic(&self) -> &[Arc<RouteDefinition>] {
        &self.dynamic
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exact_order.len() + self.dynamic.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializable snapshot in `all()` order
    #[must_use]
    pub fn to_table(&self) -> RouteTable {
        RouteTable::new(
            self.exact_order.iter().map(|r| r.as_ref().clone()).collect(),
            self.dynamic.iter().map(|r| r.as_ref().clone()).collect(),
        )
    }

    /// Rebuild a collection from a route table.
    ///
    /// Every entry goes through [`RouteCollection::add`], so a loaded table
    /// obeys the same invariants as live registration.
    ///
    /// # Errors
    ///
    /// Any error [`RouteTable::into_routes`] or [`RouteCollection::add`] raises.
    pub fn from_table(table: RouteTable, config: &RouterConfig) -> Result<Self, RouteError> {
        let mut collection = Self::with_config(config);
        for route in table.into_routes()? {
            collection.add(route)?;
        }
        info!(
            exact_count = collection.exact_order.len(),
            dynamic_count = collection.dynamic.len(),
            "Route collection restored from table"
        );
        Ok(collection)
    }
}
