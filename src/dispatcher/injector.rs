use crate::error::RouteError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A resolved dependency
pub type Service = Arc<dyn Any + Send + Sync>;

/// Builds a service on every resolution
pub type Factory = Arc<dyn Fn(&Container) -> anyhow::Result<Service> + Send + Sync>;

/// Supplies dependency instances by identifier.
pub trait Injector: Send + Sync {
    /// Resolve one identifier.
    ///
    /// # Errors
    ///
    /// [`RouteError::UnresolvedDependency`] for an unknown identifier, or
    /// [`RouteError::DependencyResolution`] when building the instance fails.
    fn resolve(&self, id: &str) -> Result<Service, RouteError>;
}

/// Recover the concrete type of a resolved service.
///
/// # Errors
///
/// [`RouteError::ContractViolation`] when the service has another type.
pub fn downcast<T: Any + Send + Sync>(id: &str, service: Service) -> Result<Arc<T>, RouteError> {
    service.downcast::<T>().map_err(|_| {
        RouteError::ContractViolation(format!(
            "dependency '{id}' is not a {}",
            std::any::type_name::<T>()
        ))
    })
}

/// Simple injector holding shared instances and factories.
///
/// Instances win over factories registered under the same identifier.
#[derive(Clone, Default)]
pub struct Container {
    instances: HashMap<String, Service>,
    factories: HashMap<String, Factory>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut instances: Vec<&String> = self.instances.keys().collect();
        let mut factories: Vec<&String> = self.factories.keys().collect();
        instances.sort();
        factories.sort();
        f.debug_struct("Container")
            .field("instances", &instances)
            .field("factories", &factories)
            .finish()
    }
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shared instance
    pub fn instance<T: Any + Send + Sync>(&mut self, id: &str, value: T) -> &mut Self {
        self.shared(id, Arc::new(value))
    }

    /// Register an already shared service
    pub fn shared(&mut self, id: &str, service: Service) -> &mut Self {
        self.instances.insert(id.to_string(), service);
        self
    }

    /// Register a factory run on every resolution
    pub fn factory<F>(&mut self, id: &str, factory: F) -> &mut Self
    where
        F: Fn(&Container) -> anyhow::Result<Service> + Send + Sync + 'static,
    {
        self.factories.insert(id.to_string(), Arc::new(factory));
        self
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.instances.contains_key(id) || self.factories.contains_key(id)
    }

    /// Resolve and downcast in one step
    ///
    /// # Errors
    ///
    /// Resolution errors, or [`RouteError::ContractViolation`] on a type mismatch.
    pub fn get<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>, RouteError> {
        downcast(id, self.resolve(id)?)
    }
}

impl Injector for Container {
    fn resolve(&self, id: &str) -> Result<Service, RouteError> {
        if let Some(service) = self.instances.get(id) {
            return Ok(Arc::clone(service));
        }
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| RouteError::UnresolvedDependency {
                dependency: id.to_string(),
            })?;
        debug!(dependency = %id, "Building dependency from factory");
        factory(self).map_err(|e| RouteError::DependencyResolution {
            target: "container factory".to_string(),
            dependency: id.to_string(),
            reason: format!("{e:#}"),
        })
    }
}
