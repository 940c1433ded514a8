//! Dispatcher core - resolves dependencies and invokes targets.

use super::arguments::Arguments;
use super::injector::{Injector, Service};
use crate::error::RouteError;
use crate::route::BoundParams;
use crate::surface::Reply;
use crate::target::{DispatchTarget, TargetEntry, TargetKind, TargetRegistry};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// Invokes dispatch targets through the interface table.
///
/// Holds no per-invocation state; shared by every request.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<TargetRegistry>,
    injector: Arc<dyn Injector>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("targets", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Arc<TargetRegistry>, injector: Arc<dyn Injector>) -> Self {
        Self { registry, injector }
    }

    #[must_use]
    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Resolve the target's dependencies and invoke it once.
    ///
    /// Dependencies are resolved in declared order before anything is
    /// called; the bound parameters are appended after them.
    ///
    /// # Errors
    ///
    /// - [`RouteError::DependencyResolution`] if a dependency or instance
    ///   receiver cannot be resolved; the target is not invoked
    /// - [`RouteError::ContractViolation`] if the target is not registered
    /// - whatever the target returns, unchanged. A target that fails with a
    ///   [`RouteError`] keeps its variant; any other error becomes
    ///   [`RouteError::Handler`]. A panicking target is reported as a
    ///   handler error.
    pub fn dispatch(&self, target: &DispatchTarget, params: BoundParams) -> Result<Reply, RouteError> {
        let entry = self.registry.get(&target.kind).ok_or_else(|| {
            RouteError::ContractViolation(format!("{target} is not registered"))
        })?;

        let mut dependencies = Vec::with_capacity(target.dependencies.len());
        for dependency in &target.dependencies {
            let service = self.resolve_for(target, dependency)?;
            dependencies.push((dependency.clone(), service));
        }
        let receiver = match &target.kind {
            TargetKind::InstanceMethod { class, .. }
            | TargetKind::Property {
                class,
                is_static: false,
                ..
            } => Some(self.resolve_for(target, class)?),
            _ => None,
        };

        let args = Arguments::new(dependencies, params);
        debug!(target = %target, args_count = args.len(), "Dispatching target");

        let outcome = catch_unwind(AssertUnwindSafe(|| invoke(entry, receiver.as_ref(), args)));
        match outcome {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(err)) => Err(err.downcast::<RouteError>().unwrap_or_else(RouteError::Handler)),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(target = %target, panic = %message, "Dispatch target panicked");
                Err(RouteError::Handler(anyhow::anyhow!(
                    "{target} panicked: {message}"
                )))
            }
        }
    }

    fn resolve_for(&self, target: &DispatchTarget, dependency: &str) -> Result<Service, RouteError> {
        self.injector.resolve(dependency).map_err(|e| {
            let reason = match e {
                RouteError::DependencyResolution { reason, .. } => reason,
                other => other.to_string(),
            };
            RouteError::DependencyResolution {
                target: target.to_string(),
                dependency: dependency.to_string(),
                reason,
            }
        })
    }
}

fn invoke(entry: &TargetEntry, receiver: Option<&Service>, args: Arguments) -> anyhow::Result<Reply> {
    match (entry, receiver) {
        (TargetEntry::Call(handler), _) => handler(args),
        (TargetEntry::Method(handler), Some(receiver)) => handler(receiver, args),
        (TargetEntry::Read(reader), _) => reader(),
        (TargetEntry::Field(reader), Some(receiver)) => reader(receiver),
        (TargetEntry::Value(value), _) => Ok(value.clone()),
        (TargetEntry::Method(_) | TargetEntry::Field(_), None) => Err(RouteError::ContractViolation(
            "entry needs a receiver but the target kind has none".to_string(),
        )
        .into()),
    }
}
