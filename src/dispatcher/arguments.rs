use super::injector::{downcast, Service};
use crate::error::RouteError;
use crate::route::{BoundParams, ParamValue};
use std::any::Any;
use std::sync::Arc;

/// One element of the argument list in invocation order
#[derive(Clone)]
pub enum Argument<'a> {
    Dependency { id: &'a str, service: &'a Service },
    Param { name: &'a str, value: &'a ParamValue },
}

/// Argument list handed to a dispatch target.
///
/// Resolved dependencies come first in declared order, followed by the bound
/// parameters in declaration order.
#[derive(Clone, Default)]
pub struct Arguments {
    dependencies: Vec<(String, Service)>,
    params: BoundParams,
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arguments")
            .field(
                "dependencies",
                &self.dependencies.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            )
            .field("params", &self.params)
            .finish()
    }
}

impl Arguments {
    #[must_use]
    pub fn new(dependencies: Vec<(String, Service)>, params: BoundParams) -> Self {
        Self {
            dependencies,
            params,
        }
    }

    /// Total number of arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len() + self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every argument in invocation order
    pub fn iter(&self) -> impl Iterator<Item = Argument<'_>> {
        self.dependencies
            .iter()
            .map(|(id, service)| Argument::Dependency { id, service })
            .chain(
                self.params
                    .iter()
                    .map(|(name, value)| Argument::Param { name, value }),
            )
    }

    /// Dependency at a position of the declared list, downcast to `T`.
    ///
    /// # Errors
    ///
    /// [`RouteError::ContractViolation`] for a bad index or type.
    pub fn dependency<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, RouteError> {
        let (id, service) = self.dependencies.get(index).ok_or_else(|| {
            RouteError::ContractViolation(format!("no dependency at position {index}"))
        })?;
        downcast(id, Arc::clone(service))
    }

    /// Dependency by identifier, downcast to `T`.
    ///
    /// # Errors
    ///
    /// [`RouteError::ContractViolation`] for an undeclared id or a bad type.
    pub fn service<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>, RouteError> {
        let (id, service) = self
            .dependencies
            .iter()
            .find(|(dep, _)| dep == id)
            .ok_or_else(|| RouteError::ContractViolation(format!("dependency '{id}' not declared")))?;
        downcast(id, Arc::clone(service))
    }

    #[must_use]
    pub fn params(&self) -> &BoundParams {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Text of a string or deferred parameter.
    ///
    /// # Errors
    ///
    /// [`RouteError::ContractViolation`] when missing or not textual.
    pub fn text(&self, name: &str) -> Result<&str, RouteError> {
        self.param(name)
            .and_then(ParamValue::as_str)
            .ok_or_else(|| expected(name, "text"))
    }

    /// Integer parameter.
    ///
    /// # Errors
    ///
    /// [`RouteError::ContractViolation`] when missing or not an integer.
    pub fn int(&self, name: &str) -> Result<i64, RouteError> {
        self.param(name)
            .and_then(ParamValue::as_i64)
            .ok_or_else(|| expected(name, "an integer"))
    }

    /// Boolean parameter; an absent optional flag reads as `false`.
    ///
    /// # Errors
    ///
    /// [`RouteError::ContractViolation`] for a value that is not boolean.
    pub fn flag(&self, name: &str) -> Result<bool, RouteError> {
        match self.param(name) {
            None | Some(ParamValue::Null) => Ok(false),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(ParamValue::Str(s)) if s == "true" => Ok(true),
            Some(_) => Err(expected(name, "a boolean")),
        }
    }
}

fn expected(name: &str, what: &str) -> RouteError {
    RouteError::ContractViolation(format!("parameter '{name}' is not {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Arguments {
        let mut params = BoundParams::new();
        params.push("id".into(), ParamValue::Int(7));
        params.push("slug".into(), ParamValue::from("hello"));
        params.push("force".into(), ParamValue::from("true"));
        Arguments::new(
            vec![("db".to_string(), Arc::new(String::from("pool")) as Service)],
            params,
        )
    }

    #[test]
    fn test_order_is_dependencies_then_params() {
        let args = args();
        assert_eq!(args.len(), 4);
        let kinds: Vec<&str> = args
            .iter()
            .map(|a| match a {
                Argument::Dependency { id, .. } => id,
                Argument::Param { name, .. } => name,
            })
            .collect();
        assert_eq!(kinds, ["db", "id", "slug", "force"]);
    }

    #[test]
    fn test_typed_accessors() {
        let args = args();
        assert_eq!(*args.dependency::<String>(0).unwrap(), "pool");
        assert_eq!(*args.service::<String>("db").unwrap(), "pool");
        assert_eq!(args.int("id").unwrap(), 7);
        assert_eq!(args.text("slug").unwrap(), "hello");
        assert!(args.flag("force").unwrap());
        assert!(!args.flag("missing").unwrap());
        assert!(args.int("slug").is_err());
        assert!(args.dependency::<u8>(0).is_err());
        assert!(args.dependency::<String>(3).is_err());
    }
}
