//! # Error Module
//!
//! Every failure the engine can produce is a [`RouteError`]. Errors fall into
//! four classes (see [`ErrorClass`]) which decide how the [`crate::engine::Router`]
//! treats them:
//!
//! - **Registration** errors fail startup and are never recovered.
//! - **Client** errors are rendered by the exception stage as a 4xx response
//!   or a CLI usage error; the invocation completes normally.
//! - **Programmer** errors (dependency resolution, contract violations) are
//!   re-thrown by the default exception stage and end in a failure output.
//! - **Handler** errors are whatever the dispatched target returned, passed
//!   through untouched.

use thiserror::Error;

/// Classification of a [`RouteError`] used by the exception stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Configuration bug detected while building the route table
    Registration,
    /// Bad input supplied by the caller of a single invocation
    Client,
    /// Wiring bug surfaced at invocation time
    Programmer,
    /// Error raised by the dispatched target itself
    Handler,
}

/// All errors raised by route registration, matching and dispatch.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A route with the same literal key or pattern source is already registered
    #[error("duplicate route '{key}'")]
    DuplicateRoute {
        /// Literal key or pattern source that collided
        key: String,
    },

    /// A route template could not be compiled or violates parameter rules
    #[error("invalid route pattern '{source_text}': {reason}")]
    InvalidPattern {
        /// The human-authored template
        source_text: String,
        /// What is wrong with it
        reason: String,
    },

    /// A route points at a dispatch target missing from the registry
    #[error("route '{route}' targets unregistered {target}")]
    UnknownTarget {
        /// Route key
        route: String,
        /// Human readable target description
        target: String,
    },

    /// A route references middleware that is not registered for the stage
    #[error("route '{route}' references unknown {stage} middleware '{name}'")]
    UnknownMiddleware {
        /// Route key
        route: String,
        /// Stage name
        stage: String,
        /// Middleware reference
        name: String,
    },

    /// A captured value could not be converted to its declared type
    #[error("parameter '{parameter}' expects {expected}, got '{raw}'")]
    ParameterCast {
        /// Parameter name
        parameter: String,
        /// Declared type
        expected: String,
        /// Raw captured text
        raw: String,
    },

    /// Command-line input does not fit the command's declared parameters
    #[error("malformed input for '{command}': {reason}")]
    MalformedInput {
        /// Command name
        command: String,
        /// What is wrong with it
        reason: String,
    },

    /// The injector has no binding for the identifier
    #[error("no binding registered for dependency '{dependency}'")]
    UnresolvedDependency {
        /// Type identifier that was requested
        dependency: String,
    },

    /// A dependency of a dispatch target could not be resolved
    #[error("failed to resolve dependency '{dependency}' for {target}: {reason}")]
    DependencyResolution {
        /// Human readable target description
        target: String,
        /// Type identifier that failed
        dependency: String,
        /// Underlying cause
        reason: String,
    },

    /// A value had a shape the caller did not accept
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// The dispatched target returned an error
    #[error(transparent)]
    Handler(#[from] anyhow::Error),

    /// A serialized route table could not be read or written
    #[error("route cache error: {0}")]
    Cache(String),
}

impl RouteError {
    /// Build an [`RouteError::InvalidPattern`]
    pub fn invalid_pattern(source_text: impl Into<String>, reason: impl Into<String>) -> Self {
        RouteError::InvalidPattern {
            source_text: source_text.into(),
            reason: reason.into(),
        }
    }

    /// Build an [`RouteError::MalformedInput`]
    pub fn malformed(command: impl Into<String>, reason: impl Into<String>) -> Self {
        RouteError::MalformedInput {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// The taxonomy class of this error
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            RouteError::DuplicateRoute { .. }
            | RouteError::InvalidPattern { .. }
            | RouteError::UnknownTarget { .. }
            | RouteError::UnknownMiddleware { .. }
            | RouteError::Cache(_) => ErrorClass::Registration,
            RouteError::ParameterCast { .. } | RouteError::MalformedInput { .. } => {
                ErrorClass::Client
            }
            RouteError::UnresolvedDependency { .. }
            | RouteError::DependencyResolution { .. }
            | RouteError::ContractViolation(_) => ErrorClass::Programmer,
            RouteError::Handler(_) => ErrorClass::Handler,
        }
    }

    /// Whether the error was caused by the caller's input
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.class() == ErrorClass::Client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        let cast = RouteError::ParameterCast {
            parameter: "id".into(),
            expected: "int".into(),
            raw: "abc".into(),
        };
        assert_eq!(cast.class(), ErrorClass::Client);
        assert!(cast.is_client_error());

        let dup = RouteError::DuplicateRoute { key: "/a".into() };
        assert_eq!(dup.class(), ErrorClass::Registration);

        let contract = RouteError::ContractViolation("bad reply".into());
        assert_eq!(contract.class(), ErrorClass::Programmer);

        let handler = RouteError::from(anyhow::anyhow!("boom"));
        assert_eq!(handler.class(), ErrorClass::Handler);
        assert_eq!(handler.to_string(), "boom");
    }

    #[test]
    fn test_display_mentions_source() {
        let err = RouteError::invalid_pattern("/a/{", "unbalanced '{'");
        assert_eq!(err.to_string(), "invalid route pattern '/a/{': unbalanced '{'");
    }
}
