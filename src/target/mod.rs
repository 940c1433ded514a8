//! # Target Module
//!
//! What a route invokes. A [`DispatchTarget`] is a plain description (a kind
//! plus declared dependencies) stored on every route; the [`TargetRegistry`]
//! is the interface table built at startup that maps each description to an
//! actual callable.
//!
//! ## Target Kinds
//!
//! | Kind | Identified by | Receives |
//! |------|---------------|----------|
//! | `function` | name | arguments |
//! | `static_method` | class, method | arguments |
//! | `instance_method` | class, method | receiver resolved as `class`, arguments |
//! | `closure` | id | arguments |
//! | `property` | class, name, `is_static` | receiver (instance properties only) |
//! | `constant` | optional class, name | nothing |
//!
//! Arguments are always the resolved dependencies in declared order followed
//! by the bound route parameters in declaration order.
//!
//! ## Serialized Form
//!
//! ```yaml
//! target:
//!   kind: instance_method
//!   class: PostController
//!   method: show
//!   dependencies: [db]
//! ```

mod registry;

pub use registry::{
    FieldReader, Handler, MethodHandler, Reader, TargetEntry, TargetRegistry,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`DispatchTarget`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetKind {
    Function {
        name: String,
    },
    StaticMethod {
        class: String,
        method: String,
    },
    /// Receiver is resolved from the injector under the class identifier
    InstanceMethod {
        class: String,
        method: String,
    },
    Closure {
        id: String,
    },
    Property {
        class: String,
        name: String,
        #[serde(default)]
        is_static: bool,
    },
    Constant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        class: Option<String>,
        name: String,
    },
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Function { name } => write!(f, "function '{name}'"),
            TargetKind::StaticMethod { class, method } => {
                write!(f, "static method '{class}::{method}'")
            }
            TargetKind::InstanceMethod { class, method } => {
                write!(f, "instance method '{class}#{method}'")
            }
            TargetKind::Closure { id } => write!(f, "closure '{id}'"),
            TargetKind::Property {
                class,
                name,
                is_static: true,
            } => write!(f, "static property '{class}::{name}'"),
            TargetKind::Property { class, name, .. } => write!(f, "property '{class}#{name}'"),
            TargetKind::Constant {
                class: Some(class),
                name,
            } => write!(f, "constant '{class}::{name}'"),
            TargetKind::Constant { class: None, name } => write!(f, "constant '{name}'"),
        }
    }
}

/// What a route invokes, and the dependencies resolved before invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchTarget {
    #[serde(flatten)]
    pub kind: TargetKind,
    /// Injector identifiers, resolved in order ahead of the bound parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl DispatchTarget {
    #[must_use]
    pub fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self::new(TargetKind::Function { name: name.into() })
    }

    #[must_use]
    pub fn static_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(TargetKind::StaticMethod {
            class: class.into(),
            method: method.into(),
        })
    }

    #[must_use]
    pub fn instance_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(TargetKind::InstanceMethod {
            class: class.into(),
            method: method.into(),
        })
    }

    #[must_use]
    pub fn closure(id: impl Into<String>) -> Self {
        Self::new(TargetKind::Closure { id: id.into() })
    }

    #[must_use]
    pub fn property(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TargetKind::Property {
            class: class.into(),
            name: name.into(),
            is_static: false,
        })
    }

    #[must_use]
    pub fn static_property(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TargetKind::Property {
            class: class.into(),
            name: name.into(),
            is_static: true,
        })
    }

    #[must_use]
    pub fn constant(class: Option<&str>, name: impl Into<String>) -> Self {
        Self::new(TargetKind::Constant {
            class: class.map(str::to_string),
            name: name.into(),
        })
    }

    /// Append a dependency identifier
    #[must_use]
    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }
}

impl fmt::Display for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}
