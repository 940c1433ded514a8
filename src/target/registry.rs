use super::TargetKind;
use crate::dispatcher::{Arguments, Service};
use crate::surface::Reply;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Function, static method or closure
pub type Handler = Arc<dyn Fn(Arguments) -> anyhow::Result<Reply> + Send + Sync>;
/// Instance method; the first argument is the resolved receiver
pub type MethodHandler = Arc<dyn Fn(&Service, Arguments) -> anyhow::Result<Reply> + Send + Sync>;
/// Static property read
pub type Reader = Arc<dyn Fn() -> anyhow::Result<Reply> + Send + Sync>;
/// Instance property read on the resolved receiver
pub type FieldReader = Arc<dyn Fn(&Service) -> anyhow::Result<Reply> + Send + Sync>;

/// One entry of the interface table
#[derive(Clone)]
pub enum TargetEntry {
    Call(Handler),
    Method(MethodHandler),
    Read(Reader),
    Field(FieldReader),
    Value(Reply),
}

impl fmt::Debug for TargetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetEntry::Call(_) => f.write_str("Call(..)"),
            TargetEntry::Method(_) => f.write_str("Method(..)"),
            TargetEntry::Read(_) => f.write_str("Read(..)"),
            TargetEntry::Field(_) => f.write_str("Field(..)"),
            TargetEntry::Value(reply) => f.debug_tuple("Value").field(reply).finish(),
        }
    }
}

/// Interface table mapping every [`TargetKind`] to its callable.
///
/// Built once at startup and shared read-only by the dispatcher. Registering
/// the same target twice replaces the earlier entry.
#[derive(Clone, Default, Debug)]
pub struct TargetRegistry {
    entries: HashMap<TargetKind, TargetEntry>,
}

impl TargetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under an explicit target kind
    pub fn register(&mut self, kind: TargetKind, entry: TargetEntry) -> &mut Self {
        let target = kind.to_string();
        if self.entries.insert(kind, entry).is_some() {
            warn!(target = %target, "Replaced existing dispatch target");
        } else {
            info!(
                target = %target,
                total_targets = self.entries.len(),
                "Dispatch target registered"
            );
        }
        self
    }

    pub fn function<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(Arguments) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.register(
            TargetKind::Function {
                name: name.to_string(),
            },
            TargetEntry::Call(Arc::new(f)),
        )
    }

    pub fn static_method<F>(&mut self, class: &str, method: &str, f: F) -> &mut Self
    where
        F: Fn(Arguments) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.register(
            TargetKind::StaticMethod {
                class: class.to_string(),
                method: method.to_string(),
            },
            TargetEntry::Call(Arc::new(f)),
        )
    }

    /// Method called on the service the injector resolves for `class`
    pub fn instance_method<F>(&mut self, class: &str, method: &str, f: F) -> &mut Self
    where
        F: Fn(&Service, Arguments) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.register(
            TargetKind::InstanceMethod {
                class: class.to_string(),
                method: method.to_string(),
            },
            TargetEntry::Method(Arc::new(f)),
        )
    }

    pub fn closure<F>(&mut self, id: &str, f: F) -> &mut Self
    where
        F: Fn(Arguments) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.register(
            TargetKind::Closure { id: id.to_string() },
            TargetEntry::Call(Arc::new(f)),
        )
    }

    pub fn static_property<F>(&mut self, class: &str, name: &str, f: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.register(
            TargetKind::Property {
                class: class.to_string(),
                name: name.to_string(),
                is_static: true,
            },
            TargetEntry::Read(Arc::new(f)),
        )
    }

    /// Property read on the service the injector resolves for `class`
    pub fn property<F>(&mut self, class: &str, name: &str, f: F) -> &mut Self
    where
        F: Fn(&Service) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        self.register(
            TargetKind::Property {
                class: class.to_string(),
                name: name.to_string(),
                is_static: false,
            },
            TargetEntry::Field(Arc::new(f)),
        )
    }

    pub fn constant(&mut self, class: Option<&str>, name: &str, value: impl Into<Reply>) -> &mut Self {
        self.register(
            TargetKind::Constant {
                class: class.map(str::to_string),
                name: name.to_string(),
            },
            TargetEntry::Value(value.into()),
        )
    }

    #[must_use]
    pub fn get(&self, kind: &TargetKind) -> Option<&TargetEntry> {
        self.entries.get(kind)
    }

    #[must_use]
    pub fn contains(&self, kind: &TargetKind) -> bool {
        self.entries.contains_key(kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::DispatchTarget;

    #[test]
    fn test_lookup_by_kind() {
        let mut registry = TargetRegistry::new();
        registry
            .function("index", |_| Ok(Reply::text("home")))
            .constant(Some("App"), "VERSION", "1.0");

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&DispatchTarget::function("index").kind));
        assert!(registry.contains(&DispatchTarget::constant(Some("App"), "VERSION").kind));
        assert!(!registry.contains(&DispatchTarget::constant(None, "VERSION").kind));
        assert!(!registry.contains(&DispatchTarget::static_method("index", "index").kind));
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = TargetRegistry::new();
        registry.closure("c", |_| Ok(Reply::text("one")));
        registry.closure("c", |_| Ok(Reply::text("two")));
        assert_eq!(registry.len(), 1);
    }
}
