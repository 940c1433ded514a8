use super::pattern::CompiledPattern;
use crate::error::RouteError;
use crate::target::DispatchTarget;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Maximum number of bound parameters kept inline before spilling to the heap.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Bound parameter storage for the hot path.
///
/// Names are `Arc<str>` cloned from the route definition; values are per
/// invocation.
pub type ParamVec = SmallVec<[(Arc<str>, ParamValue); MAX_INLINE_PARAMS]>;

/// Middleware extension points of the routing pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// After a successful match, wrapping dispatch
    Matched,
    /// After a successful dispatch, wrapping its result
    Dispatched,
    /// When no route matches
    NotMatched,
    /// When any earlier stage or the dispatch fails
    Exception,
    /// Always last, for side effects only
    Terminated,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 5] = [
        Stage::Matched,
        Stage::Dispatched,
        Stage::NotMatched,
        Stage::Exception,
        Stage::Terminated,
    ];

    /// Stable lowercase name used in logs and route files
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Matched => "matched",
            Stage::Dispatched => "dispatched",
            Stage::NotMatched => "not_matched",
            Stage::Exception => "exception",
            Stage::Terminated => "terminated",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a middleware, resolved through a [`crate::middleware::MiddlewareRegistry`]
pub type MiddlewareRef = String;

/// A bound parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Optional parameter that was absent and has no default
    Null,
    /// Boolean from an eager `bool` cast
    Bool(bool),
    /// Integer from an eager `int` cast
    Int(i64),
    /// Float from an eager `float` cast
    Float(f64),
    /// Raw or `string`-cast text
    Str(String),
    /// Array capture, one element per delimited item or token
    List(Vec<ParamValue>),
    /// Deferred cast: raw text wrapped with its declared type name
    Typed {
        /// Declared type
        type_name: String,
        /// Unparsed captured text
        raw: String,
    },
}

impl ParamValue {
    /// Borrow the text of a `Str` or `Typed` value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::Typed { raw, .. } => Some(raw),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => f.write_str("null"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Str(v) => f.write_str(v),
            ParamValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ParamValue::Typed { type_name, raw } => write!(f, "{type_name}({raw})"),
        }
    }
}

/// Target type of a parameter cast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastType {
    String,
    Int,
    Float,
    Bool,
    /// Application type; only valid as a deferred cast
    Named(String),
}

impl CastType {
    /// Parse the type name used in route templates (`{id:int}`)
    #[must_use]
    pub fn from_template(name: &str) -> Option<Self> {
        match name {
            "int" | "integer" => Some(CastType::Int),
            "float" | "number" => Some(CastType::Float),
            "bool" | "boolean" => Some(CastType::Bool),
            "string" | "str" => Some(CastType::String),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        match self {
            CastType::String => "string",
            CastType::Int => "int",
            CastType::Float => "float",
            CastType::Bool => "bool",
            CastType::Named(name) => name,
        }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a raw captured string becomes a typed value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastSpec {
    /// Target type
    #[serde(rename = "type")]
    pub ty: CastType,
    /// Parse immediately at match time (`true`) or wrap the raw text (`false`)
    pub eager: bool,
}

impl CastSpec {
    /// Eager conversion to a scalar type
    #[must_use]
    pub fn eager(ty: CastType) -> Self {
        Self { ty, eager: true }
    }

    /// Deferred wrapping in a typed holder
    #[must_use]
    pub fn deferred(ty: CastType) -> Self {
        Self { ty, eager: false }
    }

    /// Deferred wrapping in a named application type
    #[must_use]
    pub fn named(type_name: impl Into<String>) -> Self {
        Self::deferred(CastType::Named(type_name.into()))
    }

    /// Convert one raw string with this cast
    ///
    /// # Errors
    ///
    /// [`RouteError::ParameterCast`] when an eager conversion fails to parse.
    pub fn apply(&self, parameter: &str, raw: &str) -> Result<ParamValue, RouteError> {
        if !self.eager {
            return Ok(ParamValue::Typed {
                type_name: self.ty.to_string(),
                raw: raw.to_string(),
            });
        }
        let failed = || RouteError::ParameterCast {
            parameter: parameter.to_string(),
            expected: self.ty.to_string(),
            raw: raw.to_string(),
        };
        match &self.ty {
            CastType::String => Ok(ParamValue::Str(raw.to_string())),
            CastType::Int => raw.parse::<i64>().map(ParamValue::Int).map_err(|_| failed()),
            CastType::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ParamValue::Float)
                .ok_or_else(failed),
            CastType::Bool => parse_bool(raw).map(ParamValue::Bool).ok_or_else(failed),
            // Rejected by route validation; a holder is the only sensible result.
            CastType::Named(name) => Ok(ParamValue::Typed {
                type_name: name.clone(),
                raw: raw.to_string(),
            }),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Where a parameter's raw value comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "from")]
pub enum ParameterSource {
    /// Capture group of the route's compiled pattern (1-based)
    Capture { group: usize },
    /// Positional command-line token
    Positional { index: usize },
    /// Named command-line option, matched by long name or a short alias
    Option {
        long: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        aliases: Vec<String>,
    },
}

impl ParameterSource {
    /// Capture and positional parameters are matched by position
    #[must_use]
    pub fn is_positional(&self) -> bool {
        !matches!(self, ParameterSource::Option { .. })
    }
}

/// One declared parameter of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Arc<str>,
    pub source: ParameterSource,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
    /// Consumes all remaining captures/tokens, producing a list
    #[serde(default)]
    pub array: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast: Option<CastSpec>,
}

impl Parameter {
    /// Required parameter with no cast
    pub fn new(name: impl AsRef<str>, source: ParameterSource) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            source,
            optional: false,
            default: None,
            array: false,
            cast: None,
        }
    }

    /// Convert one raw value with this parameter's cast (identity when unset)
    ///
    /// # Errors
    ///
    /// [`RouteError::ParameterCast`] when an eager conversion fails.
    pub fn convert(&self, raw: &str) -> Result<ParamValue, RouteError> {
        match &self.cast {
            Some(cast) => cast.apply(&self.name, raw),
            None => Ok(ParamValue::Str(raw.to_string())),
        }
    }

    /// Value bound when the parameter is absent
    #[must_use]
    pub fn absent_value(&self) -> ParamValue {
        self.default.clone().unwrap_or(if self.array {
            ParamValue::List(Vec::new())
        } else {
            ParamValue::Null
        })
    }
}

/// Parameters bound by a successful match, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParams(ParamVec);

impl BoundParams {
    #[must_use]
    pub fn new() -> Self {
        Self(ParamVec::new())
    }

    pub fn push(&mut self, name: Arc<str>, value: ParamValue) {
        self.0.push((name, value));
    }

    /// Look up a value by parameter name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Parameter names in binding order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_ref())
    }

    #[must_use]
    pub fn into_inner(self) -> ParamVec {
        self.0
    }
}

impl IntoIterator for BoundParams {
    type Item = (Arc<str>, ParamValue);
    type IntoIter = smallvec::IntoIter<[(Arc<str>, ParamValue); MAX_INLINE_PARAMS]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One routable unit: a match key, an optional compiled pattern, declared
/// parameters, a dispatch target and per-stage middleware.
///
/// Immutable once built; shared behind `Arc` by the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Literal path or command name; the template source for dynamic routes
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<CompiledPattern>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    pub target: DispatchTarget,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub middleware: BTreeMap<Stage, Vec<MiddlewareRef>>,
}

impl RouteDefinition {
    /// Whether this route is matched through its compiled pattern
    #[inline]
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.pattern.is_some()
    }

    /// Middleware references declared for a stage (empty when none)
    #[must_use]
    pub fn middleware_for(&self, stage: Stage) -> &[MiddlewareRef] {
        self.middleware.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parameters bound from pattern captures, in declaration order
    pub fn capture_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| matches!(p.source, ParameterSource::Capture { .. }))
    }

    /// Check the structural invariants of a route definition.
    ///
    /// - `pattern` is present iff some parameter is capture-sourced, and the
    ///   pattern's group count equals the number of capture parameters
    /// - parameter names are unique
    /// - at most one array parameter; a positional array parameter is last
    ///   among positional parameters
    /// - an optional positional parameter never precedes a required one
    /// - named types are only cast lazily
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidPattern`] describing the first violation.
    pub fn validate(&self) -> Result<(), RouteError> {
        let invalid = |reason: String| RouteError::invalid_pattern(self.key.clone(), reason);

        let captures = self.capture_parameters().count();
        match &self.pattern {
            Some(pattern) => {
                if captures == 0 {
                    return Err(invalid("pattern declared without capture parameters".into()));
                }
                if pattern.group_count() != captures {
                    return Err(invalid(format!(
                        "pattern has {} capture groups but {} capture parameters are declared",
                        pattern.group_count(),
                        captures
                    )));
                }
                for (expected, param) in self.capture_parameters().enumerate() {
                    if param.source != (ParameterSource::Capture { group: expected + 1 }) {
                        return Err(invalid(format!(
                            "parameter '{}' is not bound to capture group {}",
                            param.name,
                            expected + 1
                        )));
                    }
                }
            }
            None if captures > 0 => {
                return Err(invalid("capture parameters declared on a literal route".into()));
            }
            None => {}
        }

        for (i, param) in self.parameters.iter().enumerate() {
            if self.parameters[..i].iter().any(|p| p.name == param.name) {
                return Err(invalid(format!("duplicate parameter '{}'", param.name)));
            }
            if let Some(CastSpec {
                ty: CastType::Named(name),
                eager: true,
            }) = &param.cast
            {
                return Err(invalid(format!(
                    "parameter '{}' cannot eagerly cast to named type '{name}'",
                    param.name
                )));
            }
        }

        if self.parameters.iter().filter(|p| p.array).count() > 1 {
            return Err(invalid("only one array parameter is allowed".into()));
        }

        let positional: Vec<&Parameter> = self
            .parameters
            .iter()
            .filter(|p| p.source.is_positional())
            .collect();
        for (i, param) in positional.iter().enumerate() {
            if param.array && i + 1 != positional.len() {
                return Err(invalid(format!(
                    "array parameter '{}' must be the last parameter",
                    param.name
                )));
            }
            if !param.optional && positional[..i].iter().any(|p| p.optional) {
                return Err(invalid(format!(
                    "required parameter '{}' follows an optional parameter",
                    param.name
                )));
            }
        }

        let mut expected_index = 0;
        for param in &positional {
            if let ParameterSource::Positional { index } = param.source {
                if index != expected_index {
                    return Err(invalid(format!(
                        "positional parameter '{}' declared at index {index}, expected {expected_index}",
                        param.name
                    )));
                }
                expected_index += 1;
            }
        }

        Ok(())
    }
}
