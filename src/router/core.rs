//! Matcher core - hot path for request and command routing.
//!
//! Exact lookup first, then a registration-order scan of dynamic patterns.
//! Bound parameters are stored in a [`BoundParams`] (`SmallVec`) so routes with
//! up to eight parameters bind without spilling to the heap.

use super::args::CommandArgs;
use super::collection::RouteCollection;
use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::route::{BoundParams, ParamValue, Parameter, ParameterSource, RouteDefinition};
use regex::Captures;
use std::sync::Arc;
use tracing::debug;

/// Outcome of matching one input against the collection
#[derive(Debug, Clone)]
pub enum MatchResult {
    NoMatch,
    Matched {
        /// Shared route definition (Arc clone, no deep copy)
        route: Arc<RouteDefinition>,
        /// Parameter values in declaration order
        params: BoundParams,
    },
}

impl MatchResult {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }

    /// Matched route, if any
    #[must_use]
    pub fn route(&self) -> Option<&Arc<RouteDefinition>> {
        match self {
            MatchResult::Matched { route, .. } => Some(route),
            MatchResult::NoMatch => None,
        }
    }

    /// Bound value of a parameter, if matched and bound
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        match self {
            MatchResult::Matched { params, .. } => params.get(name),
            MatchResult::NoMatch => None,
        }
    }
}

/// Matches paths and command names against a [`RouteCollection`].
///
/// Cheap to clone; the collection is shared.
#[derive(Debug, Clone)]
pub struct Matcher {
    collection: Arc<RouteCollection>,
    array_delimiter: String,
    trim_trailing_slash: bool,
}

impl Matcher {
    /// Matcher with default configuration
    #[must_use]
    pub fn new(collection: Arc<RouteCollection>) -> Self {
        Self::with_config(collection, &RouterConfig::default())
    }

    #[must_use]
    pub fn with_config(collection: Arc<RouteCollection>, config: &RouterConfig) -> Self {
        Self {
            collection,
            array_delimiter: config.array_delimiter.clone(),
            trim_trailing_slash: config.trim_trailing_slash,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &RouteCollection {
        &self.collection
    }

    /// Match a path or command name.
    ///
    /// Only capture parameters are bound; command inputs are bound by
    /// [`Matcher::match_command`].
    ///
    /// # Errors
    ///
    /// - [`RouteError::ParameterCast`] when a capture fails its eager cast
    /// - [`RouteError::InvalidPattern`] when a required capture is missing,
    ///   which means the pattern and its parameters disagree
    pub fn match_route(&self, input: &str) -> Result<MatchResult, RouteError> {
        let input = self.normalize(input);

        if let Some(route) = self.collection.get(input) {
            debug!(input = %input, route = %route.key, "Exact route matched");
            return Ok(MatchResult::Matched {
                route: Arc::clone(route),
                params: BoundParams::new(),
            });
        }

        for route in self.collection.dynamic() {
            let Some(pattern) = &route.pattern else {
                continue;
            };
            if let Some(caps) = pattern.regex().captures(input) {
                let params = self.bind_captures(route, &caps)?;
                debug!(
                    input = %input,
                    route = %route.key,
                    params_count = params.len(),
                    "Dynamic route matched"
                );
                return Ok(MatchResult::Matched {
                    route: Arc::clone(route),
                    params,
                });
            }
        }

        debug!(input = %input, "No route matched");
        Ok(MatchResult::NoMatch)
    }

    /// Match a command name, then bind its positional and option inputs.
    ///
    /// # Errors
    ///
    /// Everything [`Matcher::match_route`] raises, plus
    /// [`RouteError::MalformedInput`] for a missing required input, an
    /// undeclared option, or surplus positional tokens.
    pub fn match_command(&self, name: &str, args: &CommandArgs) -> Result<MatchResult, RouteError> {
        match self.match_route(name)? {
            MatchResult::Matched { route, mut params } => {
                bind_inputs(&route, args, &mut params)?;
                Ok(MatchResult::Matched { route, params })
            }
            MatchResult::NoMatch => Ok(MatchResult::NoMatch),
        }
    }

    fn normalize<'a>(&self, input: &'a str) -> &'a str {
        if !self.trim_trailing_slash {
            return input;
        }
        match input.trim_end_matches('/') {
            "" if input.starts_with('/') => "/",
            trimmed => trimmed,
        }
    }

    fn bind_captures(
        &self,
        route: &RouteDefinition,
        caps: &Captures<'_>,
    ) -> Result<BoundParams, RouteError> {
        let mut params = BoundParams::new();
        for param in route.capture_parameters() {
            let ParameterSource::Capture { group } = param.source else {
                continue;
            };
            let value = match caps.get(group) {
                Some(m) if param.array => split_array(param, m.as_str(), &self.array_delimiter)?,
                Some(m) => param.convert(m.as_str())?,
                None if param.optional => param.absent_value(),
                None => {
                    return Err(RouteError::invalid_pattern(
                        route.key.clone(),
                        format!(
                            "required parameter '{}' has no capture in group {group}",
                            param.name
                        ),
                    ))
                }
            };
            params.push(Arc::clone(&param.name), value);
        }
        Ok(params)
    }
}

fn split_array(param: &Parameter, raw: &str, delimiter: &str) -> Result<ParamValue, RouteError> {
    raw.split(delimiter)
        .filter(|item| !item.is_empty())
        .map(|item| param.convert(item))
        .collect::<Result<Vec<_>, _>>()
        .map(ParamValue::List)
}

fn bind_inputs(
    route: &RouteDefinition,
    args: &CommandArgs,
    params: &mut BoundParams,
) -> Result<(), RouteError> {
    let malformed = |reason: String| RouteError::malformed(route.key.clone(), reason);

    for (name, _) in args.options() {
        let declared = route.parameters.iter().any(|p| match &p.source {
            ParameterSource::Option { long, aliases } => {
                long == name || aliases.iter().any(|a| a == name)
            }
            _ => false,
        });
        if !declared {
            return Err(malformed(format!("unknown option '{}'", dashed(name))));
        }
    }

    let tokens = args.positionals();
    let positional_count = route
        .parameters
        .iter()
        .filter(|p| matches!(p.source, ParameterSource::Positional { .. }))
        .count();
    let takes_rest = route
        .parameters
        .iter()
        .any(|p| p.array && matches!(p.source, ParameterSource::Positional { .. }));
    if !takes_rest && tokens.len() > positional_count {
        return Err(malformed(format!(
            "unexpected argument '{}'",
            tokens[positional_count]
        )));
    }

    for param in &route.parameters {
        let value = match &param.source {
            ParameterSource::Capture { .. } => continue,
            ParameterSource::Positional { index } if param.array => {
                let rest = tokens.get(*index..).unwrap_or_default();
                if rest.is_empty() {
                    absent(param).ok_or_else(|| {
                        malformed(format!("missing required argument '<{}>'", param.name))
                    })?
                } else {
                    rest.iter()
                        .map(|token| param.convert(token))
                        .collect::<Result<Vec<_>, _>>()
                        .map(ParamValue::List)?
                }
            }
            ParameterSource::Positional { index } => match tokens.get(*index) {
                Some(token) => param.convert(token)?,
                None => absent(param).ok_or_else(|| {
                    malformed(format!("missing required argument '<{}>'", param.name))
                })?,
            },
            ParameterSource::Option { long, aliases } => {
                let mut names: Vec<&str> = Vec::with_capacity(aliases.len() + 1);
                names.push(long);
                names.extend(aliases.iter().map(String::as_str));
                let values: Vec<&str> = args.values_of(&names).collect();
                match values.last() {
                    None => absent(param).ok_or_else(|| {
                        malformed(format!("missing required option '{}'", dashed(long)))
                    })?,
                    Some(_) if param.array => values
                        .iter()
                        .map(|item| param.convert(item))
                        .collect::<Result<Vec<_>, _>>()
                        .map(ParamValue::List)?,
                    Some(last) => param.convert(last)?,
                }
            }
        };
        params.push(Arc::clone(&param.name), value);
    }
    Ok(())
}

fn absent(param: &Parameter) -> Option<ParamValue> {
    param.optional.then(|| param.absent_value())
}

fn dashed(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}
