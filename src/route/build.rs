use super::pattern::{cast_default, compile_template, raw_default};
use super::types::{CastSpec, MiddlewareRef, Parameter, ParameterSource, RouteDefinition, Stage};
use crate::error::RouteError;
use crate::target::DispatchTarget;
use std::collections::BTreeMap;

/// Fluent construction of a [`RouteDefinition`].
///
/// The template is compiled in [`RouteBuilder::build`]; any error recorded by
/// an earlier call is reported there, so a chain never panics.
///
/// # Example
///
/// ```rust
/// use routeflow::route::{RouteBuilder, Stage};
/// use routeflow::target::DispatchTarget;
///
/// let route = RouteBuilder::new("/post/{id:int}", DispatchTarget::function("show_post"))
///     .middleware(Stage::Matched, "auth")
///     .build()
///     .unwrap();
/// assert!(route.is_dynamic());
/// ```
#[derive(Debug)]
pub struct RouteBuilder {
    template: String,
    target: DispatchTarget,
    casts: Vec<(String, CastSpec)>,
    defaults: Vec<(String, String)>,
    inputs: Vec<Parameter>,
    middleware: BTreeMap<Stage, Vec<MiddlewareRef>>,
}

impl RouteBuilder {
    /// Start a route for a path or command template
    pub fn new(template: impl Into<String>, target: DispatchTarget) -> Self {
        Self {
            template: template.into(),
            target,
            casts: Vec::new(),
            defaults: Vec::new(),
            inputs: Vec::new(),
            middleware: BTreeMap::new(),
        }
    }

    /// Cast a parameter, e.g. to a deferred named type.
    ///
    /// A cast written in the template (`{id:int}`) cannot be changed here.
    #[must_use]
    pub fn cast(mut self, parameter: impl Into<String>, cast: CastSpec) -> Self {
        self.casts.push((parameter.into(), cast));
        self
    }

    /// Default value for an optional parameter, cast with its declared type
    #[must_use]
    pub fn default(mut self, parameter: impl Into<String>, raw: impl Into<String>) -> Self {
        self.defaults.push((parameter.into(), raw.into()));
        self
    }

    /// Required positional command argument
    #[must_use]
    pub fn argument(mut self, name: &str) -> Self {
        let index = self.next_position();
        self.inputs
            .push(Parameter::new(name, ParameterSource::Positional { index }));
        self
    }

    /// Optional positional command argument
    #[must_use]
    pub fn optional_argument(mut self, name: &str) -> Self {
        let index = self.next_position();
        let mut param = Parameter::new(name, ParameterSource::Positional { index });
        param.optional = true;
        self.inputs.push(param);
        self
    }

    /// Positional argument consuming every remaining token
    #[must_use]
    pub fn array_argument(mut self, name: &str, optional: bool) -> Self {
        let index = self.next_position();
        let mut param = Parameter::new(name, ParameterSource::Positional { index });
        param.array = true;
        param.optional = optional;
        self.inputs.push(param);
        self
    }

    /// Optional named option (`--long`, or any alias such as `-l`)
    #[must_use]
    pub fn option(mut self, long: &str, aliases: &[&str]) -> Self {
        let mut param = Parameter::new(
            long,
            ParameterSource::Option {
                long: long.to_string(),
                aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
            },
        );
        param.optional = true;
        self.inputs.push(param);
        self
    }

    /// Optional named option that may repeat; every occurrence is collected
    #[must_use]
    pub fn array_option(self, long: &str, aliases: &[&str]) -> Self {
        let mut this = self.option(long, aliases);
        if let Some(param) = this.inputs.last_mut() {
            param.array = true;
        }
        this
    }

    /// Named option that must be supplied
    #[must_use]
    pub fn required_option(self, long: &str, aliases: &[&str]) -> Self {
        let mut this = self.option(long, aliases);
        if let Some(param) = this.inputs.last_mut() {
            param.optional = false;
        }
        this
    }

    /// Append a middleware reference to a stage
    #[must_use]
    pub fn middleware(mut self, stage: Stage, name: impl Into<MiddlewareRef>) -> Self {
        self.middleware.entry(stage).or_default().push(name.into());
        self
    }

    fn next_position(&self) -> usize {
        self.inputs
            .iter()
            .filter(|p| matches!(p.source, ParameterSource::Positional { .. }))
            .count()
    }

    /// Compile the template and validate the finished definition.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidPattern`] for a malformed template, an unknown
    /// parameter in `cast`/`default`, or any violated route invariant.
    pub fn build(self) -> Result<RouteDefinition, RouteError> {
        let template = compile_template(&self.template)?;
        let mut parameters = template.parameters;
        parameters.extend(self.inputs);

        for (name, cast) in self.casts {
            let param = find_mut(&mut parameters, &name, &self.template)?;
            if let Some(declared) = &param.cast {
                if matches!(param.source, ParameterSource::Capture { .. }) && *declared != cast {
                    return Err(RouteError::invalid_pattern(
                        self.template,
                        format!(
                            "parameter '{name}' is already cast to {} by the template",
                            declared.ty
                        ),
                    ));
                }
            }
            param.cast = Some(cast);
            // Defaults from the template were cast before the override.
            if let Some(default) = param.default.take() {
                let raw = raw_default(&default);
                param.default = Some(cast_default(param, &raw)?);
            }
        }

        for (name, raw) in self.defaults {
            let param = find_mut(&mut parameters, &name, &self.template)?;
            if !param.optional {
                return Err(RouteError::invalid_pattern(
                    self.template,
                    format!("default given for required parameter '{name}'"),
                ));
            }
            param.default = Some(cast_default(param, &raw).map_err(|e| {
                RouteError::invalid_pattern(
                    self.template.clone(),
                    format!("default for '{name}' is not valid: {e}"),
                )
            })?);
        }

        let route = RouteDefinition {
            key: self.template,
            pattern: template.pattern,
            parameters,
            target: self.target,
            middleware: self.middleware,
        };
        route.validate()?;
        Ok(route)
    }
}

fn find_mut<'a>(
    parameters: &'a mut [Parameter],
    name: &str,
    template: &str,
) -> Result<&'a mut Parameter, RouteError> {
    parameters
        .iter_mut()
        .find(|p| p.name.as_ref() == name)
        .ok_or_else(|| {
            RouteError::invalid_pattern(template, format!("no parameter named '{name}'"))
        })
}
