//! Route template compilation.
//!
//! Turns a human-authored template such as `/users/{id:int}[/{tab=profile}]`
//! into an anchored regex with one capture group per declared parameter, in
//! declaration order. Compilation is deterministic: the same source always
//! produces the same regex text.

use super::types::{CastSpec, CastType, ParamValue, Parameter, ParameterSource};
use crate::error::RouteError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `name`, `*`, `:cast`, `<regex>`, `=default` in that order
#[allow(clippy::expect_used)]
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?P<array>\*)?(?::(?P<cast>[A-Za-z_][A-Za-z0-9_]*))?(?:<(?P<re>.+)>)?(?:=(?P<default>.*))?$",
    )
    .expect("placeholder grammar is a valid regex")
});

const SEGMENT_BODY: &str = "[^/]+";
const REST_BODY: &str = ".+";

/// A template and the regex generated from it.
///
/// Serialized as its source text; deserializing recompiles.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Human-authored template
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Number of capture groups, excluding the implicit whole-match group
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("source", &self.source)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.regex.as_str() == other.regex.as_str()
    }
}

impl TryFrom<String> for CompiledPattern {
    type Error = RouteError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        compile_template(&source)?.pattern.ok_or_else(|| {
            RouteError::invalid_pattern(source, "template has no parameters to capture")
        })
    }
}

impl From<CompiledPattern> for String {
    fn from(pattern: CompiledPattern) -> Self {
        pattern.source
    }
}

/// Result of compiling a template
#[derive(Debug, Clone)]
pub struct Template {
    /// `None` for literal templates
    pub pattern: Option<CompiledPattern>,
    /// Capture parameters in declaration order
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Literal(String),
    Open,
    Close,
    Placeholder(String),
}

fn tokenize(source: &str) -> Result<Vec<Token>, RouteError> {
    let invalid = |reason: &str| RouteError::invalid_pattern(source, reason);
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        match c {
            '[' | ']' | '{' => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                match c {
                    '[' => tokens.push(Token::Open),
                    ']' => tokens.push(Token::Close),
                    _ => {
                        // Braces inside `<...>` belong to the custom regex.
                        let mut inner = String::new();
                        let mut in_regex = false;
                        let mut closed = false;
                        for c in chars.by_ref() {
                            match c {
                                '<' if !in_regex => in_regex = true,
                                '>' if in_regex => in_regex = false,
                                '{' if !in_regex => return Err(invalid("nested '{'")),
                                '}' if !in_regex => {
                                    closed = true;
                                    break;
                                }
                                _ => {}
                            }
                            inner.push(c);
                        }
                        if !closed {
                            return Err(invalid("unbalanced '{'"));
                        }
                        tokens.push(Token::Placeholder(inner));
                    }
                }
            }
            '}' => return Err(invalid("unmatched '}'")),
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Compile a route template.
///
/// # Errors
///
/// [`RouteError::InvalidPattern`] when the template is malformed or breaks a
/// parameter ordering rule.
pub fn compile_template(source: &str) -> Result<Template, RouteError> {
    let invalid = |reason: String| RouteError::invalid_pattern(source, reason);

    let mut regex = String::with_capacity(source.len() + 16);
    regex.push('^');
    let mut parameters: Vec<Parameter> = Vec::new();
    // Parameter count at each open optional section
    let mut sections: Vec<usize> = Vec::new();
    let mut seen_optional = false;

    for token in tokenize(source)? {
        match token {
            Token::Literal(text) => regex.push_str(&regex::escape(&text)),
            Token::Open => {
                sections.push(parameters.len());
                regex.push_str("(?:");
            }
            Token::Close => {
                let opened = sections
                    .pop()
                    .ok_or_else(|| invalid("unmatched ']'".into()))?;
                if opened == parameters.len() {
                    return Err(invalid("optional section without a parameter".into()));
                }
                regex.push_str(")?");
            }
            Token::Placeholder(inner) => {
                let caps = PLACEHOLDER
                    .captures(&inner)
                    .ok_or_else(|| invalid(format!("malformed placeholder '{{{inner}}}'")))?;
                let name = &caps["name"];
                if parameters.iter().any(|p| p.name.as_ref() == name) {
                    return Err(invalid(format!("duplicate parameter '{name}'")));
                }
                if let Some(array) = parameters.iter().find(|p| p.array) {
                    return Err(invalid(format!(
                        "array parameter '{}' must be the last parameter",
                        array.name
                    )));
                }

                let optional = !sections.is_empty();
                if !optional && seen_optional {
                    return Err(invalid(format!(
                        "required parameter '{name}' follows an optional parameter"
                    )));
                }
                seen_optional |= optional;

                let array = caps.name("array").is_some();
                let cast = match caps.name("cast") {
                    Some(m) => Some(CastSpec::eager(CastType::from_template(m.as_str()).ok_or_else(
                        || invalid(format!("unknown cast type '{}'", m.as_str())),
                    )?)),
                    None => None,
                };
                let body = caps
                    .name("re")
                    .map(|m| m.as_str())
                    .unwrap_or(if array { REST_BODY } else { SEGMENT_BODY });
                regex.push('(');
                regex.push_str(body);
                regex.push(')');

                let mut param = Parameter::new(
                    name,
                    ParameterSource::Capture {
                        group: parameters.len() + 1,
                    },
                );
                param.optional = optional;
                param.array = array;
                param.cast = cast;
                if let Some(default) = caps.name("default") {
                    if !optional {
                        return Err(invalid(format!(
                            "parameter '{name}' has a default but is not inside an optional section"
                        )));
                    }
                    param.default = Some(cast_default(&param, default.as_str()).map_err(|e| {
                        invalid(format!("default for '{name}' is not valid: {e}"))
                    })?);
                }
                parameters.push(param);
            }
        }
    }

    if !sections.is_empty() {
        return Err(invalid("unbalanced '['".into()));
    }
    regex.push('$');

    if parameters.is_empty() {
        return Ok(Template {
            pattern: None,
            parameters,
        });
    }

    let compiled = Regex::new(&regex).map_err(|e| invalid(e.to_string()))?;
    if compiled.captures_len() - 1 != parameters.len() {
        return Err(invalid(
            "custom parameter regex must not contain capture groups".into(),
        ));
    }

    Ok(Template {
        pattern: Some(CompiledPattern {
            source: source.to_string(),
            regex: compiled,
        }),
        parameters,
    })
}

/// Cast a template or builder default with the parameter's declared type.
///
/// Array defaults are comma separated.
pub(crate) fn cast_default(param: &Parameter, raw: &str) -> Result<ParamValue, RouteError> {
    if param.array {
        return raw
            .split(',')
            .filter(|item| !item.is_empty())
            .map(|item| param.convert(item))
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::List);
    }
    param.convert(raw)
}

/// Raw text of a cast default, the inverse of [`cast_default`]
pub(crate) fn raw_default(value: &ParamValue) -> String {
    match value {
        ParamValue::List(items) => items
            .iter()
            .map(raw_default)
            .collect::<Vec<_>>()
            .join(","),
        ParamValue::Typed { raw, .. } => raw.clone(),
        other => other.to_string(),
    }
}

/// Synthesize a concrete key that the template would match.
///
/// Placeholders are filled with a sample of their cast type and optional
/// sections are kept. Used to detect routes shadowed by earlier patterns.
#[must_use]
pub fn sample_key(source: &str, parameters: &[Parameter]) -> Option<String> {
    let tokens = tokenize(source).ok()?;
    let mut key = String::with_capacity(source.len());
    let mut index = 0;
    for token in tokens {
        match token {
            Token::Literal(text) => key.push_str(&text),
            Token::Open | Token::Close => {}
            Token::Placeholder(_) => {
                let sample = match parameters.get(index).and_then(|p| p.cast.as_ref()) {
                    Some(CastSpec {
                        ty: CastType::Int | CastType::Float,
                        ..
                    }) => "1",
                    Some(CastSpec {
                        ty: CastType::Bool, ..
                    }) => "true",
                    _ => "sample",
                };
                key.push_str(sample);
                index += 1;
            }
        }
    }
    Some(key)
}
