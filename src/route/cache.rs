use super::pattern::{cast_default, compile_template, raw_default};
use super::types::{Parameter, ParameterSource, RouteDefinition};
use crate::error::RouteError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Current on-disk route table format
pub const TABLE_VERSION: u32 = 1;

/// Serialized route collection.
///
/// Exact routes come first, then dynamic routes, both in registration order.
/// Patterns are stored as their template source and recompiled on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    pub version: u32,
    #[serde(default)]
    pub exact: Vec<RouteDefinition>,
    #[serde(default)]
    pub dynamic: Vec<RouteDefinition>,
}

/// File encoding of a route table, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Yaml,
    Json,
}

impl TableFormat {
    /// `.yaml`/`.yml` are YAML, anything else is JSON
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => TableFormat::Yaml,
            _ => TableFormat::Json,
        }
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(exact: Vec<RouteDefinition>, dynamic: Vec<RouteDefinition>) -> Self {
        Self {
            version: TABLE_VERSION,
            exact,
            dynamic,
        }
    }

    /// Number of routes in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.dynamic.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.dynamic.is_empty()
    }

    /// Parse a table from text in the given format.
    ///
    /// # Errors
    ///
    /// [`RouteError::Cache`] for malformed content or an unsupported version.
    /// Invalid patterns inside the table surface as [`RouteError::Cache`] too,
    /// since deserialization recompiles them.
    pub fn parse(content: &str, format: TableFormat) -> Result<Self, RouteError> {
        let table: RouteTable = match format {
            TableFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| RouteError::Cache(e.to_string()))?
            }
            TableFormat::Json => {
                serde_json::from_str(content).map_err(|e| RouteError::Cache(e.to_string()))?
            }
        };
        if table.version != TABLE_VERSION {
            return Err(RouteError::Cache(format!(
                "unsupported route table version {} (expected {TABLE_VERSION})",
                table.version
            )));
        }
        Ok(table)
    }

    /// Render the table in the given format.
    ///
    /// # Errors
    ///
    /// [`RouteError::Cache`] if serialization fails.
    pub fn render(&self, format: TableFormat) -> Result<String, RouteError> {
        match format {
            TableFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| RouteError::Cache(e.to_string()))
            }
            TableFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| RouteError::Cache(e.to_string()))
            }
        }
    }

    /// Read a table from disk.
    ///
    /// # Errors
    ///
    /// [`RouteError::Cache`] when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouteError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RouteError::Cache(format!("{}: {e}", path.display())))?;
        let table = Self::parse(&content, TableFormat::from_path(path))
            .map_err(|e| RouteError::Cache(format!("{}: {e}", path.display())))?;
        info!(
            path = %path.display(),
            routes_count = table.len(),
            "Route table loaded"
        );
        Ok(table)
    }

    /// Write the table to disk.
    ///
    /// # Errors
    ///
    /// [`RouteError::Cache`] when the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RouteError> {
        let path = path.as_ref();
        let content = self.render(TableFormat::from_path(path))?;
        std::fs::write(path, content)
            .map_err(|e| RouteError::Cache(format!("{}: {e}", path.display())))?;
        info!(
            path = %path.display(),
            routes_count = self.len(),
            "Route table written"
        );
        Ok(())
    }

    /// Consume the table into route definitions ready for registration.
    ///
    /// Every template is recompiled from its source. Entries that list no
    /// capture parameters (hand-authored files) take them from the template;
    /// entries that do list them must agree with the template.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidPattern`] or [`RouteError::Cache`] for an entry
    /// that does not survive recompilation.
    pub fn into_routes(self) -> Result<Vec<RouteDefinition>, RouteError> {
        self.exact
            .into_iter()
            .chain(self.dynamic)
            .map(restore)
            .collect()
    }
}

fn restore(mut route: RouteDefinition) -> Result<RouteDefinition, RouteError> {
    let source = route
        .pattern
        .as_ref()
        .map_or(route.key.as_str(), |p| p.source());
    let template = compile_template(source)?;

    let stored: Vec<&Parameter> = route.capture_parameters().collect();
    if stored.is_empty() {
        if !template.parameters.is_empty() {
            debug!(route = %route.key, "Deriving capture parameters from template");
        }
        let mut parameters = template.parameters;
        parameters.append(&mut route.parameters);
        route.parameters = parameters;
        route.pattern = template.pattern;
    } else {
        let same_shape = stored.len() == template.parameters.len()
            && stored.iter().zip(&template.parameters).all(|(a, b)| {
                a.name == b.name
                    && a.source == b.source
                    && a.optional == b.optional
                    && a.array == b.array
            });
        if !same_shape {
            return Err(RouteError::Cache(format!(
                "stored parameters of '{}' do not match its template",
                route.key
            )));
        }
        if route.pattern.is_none() {
            route.pattern = template.pattern;
        }
        let captures = route
            .parameters
            .iter_mut()
            .filter(|p| matches!(p.source, ParameterSource::Capture { .. }));
        for (stored, fresh) in captures.zip(template.parameters) {
            reconcile_cast(&route.key, stored, fresh)?;
        }
    }

    route.validate()?;
    Ok(route)
}

/// A cast written in the template wins: a stored capture without one takes
/// it, a stored capture with a different one is rejected.
fn reconcile_cast(key: &str, stored: &mut Parameter, fresh: Parameter) -> Result<(), RouteError> {
    let Some(cast) = fresh.cast else {
        return Ok(());
    };
    match &stored.cast {
        Some(existing) if *existing == cast => Ok(()),
        Some(existing) => Err(RouteError::Cache(format!(
            "parameter '{}' of '{key}' is stored with cast {} but its template casts to {}",
            stored.name, existing.ty, cast.ty
        ))),
        None => {
            stored.cast = Some(cast);
            stored.default = match stored.default.take() {
                Some(value) => Some(
                    cast_default(stored, &raw_default(&value))
                        .map_err(|e| RouteError::Cache(format!("{key}: {e}")))?,
                ),
                None => fresh.default,
            };
            Ok(())
        }
    }
}
