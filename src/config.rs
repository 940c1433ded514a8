//! # Router Configuration Module
//!
//! Environment-driven settings that affect matching behavior.
//!
//! ## Environment Variables
//!
//! ### `ROUTEFLOW_ARRAY_DELIMITER`
//!
//! Delimiter used to split array captures such as `/files/{path*}`.
//!
//! Default: `/`
//!
//! ### `ROUTEFLOW_WARN_OVERLAP`
//!
//! Emit a warning when a newly registered dynamic route may be shadowed by an
//! earlier one. Accepts `true`/`false`/`1`/`0`/`yes`/`no`/`on`/`off`.
//!
//! Default: `true`
//!
//! ### `ROUTEFLOW_ROUTE_CACHE`
//!
//! Path of a route table (YAML or JSON) loaded when the router is built.
//!
//! Default: unset
//!
//! ### `ROUTEFLOW_TRIM_TRAILING_SLASH`
//!
//! Match `/users/` as `/users`. The root path `/` is never trimmed.
//!
//! Default: `false`
//!
//! ## Usage
//!
//! ```rust
//! use routeflow::config::RouterConfig;
//!
//! let config = RouterConfig::from_env();
//! println!("Array delimiter: {}", config.array_delimiter);
//! ```

use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Matching behavior loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Delimiter for array captures (default: `/`)
    pub array_delimiter: String,
    /// Warn about possibly shadowed dynamic routes (default: on)
    pub warn_on_overlap: bool,
    /// Route table loaded at build time
    pub route_cache: Option<PathBuf>,
    /// Ignore trailing slashes when matching (default: off)
    pub trim_trailing_slash: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            array_delimiter: "/".to_string(),
            warn_on_overlap: true,
            route_cache: None,
            trim_trailing_slash: false,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    ///
    /// Invalid values fall back to the defaults with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let array_delimiter = match lookup("ROUTEFLOW_ARRAY_DELIMITER") {
            Some(val) if !val.is_empty() => val,
            Some(_) => {
                warn!(
                    variable = "ROUTEFLOW_ARRAY_DELIMITER",
                    "Empty array delimiter, using default"
                );
                defaults.array_delimiter
            }
            None => defaults.array_delimiter,
        };

        RouterConfig {
            array_delimiter,
            warn_on_overlap: flag(
                &lookup,
                "ROUTEFLOW_WARN_OVERLAP",
                defaults.warn_on_overlap,
            ),
            route_cache: lookup("ROUTEFLOW_ROUTE_CACHE")
                .filter(|val| !val.is_empty())
                .map(PathBuf::from),
            trim_trailing_slash: flag(
                &lookup,
                "ROUTEFLOW_TRIM_TRAILING_SLASH",
                defaults.trim_trailing_slash,
            ),
        }
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    let Some(val) = lookup(key) else {
        return default;
    };
    match val.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            warn!(variable = key, value = %val, default = default, "Invalid boolean, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> RouterConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RouterConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]), RouterConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ROUTEFLOW_ARRAY_DELIMITER", ","),
            ("ROUTEFLOW_WARN_OVERLAP", "off"),
            ("ROUTEFLOW_ROUTE_CACHE", "/tmp/routes.yaml"),
            ("ROUTEFLOW_TRIM_TRAILING_SLASH", "YES"),
        ]);
        assert_eq!(config.array_delimiter, ",");
        assert!(!config.warn_on_overlap);
        assert_eq!(config.route_cache, Some(PathBuf::from("/tmp/routes.yaml")));
        assert!(config.trim_trailing_slash);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("ROUTEFLOW_ARRAY_DELIMITER", ""),
            ("ROUTEFLOW_WARN_OVERLAP", "sometimes"),
            ("ROUTEFLOW_ROUTE_CACHE", ""),
        ]);
        assert_eq!(config, RouterConfig::default());
    }
}
