//! Placeholder expansion applied to attribute and text values.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::ParserConfig;

/// `${...}` placeholder.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// Prefix selecting a process environment variable.
const ENV_PREFIX: &str = "ENV=";

/// Expands raw values before they reach a descriptor.
///
/// Expansion is total: values it cannot expand are returned unchanged.
pub trait ValueExpander: Send + Sync {
    /// Expand one raw attribute or text value.
    fn expand(&self, value: &str) -> String;
}

/// Expander that returns every value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExpansion;

impl ValueExpander for NoExpansion {
    fn expand(&self, value: &str) -> String {
        value.to_string()
    }
}

/// Expander resolving `${name}` from a property map and `${ENV=NAME}` from
/// the process environment.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use descriptor_mapper::expand::{PropertyExpander, ValueExpander};
///
/// let mut properties = BTreeMap::new();
/// properties.insert("db.host".to_string(), "localhost".to_string());
/// let expander = PropertyExpander::new(properties);
///
/// assert_eq!(expander.expand("jdbc://${db.host}/app"), "jdbc://localhost/app");
/// assert_eq!(expander.expand("${missing}"), "${missing}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertyExpander {
    properties: BTreeMap<String, String>,
}

impl PropertyExpander {
    /// Create an expander over the given properties.
    #[must_use]
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self { properties }
    }

    /// Create an expander from the configured properties.
    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.properties.clone())
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name.strip_prefix(ENV_PREFIX) {
            Some(variable) => std::env::var(variable).ok(),
            None => self.properties.get(name).cloned(),
        }
    }
}

impl ValueExpander for PropertyExpander {
    fn expand(&self, value: &str) -> String {
        if !value.contains("${") {
            return value.to_string();
        }
        PLACEHOLDER_PATTERN
            .replace_all(value, |caps: &Captures<'_>| {
                self.lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expander() -> PropertyExpander {
        let mut properties = BTreeMap::new();
        properties.insert("host".to_string(), "mail.example.com".to_string());
        properties.insert("port".to_string(), "25".to_string());
        PropertyExpander::new(properties)
    }

    #[test]
    fn test_expand_known_properties() {
        assert_eq!(expander().expand("${host}:${port}"), "mail.example.com:25");
    }

    #[test]
    fn test_expand_leaves_unknown_placeholders() {
        assert_eq!(expander().expand("${nope} and ${host}"), "${nope} and mail.example.com");
    }

    #[test]
    fn test_expand_without_placeholders() {
        assert_eq!(expander().expand("plain value"), "plain value");
        assert_eq!(expander().expand("${unterminated"), "${unterminated");
    }

    #[test]
    fn test_expand_environment() {
        let value = expander().expand("${ENV=PATH}");
        assert_eq!(value, std::env::var("PATH").unwrap_or_else(|_| "${ENV=PATH}".into()));
        assert_eq!(
            expander().expand("${ENV=DESCRIPTOR_MAPPER_SURELY_UNSET_VARIABLE}"),
            "${ENV=DESCRIPTOR_MAPPER_SURELY_UNSET_VARIABLE}"
        );
    }

    #[test]
    fn test_no_expansion() {
        assert_eq!(NoExpansion.expand("${host}"), "${host}");
    }
}
