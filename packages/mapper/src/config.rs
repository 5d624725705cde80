//! Configuration constants, parser settings and validation functions.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DescriptorError, Result};

/// Jakarta EE deployment descriptor namespace.
pub const JAKARTAEE_NAMESPACE: &str = "https://jakarta.ee/xml/ns/jakartaee";

/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Schema location written for application descriptors.
pub const APPLICATION_SCHEMA_LOCATION: &str =
    "https://jakarta.ee/xml/ns/jakartaee https://jakarta.ee/xml/ns/jakartaee/application_10.xsd";

/// Schema version written for application descriptors.
pub const APPLICATION_SCHEMA_VERSION: &str = "10";

/// Public identifier of the runtime application DTD.
pub const RUNTIME_APPLICATION_PUBLIC_ID: &str =
    "-//GlassFish.org//DTD GlassFish Application Server 3.1 Java EE Application 6.0//EN";

/// System identifier of the runtime application DTD.
pub const RUNTIME_APPLICATION_SYSTEM_ID: &str =
    "http://glassfish.org/dtds/glassfish-application_6_0-1.dtd";

/// Indentation width of serialized documents.
pub const DEFAULT_INDENT: usize = 2;

/// Property name pattern: identifier with dots and dashes.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PROPERTY_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$").expect("valid regex"));

/// What the parse engine does with a structural error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructuralErrorPolicy {
    /// Abort the whole document.
    #[default]
    Fail,
    /// Discard the descriptor of the failing subtree and continue.
    DropSubtree,
}

/// Settings for reading and writing descriptors.
///
/// # Examples
/// ```
/// use descriptor_mapper::config::{ParserConfig, StructuralErrorPolicy};
///
/// let config = ParserConfig::from_yaml_str("structural-errors: drop-subtree\n").unwrap();
/// assert_eq!(config.structural_errors, StructuralErrorPolicy::DropSubtree);
/// assert_eq!(config.indent, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParserConfig {
    /// Structural error handling.
    pub structural_errors: StructuralErrorPolicy,

    /// Values substituted for `${name}` placeholders.
    pub properties: BTreeMap<String, String>,

    /// Indentation width of serialized output.
    pub indent: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            structural_errors: StructuralErrorPolicy::default(),
            properties: BTreeMap::new(),
            indent: DEFAULT_INDENT,
        }
    }
}

impl ParserConfig {
    /// Parse a configuration from YAML text.
    ///
    /// # Errors
    /// Returns `Yaml` for malformed input and `InvalidConfig` for invalid
    /// property names.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`ParserConfig::from_yaml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Add a placeholder property, validating its name.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the name is not a valid property name.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        validate_property_name(name)?;
        self.properties.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.properties
            .keys()
            .try_for_each(|name| validate_property_name(name))
    }
}

/// Validate a placeholder property name.
///
/// # Examples
/// ```
/// use descriptor_mapper::config::validate_property_name;
///
/// assert!(validate_property_name("db.host").is_ok());
/// assert!(validate_property_name("1st").is_err());
/// ```
pub fn validate_property_name(name: &str) -> Result<()> {
    if PROPERTY_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(DescriptorError::InvalidConfig(format!(
            "invalid property name '{name}'"
        )))
    }
}

/// Parse a `KEY=VALUE` command-line property.
///
/// # Errors
/// Returns `InvalidConfig` if there is no `=` or the key is invalid.
pub fn parse_property_assignment(assignment: &str) -> Result<(String, String)> {
    let (name, value) = assignment.split_once('=').ok_or_else(|| {
        DescriptorError::InvalidConfig(format!("expected KEY=VALUE, got '{assignment}'"))
    })?;
    validate_property_name(name)?;
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.structural_errors, StructuralErrorPolicy::Fail);
        assert!(config.properties.is_empty());
        assert_eq!(config.indent, DEFAULT_INDENT);
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = "structural-errors: drop-subtree\nindent: 4\nproperties:\n  db.host: localhost\n";
        let config = ParserConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.structural_errors, StructuralErrorPolicy::DropSubtree);
        assert_eq!(config.indent, 4);
        assert_eq!(config.properties.get("db.host").unwrap(), "localhost");
    }

    #[test]
    fn test_config_rejects_bad_property_name() {
        let yaml = "properties:\n  \"bad name\": x\n";
        let err = ParserConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_rejects_unknown_policy() {
        let err = ParserConfig::from_yaml_str("structural-errors: ignore\n").unwrap_err();
        assert!(matches!(err, DescriptorError::Yaml(_)));
    }

    #[test]
    fn test_config_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "properties:\n  user: admin").unwrap();
        let config = ParserConfig::load(file.path()).unwrap();
        assert_eq!(config.properties.get("user").unwrap(), "admin");
    }

    #[test]
    fn test_parse_property_assignment() {
        assert_eq!(
            parse_property_assignment("host=mail.example.com").unwrap(),
            ("host".to_string(), "mail.example.com".to_string())
        );
        assert_eq!(
            parse_property_assignment("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_property_assignment("novalue").is_err());
        assert!(parse_property_assignment("=x").is_err());
    }
}
