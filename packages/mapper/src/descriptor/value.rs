//! Scalar values handed to descriptor setters and their coercion rules.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Target types a raw value may be coerced to, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    JndiName,
    Int,
    Long,
    Bool,
}

impl ValueKind {
    /// All kinds in the order the resolver tries them.
    pub const CANDIDATES: [ValueKind; 5] = [
        ValueKind::String,
        ValueKind::JndiName,
        ValueKind::Int,
        ValueKind::Long,
        ValueKind::Bool,
    ];

    /// Short name for diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::JndiName => "JNDI name",
            Self::Int => "int",
            Self::Long => "long",
            Self::Bool => "boolean",
        }
    }

    /// Coerce a raw value to this kind.
    ///
    /// # Errors
    /// Returns a `CoercionError` describing why the value does not fit.
    ///
    /// # Examples
    /// ```
    /// use descriptor_mapper::descriptor::{ScalarValue, ValueKind};
    ///
    /// assert_eq!(ValueKind::Int.coerce("42").unwrap(), ScalarValue::Int(42));
    /// assert!(ValueKind::Int.coerce("forty-two").is_err());
    /// assert_eq!(ValueKind::Bool.coerce("TRUE").unwrap(), ScalarValue::Bool(true));
    /// ```
    pub fn coerce(self, raw: &str) -> Result<ScalarValue, CoercionError> {
        let fail = |reason: &dyn fmt::Display| CoercionError::new(self, raw, reason.to_string());
        match self {
            Self::String => Ok(ScalarValue::String(raw.to_string())),
            Self::JndiName => JndiName::new(raw).map(ScalarValue::JndiName),
            Self::Int => raw.parse().map(ScalarValue::Int).map_err(|e| fail(&e)),
            Self::Long => raw.parse().map(ScalarValue::Long).map_err(|e| fail(&e)),
            Self::Bool => {
                if raw.eq_ignore_ascii_case("true") {
                    Ok(ScalarValue::Bool(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Ok(ScalarValue::Bool(false))
                } else {
                    Err(fail(&"expected true or false"))
                }
            }
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw value after coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    String(String),
    JndiName(JndiName),
    Int(i32),
    Long(i64),
    Bool(bool),
}

impl ScalarValue {
    /// Kind this value was coerced to.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::JndiName(_) => ValueKind::JndiName,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Bool(_) => ValueKind::Bool,
        }
    }
}

/// A raw value that does not fit a candidate kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a {kind} ({reason})")]
pub struct CoercionError {
    pub kind: ValueKind,
    pub value: String,
    pub reason: String,
}

impl CoercionError {
    /// Create a coercion failure.
    #[must_use]
    pub fn new(kind: ValueKind, value: &str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Name under which a resource is bound in the naming service.
///
/// # Examples
/// ```
/// use descriptor_mapper::descriptor::JndiName;
///
/// let name = JndiName::new("java:app/jdbc/orders").unwrap();
/// assert!(name.has_java_prefix());
/// assert_eq!(name.to_string(), "java:app/jdbc/orders");
/// assert!(JndiName::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JndiName(String);

impl JndiName {
    /// Scheme shared by all portable names.
    pub const JAVA_PREFIX: &'static str = "java:";

    /// Validate and wrap a name.
    ///
    /// # Errors
    /// Returns a `CoercionError` for blank names.
    pub fn new(name: &str) -> Result<Self, CoercionError> {
        if name.trim().is_empty() {
            return Err(CoercionError::new(ValueKind::JndiName, name, "blank name"));
        }
        Ok(Self(name.to_string()))
    }

    /// The name as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check for the portable `java:` scheme.
    #[must_use]
    pub fn has_java_prefix(&self) -> bool {
        self.0.starts_with(Self::JAVA_PREFIX)
    }

    /// Check for a name in the component-private `java:comp/` context.
    #[must_use]
    pub fn is_component_scoped(&self) -> bool {
        self.0.starts_with("java:comp/")
    }
}

impl fmt::Display for JndiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order() {
        assert_eq!(
            ValueKind::CANDIDATES,
            [
                ValueKind::String,
                ValueKind::JndiName,
                ValueKind::Int,
                ValueKind::Long,
                ValueKind::Bool
            ]
        );
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(ValueKind::Long.coerce("9000000000").unwrap(), ScalarValue::Long(9_000_000_000));
        let err = ValueKind::Int.coerce("9000000000").unwrap_err();
        assert_eq!(err.kind, ValueKind::Int);
        assert_eq!(err.value, "9000000000");
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(ValueKind::Bool.coerce("false").unwrap(), ScalarValue::Bool(false));
        assert!(ValueKind::Bool.coerce("yes").is_err());
    }

    #[test]
    fn test_jndi_name() {
        let name = JndiName::new("java:comp/env/mail").unwrap();
        assert!(name.is_component_scoped());
        assert!(!JndiName::new("jdbc/orders").unwrap().has_java_prefix());
        assert_eq!(
            ValueKind::JndiName.coerce("jdbc/x").unwrap().kind(),
            ValueKind::JndiName
        );
    }
}
