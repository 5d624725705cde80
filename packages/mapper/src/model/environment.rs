//! JNDI environment entries and references.

use std::sync::LazyLock;

use serde::Serialize;

use crate::descriptor::{Descriptor, DescriptorInfo, JndiName, OperationSet, Operations};
use crate::error::InvocationError;

/// An `env-entry`: a named value in the component environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentProperty {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    /// `None` when the element is absent or empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_name: Option<JndiName>,
}

static ENVIRONMENT_PROPERTY_OPERATIONS: LazyLock<Operations<EnvironmentProperty>> =
    LazyLock::new(|| {
        Operations::<EnvironmentProperty>::new()
            .string("set_name", |d, v| {
                d.name = v;
                Ok(())
            })
            .string("set_type", |d, v| {
                d.entry_type = Some(v);
                Ok(())
            })
            .string("set_value", |d, v| {
                d.value = (!v.is_empty()).then_some(v);
                Ok(())
            })
            .string("set_mapped_name", |d, v| {
                d.mapped_name = Some(v);
                Ok(())
            })
            .jndi_name("set_lookup_name", |d, v| {
                d.lookup_name = Some(v);
                Ok(())
            })
    });

impl Descriptor for EnvironmentProperty {
    fn operations(&self) -> &'static dyn OperationSet {
        &*ENVIRONMENT_PROPERTY_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// Bean kinds an EJB reference may name.
pub const EJB_REF_TYPES: [&str; 2] = ["Session", "Entity"];

/// An `ejb-ref` or `ejb-local-ref`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EjbReference {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    /// Whether the reference targets local interfaces.
    pub local: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ejb_ref_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ejb_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_name: Option<JndiName>,
}

impl EjbReference {
    /// Create a named reference.
    #[must_use]
    pub fn new(name: impl Into<String>, local: bool) -> Self {
        Self {
            name: name.into(),
            local,
            ..Self::default()
        }
    }
}

static EJB_REFERENCE_OPERATIONS: LazyLock<Operations<EjbReference>> = LazyLock::new(|| {
    Operations::<EjbReference>::new()
        .string("set_name", |d, v| {
            d.name = v;
            Ok(())
        })
        .string("set_ejb_ref_type", |d, v| {
            if !EJB_REF_TYPES.contains(&v.as_str()) {
                return Err(InvocationError::IllegalArgument(format!(
                    "ejb-ref-type must be one of {EJB_REF_TYPES:?}, got '{v}'"
                )));
            }
            d.ejb_ref_type = Some(v);
            Ok(())
        })
        .string("set_home", |d, v| {
            d.home = Some(v);
            Ok(())
        })
        .string("set_remote", |d, v| {
            d.remote = Some(v);
            Ok(())
        })
        .string("set_local_home", |d, v| {
            d.local_home = Some(v);
            Ok(())
        })
        .string("set_local", |d, v| {
            d.local_interface = Some(v);
            Ok(())
        })
        .string("set_ejb_link", |d, v| {
            d.ejb_link = Some(v);
            Ok(())
        })
        .string("set_mapped_name", |d, v| {
            d.mapped_name = Some(v);
            Ok(())
        })
        .jndi_name("set_lookup_name", |d, v| {
            d.lookup_name = Some(v);
            Ok(())
        })
});

impl Descriptor for EjbReference {
    fn operations(&self) -> &'static dyn OperationSet {
        &*EJB_REFERENCE_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// Who signs on to a referenced resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResAuth {
    Container,
    Application,
}

impl ResAuth {
    /// Parse the element text.
    ///
    /// # Errors
    /// Returns `IllegalArgument` for anything but `Container` or
    /// `Application`.
    pub fn parse(value: &str) -> Result<Self, InvocationError> {
        match value {
            "Container" => Ok(Self::Container),
            "Application" => Ok(Self::Application),
            other => Err(InvocationError::IllegalArgument(format!(
                "res-auth must be Container or Application, got '{other}'"
            ))),
        }
    }

    /// Element text.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::Application => "Application",
        }
    }
}

/// Whether connections to a resource may be shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SharingScope {
    Shareable,
    Unshareable,
}

impl SharingScope {
    /// Parse the element text.
    ///
    /// # Errors
    /// Returns `IllegalArgument` for an unknown scope.
    pub fn parse(value: &str) -> Result<Self, InvocationError> {
        match value {
            "Shareable" => Ok(Self::Shareable),
            "Unshareable" => Ok(Self::Unshareable),
            other => Err(InvocationError::IllegalArgument(format!(
                "res-sharing-scope must be Shareable or Unshareable, got '{other}'"
            ))),
        }
    }

    /// Element text.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shareable => "Shareable",
            Self::Unshareable => "Unshareable",
        }
    }
}

/// A `resource-ref`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceReference {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<ResAuth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharing_scope: Option<SharingScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_name: Option<JndiName>,
}

static RESOURCE_REFERENCE_OPERATIONS: LazyLock<Operations<ResourceReference>> =
    LazyLock::new(|| {
        Operations::<ResourceReference>::new()
            .string("set_name", |d, v| {
                d.name = v;
                Ok(())
            })
            .string("set_type", |d, v| {
                d.res_type = Some(v);
                Ok(())
            })
            .string("set_auth", |d, v| {
                d.auth = Some(ResAuth::parse(&v)?);
                Ok(())
            })
            .string("set_sharing_scope", |d, v| {
                d.sharing_scope = Some(SharingScope::parse(&v)?);
                Ok(())
            })
            .string("set_mapped_name", |d, v| {
                d.mapped_name = Some(v);
                Ok(())
            })
            .jndi_name("set_lookup_name", |d, v| {
                d.lookup_name = Some(v);
                Ok(())
            })
    });

impl Descriptor for ResourceReference {
    fn operations(&self) -> &'static dyn OperationSet {
        &*RESOURCE_REFERENCE_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// A `resource-env-ref`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceEnvReference {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_name: Option<JndiName>,
}

static RESOURCE_ENV_REFERENCE_OPERATIONS: LazyLock<Operations<ResourceEnvReference>> =
    LazyLock::new(|| {
        Operations::<ResourceEnvReference>::new()
            .string("set_name", |d, v| {
                d.name = v;
                Ok(())
            })
            .string("set_type", |d, v| {
                d.res_type = Some(v);
                Ok(())
            })
            .string("set_mapped_name", |d, v| {
                d.mapped_name = Some(v);
                Ok(())
            })
            .jndi_name("set_lookup_name", |d, v| {
                d.lookup_name = Some(v);
                Ok(())
            })
    });

impl Descriptor for ResourceEnvReference {
    fn operations(&self) -> &'static dyn OperationSet {
        &*RESOURCE_ENV_REFERENCE_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// Direction of message flow through a referenced destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageDestinationUsage {
    Consumes,
    Produces,
    ConsumesProduces,
}

impl MessageDestinationUsage {
    /// Parse the element text.
    ///
    /// # Errors
    /// Returns `IllegalArgument` for an unknown usage.
    pub fn parse(value: &str) -> Result<Self, InvocationError> {
        match value {
            "Consumes" => Ok(Self::Consumes),
            "Produces" => Ok(Self::Produces),
            "ConsumesProduces" => Ok(Self::ConsumesProduces),
            other => Err(InvocationError::IllegalArgument(format!(
                "unknown message-destination-usage '{other}'"
            ))),
        }
    }

    /// Element text.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumes => "Consumes",
            Self::Produces => "Produces",
            Self::ConsumesProduces => "ConsumesProduces",
        }
    }
}

/// A `message-destination-ref`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageDestinationReference {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<MessageDestinationUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_name: Option<JndiName>,
}

static MESSAGE_DESTINATION_REFERENCE_OPERATIONS: LazyLock<
    Operations<MessageDestinationReference>,
> = LazyLock::new(|| {
    Operations::<MessageDestinationReference>::new()
        .string("set_name", |d, v| {
            d.name = v;
            Ok(())
        })
        .string("set_destination_type", |d, v| {
            d.destination_type = Some(v);
            Ok(())
        })
        .string("set_usage", |d, v| {
            d.usage = Some(MessageDestinationUsage::parse(&v)?);
            Ok(())
        })
        .string("set_link", |d, v| {
            d.link = Some(v);
            Ok(())
        })
        .string("set_mapped_name", |d, v| {
            d.mapped_name = Some(v);
            Ok(())
        })
        .jndi_name("set_lookup_name", |d, v| {
            d.lookup_name = Some(v);
            Ok(())
        })
});

impl Descriptor for MessageDestinationReference {
    fn operations(&self) -> &'static dyn OperationSet {
        &*MESSAGE_DESTINATION_REFERENCE_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// The JNDI environment group of a component or application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JndiEnvironment {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env_entries: Vec<EnvironmentProperty>,
    /// Remote and local references in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ejb_references: Vec<EjbReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_references: Vec<ResourceReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_env_references: Vec<ResourceEnvReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub message_destination_references: Vec<MessageDestinationReference>,
}

impl JndiEnvironment {
    /// Check whether the group holds no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.env_entries.is_empty()
            && self.ejb_references.is_empty()
            && self.resource_references.is_empty()
            && self.resource_env_references.is_empty()
            && self.message_destination_references.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::resolve_and_invoke;

    #[test]
    fn test_res_auth_rejects_unknown_value() {
        let mut reference = ResourceReference::default();
        let err = resolve_and_invoke(&mut reference, "set_auth", "Bean").unwrap_err();
        assert!(err.is_recoverable());
        assert!(reference.auth.is_none());

        resolve_and_invoke(&mut reference, "set_auth", "Container").unwrap();
        assert_eq!(reference.auth, Some(ResAuth::Container));
    }

    #[test]
    fn test_empty_env_entry_value_is_none() {
        let mut entry = EnvironmentProperty::default();
        resolve_and_invoke(&mut entry, "set_value", "").unwrap();
        assert_eq!(entry.value, None);
        resolve_and_invoke(&mut entry, "set_value", "42").unwrap();
        assert_eq!(entry.value.as_deref(), Some("42"));
    }

    #[test]
    fn test_ejb_ref_type_validated() {
        let mut reference = EjbReference::new("ejb/Cart", false);
        assert!(resolve_and_invoke(&mut reference, "set_ejb_ref_type", "Stateless").is_err());
        resolve_and_invoke(&mut reference, "set_ejb_ref_type", "Session").unwrap();
        assert_eq!(reference.ejb_ref_type.as_deref(), Some("Session"));
    }

    #[test]
    fn test_usage_round_trips_text() {
        for usage in [
            MessageDestinationUsage::Consumes,
            MessageDestinationUsage::Produces,
            MessageDestinationUsage::ConsumesProduces,
        ] {
            assert_eq!(MessageDestinationUsage::parse(usage.as_str()).unwrap(), usage);
        }
    }
}
