//! The server-specific runtime descriptor of an application.

use std::sync::LazyLock;

use serde::Serialize;

use super::common::ResourceProperty;
use crate::descriptor::{Descriptor, DescriptorInfo, JndiName, OperationSet, Operations};
use crate::error::InvocationError;
use crate::tags;

/// Maps a role to the principals and groups of the server realm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityRoleMapping {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub role_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub principal_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_names: Vec<String>,
}

static SECURITY_ROLE_MAPPING_OPERATIONS: LazyLock<Operations<SecurityRoleMapping>> =
    LazyLock::new(|| {
        Operations::<SecurityRoleMapping>::new()
            .string("set_role_name", |d, v| {
                d.role_name = v;
                Ok(())
            })
            .string("add_principal_name", |d, v| {
                d.principal_names.push(v);
                Ok(())
            })
            .string("add_group_name", |d, v| {
                d.group_names.push(v);
                Ok(())
            })
    });

impl Descriptor for SecurityRoleMapping {
    fn operations(&self) -> &'static dyn OperationSet {
        &*SECURITY_ROLE_MAPPING_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// Which standard reference a runtime binding resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeReferenceKind {
    #[default]
    Ejb,
    Resource,
    ResourceEnv,
}

impl RuntimeReferenceKind {
    /// Kind bound by the element `tag`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            tags::EJB_REF => Some(Self::Ejb),
            tags::RESOURCE_REF => Some(Self::Resource),
            tags::RESOURCE_ENV_REF => Some(Self::ResourceEnv),
            _ => None,
        }
    }

    /// Element holding a binding of this kind.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ejb => tags::EJB_REF,
            Self::Resource => tags::RESOURCE_REF,
            Self::ResourceEnv => tags::RESOURCE_ENV_REF,
        }
    }

    /// Element holding the reference name.
    #[must_use]
    pub fn name_tag(&self) -> &'static str {
        match self {
            Self::Ejb => tags::EJB_REF_NAME,
            Self::Resource => tags::RES_REF_NAME,
            Self::ResourceEnv => tags::RESOURCE_ENV_REF_NAME,
        }
    }
}

/// Binding of a standard reference to a global JNDI name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeReference {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub kind: RuntimeReferenceKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jndi_name: Option<JndiName>,
}

impl RuntimeReference {
    /// Create an unbound reference of `kind`.
    #[must_use]
    pub fn new(kind: RuntimeReferenceKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

static RUNTIME_REFERENCE_OPERATIONS: LazyLock<Operations<RuntimeReference>> =
    LazyLock::new(|| {
        Operations::<RuntimeReference>::new()
            .string("set_name", |d, v| {
                d.name = v;
                Ok(())
            })
            .jndi_name("set_jndi_name", |d, v| {
                d.jndi_name = Some(v);
                Ok(())
            })
    });

impl Descriptor for RuntimeReference {
    fn operations(&self) -> &'static dyn OperationSet {
        &*RUNTIME_REFERENCE_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// A descriptor parsed by an extension handler, with the tag it came from.
#[derive(Debug)]
pub struct ExtensionDescriptor {
    pub tag: String,
    pub descriptor: Box<dyn Descriptor>,
}

/// The root of a runtime application descriptor.
#[derive(Debug, Default, Serialize)]
pub struct ApplicationRuntime {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_role_mappings: Vec<SecurityRoleMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<RuntimeReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_identifier: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ResourceProperty>,
    /// Descriptors of tags handled by extensions, in document order.
    #[serde(skip)]
    pub extensions: Vec<ExtensionDescriptor>,
}

impl ApplicationRuntime {
    /// References of `kind`, in document order.
    pub fn references_of(
        &self,
        kind: RuntimeReferenceKind,
    ) -> impl Iterator<Item = &RuntimeReference> {
        self.references.iter().filter(move |r| r.kind == kind)
    }

    /// Extension descriptors parsed from `tag`.
    pub fn extensions_named<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a (dyn Descriptor + 'static)> {
        self.extensions
            .iter()
            .filter(move |extension| extension.tag == tag)
            .map(|extension| extension.descriptor.as_ref())
    }
}

static APPLICATION_RUNTIME_OPERATIONS: LazyLock<Operations<ApplicationRuntime>> =
    LazyLock::new(|| {
        Operations::<ApplicationRuntime>::new()
            .long("set_unique_id", |d, v| {
                d.unique_id = Some(v);
                Ok(())
            })
            .string("set_realm", |d, v| {
                d.realm = Some(v);
                Ok(())
            })
            .string("set_archive_name", |d, v| {
                d.archive_name = Some(v);
                Ok(())
            })
            .bool("set_keep_state", |d, v| {
                d.keep_state = Some(v);
                Ok(())
            })
            .string("set_version_identifier", |d, v| {
                d.version_identifier = Some(v);
                Ok(())
            })
            .adder::<SecurityRoleMapping>("add_security_role_mapping", |d, m| {
                d.security_role_mappings.push(m);
                Ok(())
            })
            .adder::<RuntimeReference>("add_reference", |d, r| {
                if r.name.is_empty() {
                    return Err(InvocationError::IllegalArgument(format!(
                        "<{}> without <{}>",
                        r.kind.tag(),
                        r.kind.name_tag()
                    )));
                }
                d.references.push(r);
                Ok(())
            })
            .adder::<ResourceProperty>("add_property", |d, p| {
                d.properties.push(p);
                Ok(())
            })
    });

impl Descriptor for ApplicationRuntime {
    fn operations(&self) -> &'static dyn OperationSet {
        &*APPLICATION_RUNTIME_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{resolve_and_invoke, resolve_and_invoke_add, ValueKind};

    #[test]
    fn test_unique_id_is_long() {
        let mut runtime = ApplicationRuntime::default();
        assert_eq!(
            resolve_and_invoke(&mut runtime, "set_unique_id", "86321568459423744"),
            Ok(ValueKind::Long)
        );
        assert_eq!(runtime.unique_id, Some(86_321_568_459_423_744));
    }

    #[test]
    fn test_reference_without_name_rejected() {
        let mut runtime = ApplicationRuntime::default();
        let reference = RuntimeReference::new(RuntimeReferenceKind::Resource);
        let err = resolve_and_invoke_add(&mut runtime, "add_reference", Box::new(reference))
            .unwrap_err();
        assert!(err.to_string().contains("res-ref-name"));
        assert!(runtime.references.is_empty());
    }

    #[test]
    fn test_references_of_kind() {
        let mut runtime = ApplicationRuntime::default();
        for (kind, name) in [
            (RuntimeReferenceKind::Ejb, "ejb/Cart"),
            (RuntimeReferenceKind::Resource, "jdbc/Orders"),
            (RuntimeReferenceKind::Ejb, "ejb/Stock"),
        ] {
            let mut reference = RuntimeReference::new(kind);
            reference.name = name.to_string();
            runtime.references.push(reference);
        }
        let ejb: Vec<_> = runtime
            .references_of(RuntimeReferenceKind::Ejb)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(ejb, vec!["ejb/Cart", "ejb/Stock"]);
        assert_eq!(
            RuntimeReferenceKind::from_tag("resource-env-ref"),
            Some(RuntimeReferenceKind::ResourceEnv)
        );
    }
}
