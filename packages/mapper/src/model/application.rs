//! The standard application descriptor.

use std::sync::LazyLock;

use serde::Serialize;

use super::environment::{
    EjbReference, EnvironmentProperty, JndiEnvironment, MessageDestinationReference,
    ResourceEnvReference, ResourceReference,
};
use super::resources::ResourceDefinition;
use crate::descriptor::{Descriptor, DescriptorInfo, OperationSet, Operations};
use crate::error::InvocationError;

/// Archive kind of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Web,
    Ejb,
    Java,
    Connector,
}

/// A `module` of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Module {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_type: Option<ModuleType>,
    pub uri: String,
    /// Web modules only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_dd: Option<String>,
}

impl Module {
    /// Create a module of `module_type` at `uri`.
    #[must_use]
    pub fn new(module_type: ModuleType, uri: impl Into<String>) -> Self {
        Self {
            module_type: Some(module_type),
            uri: uri.into(),
            ..Self::default()
        }
    }

    fn set_archive(&mut self, module_type: ModuleType, uri: String) -> Result<(), InvocationError> {
        match self.module_type {
            Some(existing) if existing != module_type => {
                Err(InvocationError::IllegalArgument(format!(
                    "module already declared as {existing:?}, cannot also be {module_type:?}"
                )))
            }
            _ => {
                self.module_type = Some(module_type);
                self.uri = uri;
                Ok(())
            }
        }
    }
}

static MODULE_OPERATIONS: LazyLock<Operations<Module>> = LazyLock::new(|| {
    Operations::<Module>::new()
        .string("set_web_uri", |d, v| d.set_archive(ModuleType::Web, v))
        .string("set_ejb_uri", |d, v| d.set_archive(ModuleType::Ejb, v))
        .string("set_java_uri", |d, v| d.set_archive(ModuleType::Java, v))
        .string("set_connector_uri", |d, v| {
            d.set_archive(ModuleType::Connector, v)
        })
        .string("set_context_root", |d, v| {
            d.context_root = Some(v);
            Ok(())
        })
        .string("set_alt_dd", |d, v| {
            d.alt_dd = Some(v);
            Ok(())
        })
});

impl Descriptor for Module {
    fn operations(&self) -> &'static dyn OperationSet {
        &*MODULE_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// A `security-role` declared by the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityRole {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub role_name: String,
}

static SECURITY_ROLE_OPERATIONS: LazyLock<Operations<SecurityRole>> = LazyLock::new(|| {
    Operations::<SecurityRole>::new().string("set_role_name", |d, v| {
        d.role_name = v;
        Ok(())
    })
});

impl Descriptor for SecurityRole {
    fn operations(&self) -> &'static dyn OperationSet {
        &*SECURITY_ROLE_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// The root of a standard application descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Application {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialize_in_order: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<Module>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_roles: Vec<SecurityRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_directory: Option<String>,
    #[serde(flatten)]
    pub environment: JndiEnvironment,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceDefinition>,
}

static APPLICATION_OPERATIONS: LazyLock<Operations<Application>> = LazyLock::new(|| {
    Operations::<Application>::new()
        .string("set_version", |d, v| {
            d.version = Some(v);
            Ok(())
        })
        .string("set_schema_location", |d, v| {
            d.schema_location = Some(v);
            Ok(())
        })
        .string("set_display_name", |d, v| {
            d.display_name = Some(v);
            Ok(())
        })
        .string("set_application_name", |d, v| {
            d.application_name = Some(v);
            Ok(())
        })
        .bool("set_initialize_in_order", |d, v| {
            d.initialize_in_order = Some(v);
            Ok(())
        })
        .string("set_library_directory", |d, v| {
            d.library_directory = Some(v);
            Ok(())
        })
        .adder::<Module>("add_module", |d, m| {
            d.modules.push(m);
            Ok(())
        })
        .adder::<SecurityRole>("add_security_role", |d, r| {
            if d.security_roles.iter().any(|known| known.role_name == r.role_name) {
                return Err(InvocationError::IllegalArgument(format!(
                    "security role '{}' declared twice",
                    r.role_name
                )));
            }
            d.security_roles.push(r);
            Ok(())
        })
        .adder::<EnvironmentProperty>("add_env_entry", |d, e| {
            d.environment.env_entries.push(e);
            Ok(())
        })
        .adder::<EjbReference>("add_ejb_reference", |d, r| {
            d.environment.ejb_references.push(r);
            Ok(())
        })
        .adder::<ResourceReference>("add_resource_reference", |d, r| {
            d.environment.resource_references.push(r);
            Ok(())
        })
        .adder::<ResourceEnvReference>("add_resource_env_reference", |d, r| {
            d.environment.resource_env_references.push(r);
            Ok(())
        })
        .adder::<MessageDestinationReference>("add_message_destination_reference", |d, r| {
            d.environment.message_destination_references.push(r);
            Ok(())
        })
        .adder_matching(
            "add_resource_descriptor",
            ResourceDefinition::accepts,
            |d, resource| match ResourceDefinition::from_descriptor(resource) {
                Some(resource) => {
                    d.resources.push(resource);
                    Ok(())
                }
                None => Err(InvocationError::Failed(
                    "not a resource definition".to_string(),
                )),
            },
        )
});

impl Descriptor for Application {
    fn operations(&self) -> &'static dyn OperationSet {
        &*APPLICATION_OPERATIONS
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
    use crate::descriptor::{resolve_and_invoke, resolve_and_invoke_add};
    use crate::model::{MailSession, ResourceProperty};

    #[test]
    fn test_module_type_is_exclusive() {
        let mut module = Module::default();
        resolve_and_invoke(&mut module, "set_web_uri", "shop.war").unwrap();
        let err = resolve_and_invoke(&mut module, "set_ejb_uri", "shop.jar").unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(module, Module::new(ModuleType::Web, "shop.war"));
    }

    #[test]
    fn test_resource_adder_accepts_any_definition() {
        let mut app = Application::default();
        resolve_and_invoke_add(&mut app, "add_resource_descriptor", Box::new(MailSession::default()))
            .unwrap();
        assert_eq!(app.resources.len(), 1);

        let err = resolve_and_invoke_add(
            &mut app,
            "add_resource_descriptor",
            Box::new(ResourceProperty::new("a", "b")),
        )
        .unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_duplicate_security_role_rejected() {
        let mut app = Application::default();
        let role = || SecurityRole {
            role_name: "admin".to_string(),
            ..SecurityRole::default()
        };
        resolve_and_invoke_add(&mut app, "add_security_role", Box::new(role())).unwrap();
        let err = resolve_and_invoke_add(&mut app, "add_security_role", Box::new(role())).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(app.security_roles.len(), 1);
    }
}
