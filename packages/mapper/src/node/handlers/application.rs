//! Nodes of the standard application descriptor.

use std::sync::LazyLock;

use super::environment::{
    EjbReferenceNode, EnvEntryNode, MessageDestinationRefNode, ResourceEnvRefNode,
    ResourceRefNode,
};
use super::resources::{
    AdministeredObjectNode, ConnectionFactoryNode, DataSourceNode, JmsConnectionFactoryNode,
    JmsDestinationNode, MailSessionNode,
};
use crate::config::{JAKARTAEE_NAMESPACE, XSI_NAMESPACE};
use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::model::{Application, Module, ModuleType, SecurityRole};
use crate::node::handler::{descriptor_as, NodeCore, XmlNode};
use crate::node::types::{DispatchTable, NodeKind};
use crate::node::writer::{
    add_namespace_declaration, append_bool_child, append_child, append_text_child,
    force_append_text_child, set_attribute, set_attribute_ns, write_jndi_environment_refs,
    write_localized_descriptions, write_resource_descriptors, WriteContext,
};
use crate::tags;
use crate::xml::NodeId;

static APPLICATION_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::VERSION, "set_version")
        .map(tags::SCHEMA_LOCATION, "set_schema_location")
        .map(tags::DISPLAY_NAME, "set_display_name")
        .map(tags::APPLICATION_NAME, "set_application_name")
        .map(tags::INITIALIZE_IN_ORDER, "set_initialize_in_order")
        .map(tags::LIBRARY_DIRECTORY, "set_library_directory")
});

/// Root node of `application` documents.
#[derive(Debug)]
pub struct ApplicationNode {
    core: NodeCore,
}

impl ApplicationNode {
    pub const KIND: NodeKind = NodeKind::new("ApplicationNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        let mut core = NodeCore::with_tag(tags::APPLICATION);
        core.register_handler_with(tags::MODULE, ModuleNode::KIND, "add_module");
        core.register_handler_with(tags::SECURITY_ROLE, SecurityRoleNode::KIND, "add_security_role");
        core.register_handler_with(tags::ENV_ENTRY, EnvEntryNode::KIND, "add_env_entry");
        core.register_handler_with(tags::EJB_REF, EjbReferenceNode::KIND, "add_ejb_reference");
        core.register_handler_with(
            tags::EJB_LOCAL_REF,
            EjbReferenceNode::KIND,
            "add_ejb_reference",
        );
        core.register_handler_with(
            tags::RESOURCE_REF,
            ResourceRefNode::KIND,
            "add_resource_reference",
        );
        core.register_handler_with(
            tags::RESOURCE_ENV_REF,
            ResourceEnvRefNode::KIND,
            "add_resource_env_reference",
        );
        core.register_handler_with(
            tags::MESSAGE_DESTINATION_REF,
            MessageDestinationRefNode::KIND,
            "add_message_destination_reference",
        );

        let resources = [
            (tags::DATA_SOURCE, DataSourceNode::KIND),
            (tags::MAIL_SESSION, MailSessionNode::KIND),
            (tags::CONNECTION_FACTORY, ConnectionFactoryNode::KIND),
            (tags::ADMINISTERED_OBJECT, AdministeredObjectNode::KIND),
            (tags::JMS_CONNECTION_FACTORY, JmsConnectionFactoryNode::KIND),
            (tags::JMS_DESTINATION, JmsDestinationNode::KIND),
        ];
        for (tag, kind) in resources {
            core.register_handler_with(tag, kind, "add_resource_descriptor");
        }
        Self { core }
    }
}

impl Default for ApplicationNode {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlNode for ApplicationNode {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        Some(Box::new(Application::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &APPLICATION_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let application = descriptor_as::<Application>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);

        add_namespace_declaration(tree, element, &application.info);
        // Children are written unprefixed, so the default namespace is always bound.
        if !application.info.prefix_mapping().any(|(prefix, _)| prefix.is_empty()) {
            set_attribute_ns(tree, element, "", JAKARTAEE_NAMESPACE);
        }
        if application.schema_location.is_some()
            && !application.info.prefix_mapping().any(|(prefix, _)| prefix == "xsi")
        {
            set_attribute_ns(tree, element, "xsi", XSI_NAMESPACE);
        }
        set_attribute(tree, element, tags::VERSION, application.version.as_deref());
        set_attribute(
            tree,
            element,
            tags::SCHEMA_LOCATION,
            application.schema_location.as_deref(),
        );

        write_localized_descriptions(tree, element, &application.info);
        append_text_child(tree, element, tags::DISPLAY_NAME, application.display_name.as_deref());
        append_text_child(
            tree,
            element,
            tags::APPLICATION_NAME,
            application.application_name.as_deref(),
        );
        append_bool_child(
            tree,
            element,
            tags::INITIALIZE_IN_ORDER,
            application.initialize_in_order,
        );

        let module_node = ModuleNode::new();
        for module in &application.modules {
            module_node.write_descriptor(out, element, tags::MODULE, module)?;
        }
        let role_node = SecurityRoleNode::new();
        for role in &application.security_roles {
            role_node.write_descriptor(out, element, tags::SECURITY_ROLE, role)?;
        }
        append_text_child(
            &mut out.tree,
            element,
            tags::LIBRARY_DIRECTORY,
            application.library_directory.as_deref(),
        );

        write_jndi_environment_refs(out, element, &application.environment)?;
        write_resource_descriptors(
            out,
            element,
            application.resources.iter().map(|r| r.as_descriptor()),
        )?;
        Ok(element)
    }
}

static MODULE_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::WEB_URI, "set_web_uri")
        .map(tags::CONTEXT_ROOT, "set_context_root")
        .map(tags::EJB, "set_ejb_uri")
        .map(tags::JAVA, "set_java_uri")
        .map(tags::CONNECTOR, "set_connector_uri")
        .map(tags::ALT_DD, "set_alt_dd")
});

/// Handles `module`. The `web` wrapper carries no value of its own; its
/// leaves arrive at this node.
#[derive(Debug, Default)]
pub struct ModuleNode {
    core: NodeCore,
}

impl ModuleNode {
    pub const KIND: NodeKind = NodeKind::new("ModuleNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for ModuleNode {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        Some(Box::new(Module::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &MODULE_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let module = descriptor_as::<Module>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        match module.module_type {
            Some(ModuleType::Web) => {
                let web = append_child(tree, element, tags::WEB);
                force_append_text_child(tree, web, tags::WEB_URI, &module.uri);
                append_text_child(tree, web, tags::CONTEXT_ROOT, module.context_root.as_deref());
            }
            Some(ModuleType::Ejb) => {
                force_append_text_child(tree, element, tags::EJB, &module.uri);
            }
            Some(ModuleType::Java) => {
                force_append_text_child(tree, element, tags::JAVA, &module.uri);
            }
            Some(ModuleType::Connector) => {
                force_append_text_child(tree, element, tags::CONNECTOR, &module.uri);
            }
            None => tracing::warn!(uri = %module.uri, "Module without archive type written empty"),
        }
        append_text_child(tree, element, tags::ALT_DD, module.alt_dd.as_deref());
        Ok(element)
    }
}

/// Handles `security-role`.
#[derive(Debug, Default)]
pub struct SecurityRoleNode {
    core: NodeCore,
}

static SECURITY_ROLE_DISPATCH: LazyLock<DispatchTable> =
    LazyLock::new(|| DispatchTable::new().map(tags::ROLE_NAME, "set_role_name"));

impl SecurityRoleNode {
    pub const KIND: NodeKind = NodeKind::new("SecurityRoleNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for SecurityRoleNode {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        Some(Box::new(SecurityRole::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &SECURITY_ROLE_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let role = descriptor_as::<SecurityRole>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &role.info);
        force_append_text_child(tree, element, tags::ROLE_NAME, &role.role_name);
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlTree;

    fn write(application: &Application) -> (XmlTree, NodeId) {
        let mut out = WriteContext::new();
        let document = out.tree.document();
        let element = ApplicationNode::new()
            .write_descriptor(&mut out, document, tags::APPLICATION, application)
            .unwrap();
        (out.into_tree(), element)
    }

    #[test]
    fn test_default_namespace_without_recorded_mappings() {
        let application = Application {
            version: Some("10".to_string()),
            ..Application::default()
        };
        let (tree, element) = write(&application);
        assert_eq!(tree.attribute(element, "xmlns"), Some(JAKARTAEE_NAMESPACE));
        assert_eq!(tree.attribute(element, "xmlns:xsi"), None);
        assert_eq!(tree.attribute(element, tags::VERSION), Some("10"));
    }

    #[test]
    fn test_prefixed_mapping_keeps_default_namespace() {
        let mut application = Application::default();
        application
            .info
            .add_prefix_mapping("j", JAKARTAEE_NAMESPACE);
        let (tree, element) = write(&application);
        assert_eq!(tree.attribute(element, "xmlns:j"), Some(JAKARTAEE_NAMESPACE));
        assert_eq!(tree.attribute(element, "xmlns"), Some(JAKARTAEE_NAMESPACE));
    }

    #[test]
    fn test_schema_location_declares_xsi() {
        let application = Application {
            schema_location: Some("urn:app app.xsd".to_string()),
            ..Application::default()
        };
        let (tree, element) = write(&application);
        assert_eq!(tree.attribute(element, "xmlns:xsi"), Some(XSI_NAMESPACE));
        assert_eq!(
            tree.attribute(element, tags::SCHEMA_LOCATION),
            Some("urn:app app.xsd")
        );
    }

    #[test]
    fn test_modules_written_by_type() {
        let mut web = Module::new(ModuleType::Web, "shop.war");
        web.context_root = Some("/shop".to_string());
        let application = Application {
            modules: vec![web, Module::new(ModuleType::Ejb, "orders.jar")],
            ..Application::default()
        };
        let (tree, element) = write(&application);

        let modules = tree.child_elements(element, tags::MODULE);
        assert_eq!(modules.len(), 2);
        let web = tree.child_elements(modules[0], tags::WEB)[0];
        assert_eq!(tree.text(tree.child_elements(web, tags::WEB_URI)[0]), "shop.war");
        assert_eq!(tree.text(tree.child_elements(web, tags::CONTEXT_ROOT)[0]), "/shop");
        assert_eq!(tree.text(tree.child_elements(modules[1], tags::EJB)[0]), "orders.jar");
    }

    #[test]
    fn test_application_registers_every_resource_kind() {
        let node = ApplicationNode::new();
        for tag in [
            tags::DATA_SOURCE,
            tags::MAIL_SESSION,
            tags::CONNECTION_FACTORY,
            tags::ADMINISTERED_OBJECT,
            tags::JMS_CONNECTION_FACTORY,
            tags::JMS_DESTINATION,
        ] {
            assert_eq!(node.core().add_method(tag), Some("add_resource_descriptor"));
        }
        assert_eq!(node.root_tag().qname(), tags::APPLICATION);
    }
}
