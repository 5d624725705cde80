//! Nodes of the runtime application descriptor.
//!
//! The runtime root accepts tags contributed by extension handlers. Its
//! writer replays the sub-tag layout recorded while parsing, so extension
//! content is written back where it was found.

use std::sync::LazyLock;

use super::localized::{LocalizedInfoNode, RuntimePropertyNode};
use crate::config::{RUNTIME_APPLICATION_PUBLIC_ID, RUNTIME_APPLICATION_SYSTEM_ID};
use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::model::{
    ApplicationRuntime, ExtensionDescriptor, LocalizedText, RuntimeReference,
    RuntimeReferenceKind, SecurityRoleMapping,
};
use crate::node::handler::{descriptor_as, NodeCore, XmlNode};
use crate::node::types::{DispatchTable, NodeKind};
use crate::node::writer::{
    add_namespace_declaration, append_bool_child, append_text_child, append_value_child,
    force_append_text_child, write_sub_descriptors, WriteContext,
};
use crate::tags;
use crate::xml::{DocType, NodeId, QualifiedTag};

static APPLICATION_RUNTIME_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::UNIQUE_ID, "set_unique_id")
        .map(tags::REALM, "set_realm")
        .map(tags::ARCHIVE_NAME, "set_archive_name")
        .map(tags::KEEP_STATE, "set_keep_state")
        .map(tags::VERSION_IDENTIFIER, "set_version_identifier")
});

/// Sub-tags written when parsing recorded no layout for them.
const DEFAULT_LAYOUT: &[(&str, NodeKind)] = &[
    (tags::DESCRIPTION, LocalizedInfoNode::KIND),
    (tags::UNIQUE_ID, ApplicationRuntimeNode::KIND),
    (tags::SECURITY_ROLE_MAPPING, SecurityRoleMappingNode::KIND),
    (tags::REALM, ApplicationRuntimeNode::KIND),
    (tags::EJB_REF, RuntimeRefNode::KIND),
    (tags::RESOURCE_REF, RuntimeRefNode::KIND),
    (tags::RESOURCE_ENV_REF, RuntimeRefNode::KIND),
    (tags::ARCHIVE_NAME, ApplicationRuntimeNode::KIND),
    (tags::KEEP_STATE, ApplicationRuntimeNode::KIND),
    (tags::VERSION_IDENTIFIER, ApplicationRuntimeNode::KIND),
    (tags::PROPERTY, RuntimePropertyNode::KIND),
];

/// Root node of `glassfish-application` documents.
#[derive(Debug)]
pub struct ApplicationRuntimeNode {
    core: NodeCore,
}

impl ApplicationRuntimeNode {
    pub const KIND: NodeKind =
        NodeKind::new("ApplicationRuntimeNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        let mut core = NodeCore::with_tag(tags::GLASSFISH_APPLICATION);
        core.register_handler_with(
            tags::SECURITY_ROLE_MAPPING,
            SecurityRoleMappingNode::KIND,
            "add_security_role_mapping",
        );
        for tag in [tags::EJB_REF, tags::RESOURCE_REF, tags::RESOURCE_ENV_REF] {
            core.register_handler_with(tag, RuntimeRefNode::KIND, "add_reference");
        }
        core.register_handler_with(tags::PROPERTY, RuntimePropertyNode::KIND, "add_property");
        Self { core }
    }
}

impl Default for ApplicationRuntimeNode {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlNode for ApplicationRuntimeNode {
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
        Some(Box::new(ApplicationRuntime::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &APPLICATION_RUNTIME_DISPATCH
    }

    /// Accepts descriptions and keeps the descriptors of extension elements
    /// resolved directly under the root. Extensions from deeper elements
    /// are rejected.
    fn append_descriptor(
        &mut self,
        tag: &QualifiedTag,
        descriptor: Box<dyn Descriptor>,
    ) -> std::result::Result<(), Box<dyn Descriptor>> {
        let direct_child = self.core().handler(&tag.qname()).is_some();
        let Some(runtime) = self
            .descriptor_mut()
            .and_then(|d| d.downcast_mut::<ApplicationRuntime>())
        else {
            return Err(descriptor);
        };
        if let Some(text) = descriptor.downcast_ref::<LocalizedText>() {
            runtime
                .info
                .set_localized_description(&text.lang, text.text.as_str());
            return Ok(());
        }
        if !direct_child {
            return Err(descriptor);
        }
        tracing::debug!(tag = %tag, descriptor = descriptor.type_name(), "Extension descriptor kept");
        runtime.extensions.push(ExtensionDescriptor {
            tag: tag.qname(),
            descriptor,
        });
        Ok(())
    }

    fn extension_descriptors<'d>(
        &self,
        descriptor: &'d dyn Descriptor,
        tag: &str,
    ) -> Vec<&'d (dyn Descriptor + 'static)> {
        descriptor
            .downcast_ref::<ApplicationRuntime>()
            .map(|runtime| {
                runtime
                    .extensions
                    .iter()
                    .filter(|extension| extension.tag == tag)
                    .map(|extension| extension.descriptor.as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn doc_type(&self) -> Option<DocType> {
        Some(DocType {
            public_id: RUNTIME_APPLICATION_PUBLIC_ID,
            system_id: RUNTIME_APPLICATION_SYSTEM_ID,
        })
    }

    fn is_runtime_root(&self) -> bool {
        true
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let runtime = descriptor_as::<ApplicationRuntime>(descriptor, name)?;
        let element = out.tree.create_element(parent, name);
        add_namespace_declaration(&mut out.tree, element, &runtime.info);
        write_sub_descriptors(self, out, element, descriptor, DEFAULT_LAYOUT)?;
        Ok(element)
    }

    fn write_simple_text_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<()> {
        let runtime = descriptor_as::<ApplicationRuntime>(descriptor, name)?;
        let tree = &mut out.tree;
        match name {
            tags::UNIQUE_ID => {
                append_value_child(tree, parent, name, runtime.unique_id);
            }
            tags::REALM => {
                append_text_child(tree, parent, name, runtime.realm.as_deref());
            }
            tags::ARCHIVE_NAME => {
                append_text_child(tree, parent, name, runtime.archive_name.as_deref());
            }
            tags::KEEP_STATE => {
                append_bool_child(tree, parent, name, runtime.keep_state);
            }
            tags::VERSION_IDENTIFIER => {
                append_text_child(tree, parent, name, runtime.version_identifier.as_deref());
            }
            _ => tracing::debug!(tag = name, "No value held for tag"),
        }
        Ok(())
    }
}

static SECURITY_ROLE_MAPPING_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::ROLE_NAME, "set_role_name")
        .map(tags::PRINCIPAL_NAME, "add_principal_name")
        .map(tags::GROUP_NAME, "add_group_name")
});

/// Handles `security-role-mapping`.
#[derive(Debug, Default)]
pub struct SecurityRoleMappingNode {
    core: NodeCore,
}

impl SecurityRoleMappingNode {
    pub const KIND: NodeKind =
        NodeKind::new("SecurityRoleMappingNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for SecurityRoleMappingNode {
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
        Some(Box::new(SecurityRoleMapping::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &SECURITY_ROLE_MAPPING_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let mapping = descriptor_as::<SecurityRoleMapping>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        force_append_text_child(tree, element, tags::ROLE_NAME, &mapping.role_name);
        for principal in &mapping.principal_names {
            force_append_text_child(tree, element, tags::PRINCIPAL_NAME, principal);
        }
        for group in &mapping.group_names {
            force_append_text_child(tree, element, tags::GROUP_NAME, group);
        }
        Ok(element)
    }

    fn write_descriptors(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        parent_descriptor: &dyn Descriptor,
    ) -> Result<()> {
        if name != tags::SECURITY_ROLE_MAPPING {
            return Ok(());
        }
        let Some(runtime) = parent_descriptor.downcast_ref::<ApplicationRuntime>() else {
            return Ok(());
        };
        for mapping in &runtime.security_role_mappings {
            self.write_descriptor(out, parent, name, mapping)?;
        }
        Ok(())
    }
}

static RUNTIME_REF_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::EJB_REF_NAME, "set_name")
        .map(tags::RES_REF_NAME, "set_name")
        .map(tags::RESOURCE_ENV_REF_NAME, "set_name")
        .map(tags::JNDI_NAME, "set_jndi_name")
});

/// Handles the runtime bindings `ejb-ref`, `resource-ref` and
/// `resource-env-ref`.
#[derive(Debug, Default)]
pub struct RuntimeRefNode {
    core: NodeCore,
}

impl RuntimeRefNode {
    pub const KIND: NodeKind = NodeKind::new("RuntimeRefNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for RuntimeRefNode {
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
        let kind = RuntimeReferenceKind::from_tag(self.root_tag().local_name()).unwrap_or_default();
        Some(Box::new(RuntimeReference::new(kind)))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &RUNTIME_REF_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let reference = descriptor_as::<RuntimeReference>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        force_append_text_child(tree, element, reference.kind.name_tag(), &reference.name);
        append_value_child(tree, element, tags::JNDI_NAME, reference.jndi_name.as_ref());
        Ok(element)
    }

    /// Writes the runtime's bindings of the kind held by `name` elements.
    fn write_descriptors(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        parent_descriptor: &dyn Descriptor,
    ) -> Result<()> {
        let Some(runtime) = parent_descriptor.downcast_ref::<ApplicationRuntime>() else {
            return Ok(());
        };
        let Some(kind) = RuntimeReferenceKind::from_tag(name) else {
            return Ok(());
        };
        for reference in runtime.references_of(kind) {
            self.write_descriptor(out, parent, name, reference)?;
        }
        Ok(())
    }
}
