//! Nodes for the JNDI environment group.

use std::sync::LazyLock;

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::model::{
    EjbReference, EnvironmentProperty, MessageDestinationReference, ResourceEnvReference,
    ResourceReference,
};
use crate::node::handler::{descriptor_as, NodeCore, XmlNode};
use crate::node::types::{DispatchTable, NodeKind};
use crate::node::writer::{
    append_text_child, append_value_child, force_append_text_child,
    write_localized_descriptions, WriteContext,
};
use crate::tags;
use crate::xml::NodeId;

/// Handles `env-entry`.
#[derive(Debug, Default)]
pub struct EnvEntryNode {
    core: NodeCore,
}

static ENV_ENTRY_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::ENV_ENTRY_NAME, "set_name")
        .map(tags::ENV_ENTRY_TYPE, "set_type")
        .map(tags::ENV_ENTRY_VALUE, "set_value")
        .map(tags::MAPPED_NAME, "set_mapped_name")
        .map(tags::LOOKUP_NAME, "set_lookup_name")
});

impl EnvEntryNode {
    pub const KIND: NodeKind = NodeKind::new("EnvEntryNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for EnvEntryNode {
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
        Some(Box::new(EnvironmentProperty::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &ENV_ENTRY_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let entry = descriptor_as::<EnvironmentProperty>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &entry.info);
        force_append_text_child(tree, element, tags::ENV_ENTRY_NAME, &entry.name);
        append_text_child(tree, element, tags::ENV_ENTRY_TYPE, entry.entry_type.as_deref());
        append_text_child(tree, element, tags::ENV_ENTRY_VALUE, entry.value.as_deref());
        append_text_child(tree, element, tags::MAPPED_NAME, entry.mapped_name.as_deref());
        append_value_child(tree, element, tags::LOOKUP_NAME, entry.lookup_name.as_ref());
        Ok(element)
    }
}

/// Handles both `ejb-ref` and `ejb-local-ref`; the element name decides
/// the locality of the reference.
#[derive(Debug, Default)]
pub struct EjbReferenceNode {
    core: NodeCore,
}

static EJB_REFERENCE_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::EJB_REF_NAME, "set_name")
        .map(tags::EJB_REF_TYPE, "set_ejb_ref_type")
        .map(tags::HOME, "set_home")
        .map(tags::REMOTE, "set_remote")
        .map(tags::LOCAL_HOME, "set_local_home")
        .map(tags::LOCAL, "set_local")
        .map(tags::EJB_LINK, "set_ejb_link")
        .map(tags::MAPPED_NAME, "set_mapped_name")
        .map(tags::LOOKUP_NAME, "set_lookup_name")
});

impl EjbReferenceNode {
    pub const KIND: NodeKind = NodeKind::new("EjbReferenceNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for EjbReferenceNode {
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
        let local = self.root_tag().local_name() == tags::EJB_LOCAL_REF;
        Some(Box::new(EjbReference::new("", local)))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &EJB_REFERENCE_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let reference = descriptor_as::<EjbReference>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &reference.info);
        force_append_text_child(tree, element, tags::EJB_REF_NAME, &reference.name);
        append_text_child(tree, element, tags::EJB_REF_TYPE, reference.ejb_ref_type.as_deref());
        if reference.local {
            append_text_child(tree, element, tags::LOCAL_HOME, reference.local_home.as_deref());
            append_text_child(tree, element, tags::LOCAL, reference.local_interface.as_deref());
        } else {
            append_text_child(tree, element, tags::HOME, reference.home.as_deref());
            append_text_child(tree, element, tags::REMOTE, reference.remote.as_deref());
        }
        append_text_child(tree, element, tags::EJB_LINK, reference.ejb_link.as_deref());
        append_text_child(tree, element, tags::MAPPED_NAME, reference.mapped_name.as_deref());
        append_value_child(tree, element, tags::LOOKUP_NAME, reference.lookup_name.as_ref());
        Ok(element)
    }
}

/// Handles `resource-ref`.
#[derive(Debug, Default)]
pub struct ResourceRefNode {
    core: NodeCore,
}

static RESOURCE_REF_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::RES_REF_NAME, "set_name")
        .map(tags::RES_TYPE, "set_type")
        .map(tags::RES_AUTH, "set_auth")
        .map(tags::RES_SHARING_SCOPE, "set_sharing_scope")
        .map(tags::MAPPED_NAME, "set_mapped_name")
        .map(tags::LOOKUP_NAME, "set_lookup_name")
});

impl ResourceRefNode {
    pub const KIND: NodeKind = NodeKind::new("ResourceRefNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for ResourceRefNode {
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
        Some(Box::new(ResourceReference::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &RESOURCE_REF_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let reference = descriptor_as::<ResourceReference>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &reference.info);
        force_append_text_child(tree, element, tags::RES_REF_NAME, &reference.name);
        append_text_child(tree, element, tags::RES_TYPE, reference.res_type.as_deref());
        append_text_child(tree, element, tags::RES_AUTH, reference.auth.map(|a| a.as_str()));
        append_text_child(
            tree,
            element,
            tags::RES_SHARING_SCOPE,
            reference.sharing_scope.map(|s| s.as_str()),
        );
        append_text_child(tree, element, tags::MAPPED_NAME, reference.mapped_name.as_deref());
        append_value_child(tree, element, tags::LOOKUP_NAME, reference.lookup_name.as_ref());
        Ok(element)
    }
}

/// Handles `resource-env-ref`.
#[derive(Debug, Default)]
pub struct ResourceEnvRefNode {
    core: NodeCore,
}

static RESOURCE_ENV_REF_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::RESOURCE_ENV_REF_NAME, "set_name")
        .map(tags::RESOURCE_ENV_REF_TYPE, "set_type")
        .map(tags::MAPPED_NAME, "set_mapped_name")
        .map(tags::LOOKUP_NAME, "set_lookup_name")
});

impl ResourceEnvRefNode {
    pub const KIND: NodeKind = NodeKind::new("ResourceEnvRefNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for ResourceEnvRefNode {
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
        Some(Box::new(ResourceEnvReference::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &RESOURCE_ENV_REF_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let reference = descriptor_as::<ResourceEnvReference>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &reference.info);
        force_append_text_child(tree, element, tags::RESOURCE_ENV_REF_NAME, &reference.name);
        append_text_child(
            tree,
            element,
            tags::RESOURCE_ENV_REF_TYPE,
            reference.res_type.as_deref(),
        );
        append_text_child(tree, element, tags::MAPPED_NAME, reference.mapped_name.as_deref());
        append_value_child(tree, element, tags::LOOKUP_NAME, reference.lookup_name.as_ref());
        Ok(element)
    }
}

/// Handles `message-destination-ref`.
#[derive(Debug, Default)]
pub struct MessageDestinationRefNode {
    core: NodeCore,
}

static MESSAGE_DESTINATION_REF_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::MESSAGE_DESTINATION_REF_NAME, "set_name")
        .map(tags::MESSAGE_DESTINATION_TYPE, "set_destination_type")
        .map(tags::MESSAGE_DESTINATION_USAGE, "set_usage")
        .map(tags::MESSAGE_DESTINATION_LINK, "set_link")
        .map(tags::MAPPED_NAME, "set_mapped_name")
        .map(tags::LOOKUP_NAME, "set_lookup_name")
});

impl MessageDestinationRefNode {
    pub const KIND: NodeKind =
        NodeKind::new("MessageDestinationRefNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for MessageDestinationRefNode {
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
        Some(Box::new(MessageDestinationReference::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &MESSAGE_DESTINATION_REF_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let reference = descriptor_as::<MessageDestinationReference>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &reference.info);
        force_append_text_child(
            tree,
            element,
            tags::MESSAGE_DESTINATION_REF_NAME,
            &reference.name,
        );
        append_text_child(
            tree,
            element,
            tags::MESSAGE_DESTINATION_TYPE,
            reference.destination_type.as_deref(),
        );
        append_text_child(
            tree,
            element,
            tags::MESSAGE_DESTINATION_USAGE,
            reference.usage.map(|u| u.as_str()),
        );
        append_text_child(
            tree,
            element,
            tags::MESSAGE_DESTINATION_LINK,
            reference.link.as_deref(),
        );
        append_text_child(tree, element, tags::MAPPED_NAME, reference.mapped_name.as_deref());
        append_value_child(tree, element, tags::LOOKUP_NAME, reference.lookup_name.as_ref());
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::QualifiedTag;

    #[test]
    fn test_ejb_local_ref_sets_locality() {
        let mut node = EjbReferenceNode::new();
        node.set_root_tag(QualifiedTag::new(tags::EJB_LOCAL_REF));
        let descriptor = node.descriptor_mut().unwrap();
        assert!(descriptor.downcast_ref::<EjbReference>().unwrap().local);

        let mut node = EjbReferenceNode::new();
        node.set_root_tag(QualifiedTag::new(tags::EJB_REF));
        let descriptor = node.descriptor_mut().unwrap();
        assert!(!descriptor.downcast_ref::<EjbReference>().unwrap().local);
    }

    #[test]
    fn test_local_reference_writes_local_interfaces() {
        let mut reference = EjbReference::new("ejb/Cart", true);
        reference.home = Some("shop.CartHome".to_string());
        reference.local_interface = Some("shop.Cart".to_string());

        let mut out = WriteContext::new();
        let document = out.tree.document();
        let element = EjbReferenceNode::new()
            .write_descriptor(&mut out, document, tags::EJB_LOCAL_REF, &reference)
            .unwrap();
        assert_eq!(out.tree.child_elements(element, tags::LOCAL).len(), 1);
        assert!(out.tree.child_elements(element, tags::HOME).is_empty());
    }

    #[test]
    fn test_resource_ref_writes_enums_as_text() {
        let reference = ResourceReference {
            name: "jdbc/Orders".to_string(),
            auth: Some(crate::model::ResAuth::Application),
            ..ResourceReference::default()
        };
        let mut out = WriteContext::new();
        let document = out.tree.document();
        let element = ResourceRefNode::new()
            .write_descriptor(&mut out, document, tags::RESOURCE_REF, &reference)
            .unwrap();
        let auth = out.tree.child_elements(element, tags::RES_AUTH)[0];
        assert_eq!(out.tree.text(auth), "Application");
    }
}
