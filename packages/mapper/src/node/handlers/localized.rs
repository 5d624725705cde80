//! Nodes for descriptions and name/value properties.

use std::sync::LazyLock;

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::model::{ApplicationRuntime, LocalizedText, ResourceProperty};
use crate::node::handler::{descriptor_as, NodeCore, XmlNode};
use crate::node::types::{DispatchTable, NodeKind};
use crate::node::writer::{
    force_append_text_child, set_attribute, write_localized_descriptions, WriteContext,
};
use crate::tags;
use crate::xml::NodeId;

/// Handles `description` elements.
#[derive(Debug, Default)]
pub struct LocalizedInfoNode {
    core: NodeCore,
}

static LOCALIZED_INFO_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::DESCRIPTION, "set_text")
        .map(tags::XML_LANG, "set_lang")
});

impl LocalizedInfoNode {
    pub const KIND: NodeKind = NodeKind::new("LocalizedInfoNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for LocalizedInfoNode {
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
        Some(Box::new(LocalizedText::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &LOCALIZED_INFO_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let text = descriptor_as::<LocalizedText>(descriptor, name)?;
        let element = force_append_text_child(&mut out.tree, parent, name, &text.text);
        set_attribute(&mut out.tree, element, tags::XML_LANG, Some(&text.lang));
        Ok(element)
    }

    /// Writes the localized descriptions of the enclosing descriptor.
    fn write_descriptors(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        _name: &str,
        parent_descriptor: &dyn Descriptor,
    ) -> Result<()> {
        write_localized_descriptions(&mut out.tree, parent, parent_descriptor.info());
        Ok(())
    }
}

static PROPERTY_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::NAME, "set_name")
        .map(tags::VALUE, "set_value")
});

/// Handles `property` elements written as `name`/`value` children.
#[derive(Debug, Default)]
pub struct PropertyNode {
    core: NodeCore,
}

impl PropertyNode {
    pub const KIND: NodeKind = NodeKind::new("PropertyNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for PropertyNode {
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
        Some(Box::new(ResourceProperty::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &PROPERTY_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let property = descriptor_as::<ResourceProperty>(descriptor, name)?;
        let element = out.tree.create_element(parent, name);
        write_localized_descriptions(&mut out.tree, element, &property.info);
        force_append_text_child(&mut out.tree, element, tags::NAME, &property.name);
        force_append_text_child(&mut out.tree, element, tags::VALUE, &property.value);
        Ok(element)
    }
}

/// Handles attribute-style `<property name=".." value=".."/>` elements of
/// runtime descriptors.
#[derive(Debug, Default)]
pub struct RuntimePropertyNode {
    core: NodeCore,
}

impl RuntimePropertyNode {
    pub const KIND: NodeKind =
        NodeKind::new("RuntimePropertyNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl XmlNode for RuntimePropertyNode {
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
        Some(Box::new(ResourceProperty::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &PROPERTY_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let property = descriptor_as::<ResourceProperty>(descriptor, name)?;
        let element = out.tree.create_element(parent, name);
        out.tree.set_attribute(element, tags::NAME, &property.name);
        out.tree.set_attribute(element, tags::VALUE, &property.value);
        write_localized_descriptions(&mut out.tree, element, &property.info);
        Ok(element)
    }

    /// Writes the runtime descriptor's properties.
    fn write_descriptors(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        parent_descriptor: &dyn Descriptor,
    ) -> Result<()> {
        if name != tags::PROPERTY {
            return Ok(());
        }
        let Some(runtime) = parent_descriptor.downcast_ref::<ApplicationRuntime>() else {
            return Ok(());
        };
        for property in &runtime.properties {
            self.write_descriptor(out, parent, name, property)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtensionDescriptor;
    use crate::xml::XmlTree;

    #[test]
    fn test_runtime_property_written_as_attributes() {
        let mut out = WriteContext::new();
        let document = out.tree.document();
        let root = out.tree.create_element(document, tags::GLASSFISH_APPLICATION);
        let property = ResourceProperty::new("compatibility", "v2");

        let element = RuntimePropertyNode::new()
            .write_descriptor(&mut out, root, tags::PROPERTY, &property)
            .unwrap();
        assert_eq!(out.tree.attribute(element, tags::NAME), Some("compatibility"));
        assert_eq!(out.tree.attribute(element, tags::VALUE), Some("v2"));
        assert!(out.tree.children(element).is_empty());
    }

    #[test]
    fn test_runtime_property_writes_only_properties() {
        let mut runtime = ApplicationRuntime::default();
        runtime.properties.push(ResourceProperty::new("a", "1"));
        runtime.extensions.push(ExtensionDescriptor {
            tag: "ext:property".to_string(),
            descriptor: Box::new(ResourceProperty::new("b", "2")),
        });

        let mut out = WriteContext::new();
        let document = out.tree.document();
        let root = out.tree.create_element(document, tags::GLASSFISH_APPLICATION);
        let node = RuntimePropertyNode::new();
        node.write_descriptors(&mut out, root, tags::PROPERTY, &runtime)
            .unwrap();
        node.write_descriptors(&mut out, root, "ext:property", &runtime)
            .unwrap();

        let tree: XmlTree = out.into_tree();
        let written = tree.child_elements(root, tags::PROPERTY);
        assert_eq!(written.len(), 1);
        assert_eq!(tree.attribute(written[0], tags::NAME), Some("a"));
        assert!(tree.child_elements(root, "ext:property").is_empty());
    }

    #[test]
    fn test_property_node_rejects_other_descriptor() {
        let mut out = WriteContext::new();
        let document = out.tree.document();
        let err = PropertyNode::new()
            .write_descriptor(&mut out, document, tags::PROPERTY, &LocalizedText::default())
            .unwrap_err();
        assert!(err.to_string().contains("LocalizedText"));
    }
}
