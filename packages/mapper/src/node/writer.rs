//! Serialization helpers shared by node kinds.
//!
//! Nodes render their descriptors into an [`XmlTree`]. The helpers here
//! cover the repeated shapes: optional text children, namespace
//! declarations, localized descriptions and the reference and resource
//! groups several roots share.

use std::fmt::Display;

use super::handler::XmlNode;
use super::handlers::{
    AdministeredObjectNode, ConnectionFactoryNode, DataSourceNode, EjbReferenceNode,
    EnvEntryNode, JmsConnectionFactoryNode, JmsDestinationNode, MailSessionNode,
    MessageDestinationRefNode, PropertyNode, ResourceEnvRefNode, ResourceRefNode,
};
use super::registry::NodeMappingRegistry;
use super::types::NodeKind;
use crate::descriptor::{Descriptor, DescriptorInfo, ResourceKind};
use crate::error::Result;
use crate::model::{
    EjbReference, EnvironmentProperty, JndiEnvironment, MessageDestinationReference,
    ResourceEnvReference, ResourceProperty, ResourceReference,
};
use crate::tags;
use crate::xml::{compose_qname, NodeId, XmlTree};

/// Output state of one document write.
#[derive(Debug, Default)]
pub struct WriteContext<'a> {
    /// The tree being built.
    pub tree: XmlTree,
    mappings: Option<&'a NodeMappingRegistry>,
}

impl<'a> WriteContext<'a> {
    /// Create an empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay sub-tag mappings discovered while parsing.
    #[must_use]
    pub fn with_mappings(mut self, mappings: &'a NodeMappingRegistry) -> Self {
        self.mappings = Some(mappings);
        self
    }

    /// Registry of discovered sub-tags, if any.
    #[must_use]
    pub fn mappings(&self) -> Option<&'a NodeMappingRegistry> {
        self.mappings
    }

    /// Finish writing.
    #[must_use]
    pub fn into_tree(self) -> XmlTree {
        self.tree
    }
}

/// Append an empty element.
pub fn append_child(tree: &mut XmlTree, parent: NodeId, name: &str) -> NodeId {
    tree.create_element(parent, name)
}

/// Append `<name>value</name>` unless the value is absent or empty.
pub fn append_text_child(
    tree: &mut XmlTree,
    parent: NodeId,
    name: &str,
    value: Option<&str>,
) -> Option<NodeId> {
    let value = value.filter(|v| !v.is_empty())?;
    Some(force_append_text_child(tree, parent, name, value))
}

/// Append `<name>value</name>`, even for an empty value.
pub fn force_append_text_child(tree: &mut XmlTree, parent: NodeId, name: &str, value: &str) -> NodeId {
    let element = tree.create_element(parent, name);
    if !value.is_empty() {
        tree.append_text(element, value);
    }
    element
}

/// Append a child holding any displayable value, if present.
pub fn append_value_child<T: Display>(
    tree: &mut XmlTree,
    parent: NodeId,
    name: &str,
    value: Option<T>,
) -> Option<NodeId> {
    let value = value?.to_string();
    append_text_child(tree, parent, name, Some(&value))
}

/// Append an integer child, if present.
pub fn append_int_child<T: Into<i64>>(
    tree: &mut XmlTree,
    parent: NodeId,
    name: &str,
    value: Option<T>,
) -> Option<NodeId> {
    append_value_child(tree, parent, name, value.map(Into::into))
}

/// Append a boolean child, if present.
pub fn append_bool_child(
    tree: &mut XmlTree,
    parent: NodeId,
    name: &str,
    value: Option<bool>,
) -> Option<NodeId> {
    append_value_child(tree, parent, name, value)
}

/// Append `<name>prefix:local</name>`, declaring `prefix` on the new
/// element when a namespace is given.
pub fn append_qname_child(
    tree: &mut XmlTree,
    parent: NodeId,
    name: &str,
    prefix: &str,
    local_part: &str,
    namespace: Option<&str>,
) -> NodeId {
    let element = force_append_text_child(tree, parent, name, &compose_qname(prefix, local_part));
    if let Some(uri) = namespace {
        set_attribute_ns(tree, element, prefix, uri);
    }
    element
}

/// Set an attribute unless the value is absent or empty.
pub fn set_attribute(tree: &mut XmlTree, element: NodeId, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        tree.set_attribute(element, name, value);
    }
}

/// Declare `prefix` (empty for the default namespace) on `element`.
pub fn set_attribute_ns(tree: &mut XmlTree, element: NodeId, prefix: &str, uri: &str) {
    tree.set_namespace(element, prefix, uri);
}

/// Re-declare the namespaces recorded on a descriptor.
pub fn add_namespace_declaration(tree: &mut XmlTree, element: NodeId, info: &DescriptorInfo) {
    for (prefix, uri) in info.prefix_mapping() {
        set_attribute_ns(tree, element, prefix, uri);
    }
}

/// Write one `description` per language, tagged with `xml:lang` unless
/// untagged.
pub fn write_localized_descriptions(tree: &mut XmlTree, parent: NodeId, info: &DescriptorInfo) {
    for (lang, text) in info.localized_descriptions() {
        let element = force_append_text_child(tree, parent, tags::DESCRIPTION, text);
        set_attribute(tree, element, tags::XML_LANG, Some(lang));
    }
}

/// Write name/value properties as `property` elements.
///
/// # Errors
/// Propagates descriptor write failures.
pub fn write_properties(
    out: &mut WriteContext<'_>,
    parent: NodeId,
    properties: &[ResourceProperty],
) -> Result<()> {
    let node = PropertyNode::new();
    for property in properties {
        node.write_descriptor(out, parent, tags::PROPERTY, property)?;
    }
    Ok(())
}

/// Write `env-entry` elements.
///
/// # Errors
/// Propagates descriptor write failures.
pub fn write_env_entry_descriptors(
    out: &mut WriteContext<'_>,
    parent: NodeId,
    entries: &[EnvironmentProperty],
) -> Result<()> {
    let node = EnvEntryNode::new();
    for entry in entries {
        node.write_descriptor(out, parent, tags::ENV_ENTRY, entry)?;
    }
    Ok(())
}

/// Write EJB references: every remote one as `ejb-ref`, then every local
/// one as `ejb-local-ref`, each group in its original order.
///
/// # Errors
/// Propagates descriptor write failures.
pub fn write_ejb_reference_descriptors(
    out: &mut WriteContext<'_>,
    parent: NodeId,
    references: &[EjbReference],
) -> Result<()> {
    let node = EjbReferenceNode::new();
    let (local, remote): (Vec<&EjbReference>, Vec<&EjbReference>) =
        references.iter().partition(|r| r.local);

    for reference in remote {
        node.write_descriptor(out, parent, tags::EJB_REF, reference)?;
    }
    for reference in local {
        node.write_descriptor(out, parent, tags::EJB_LOCAL_REF, reference)?;
    }
    Ok(())
}

/// Write `resource-ref` elements.
///
/// # Errors
/// Propagates descriptor write failures.
pub fn write_resource_ref_descriptors(
    out: &mut WriteContext<'_>,
    parent: NodeId,
    references: &[ResourceReference],
) -> Result<()> {
    let node = ResourceRefNode::new();
    for reference in references {
        node.write_descriptor(out, parent, tags::RESOURCE_REF, reference)?;
    }
    Ok(())
}

/// Write `resource-env-ref` elements.
///
/// # Errors
/// Propagates descriptor write failures.
pub fn write_resource_env_ref_descriptors(
    out: &mut WriteContext<'_>,
    parent: NodeId,
    references: &[ResourceEnvReference],
) -> Result<()> {
    let node = ResourceEnvRefNode::new();
    for reference in references {
        node.write_descriptor(out, parent, tags::RESOURCE_ENV_REF, reference)?;
    }
    Ok(())
}

/// Write `message-destination-ref` elements.
///
/// # Errors
/// Propagates descriptor write failures.
pub fn write_message_destination_ref_descriptors(
    out: &mut WriteContext<'_>,
    parent: NodeId,
    references: &[MessageDestinationReference],
) -> Result<()> {
    let node = MessageDestinationRefNode::new();
    for reference in references {
        node.write_descriptor(out, parent, tags::MESSAGE_DESTINATION_REF, reference)?;
    }
    Ok(())
}

/// Write the JNDI environment group in schema order.
///
/// # Errors
/// Propagates descriptor write failures.
pub fn write_jndi_environment_refs(
    out: &mut WriteContext<'_>,
    parent: NodeId,
    environment: &JndiEnvironment,
) -> Result<()> {
    write_env_entry_descriptors(out, parent, &environment.env_entries)?;
    write_ejb_reference_descriptors(out, parent, &environment.ejb_references)?;
    write_resource_ref_descriptors(out, parent, &environment.resource_references)?;
    write_resource_env_ref_descriptors(out, parent, &environment.resource_env_references)?;
    write_message_destination_ref_descriptors(
        out,
        parent,
        &environment.message_destination_references,
    )
}

/// Schema position of each resource kind.
fn resource_rank(kind: ResourceKind) -> usize {
    match kind {
        ResourceKind::DataSource => 0,
        ResourceKind::JmsConnectionFactory => 1,
        ResourceKind::JmsDestination => 2,
        ResourceKind::MailSession => 3,
        ResourceKind::ConnectionFactory => 4,
        ResourceKind::AdministeredObject => 5,
    }
}

/// Write resource definitions, grouped by kind in schema order.
///
/// Each descriptor is delegated to the node of its resource kind.
/// Descriptors that are no resource at all are skipped.
///
/// # Errors
/// Propagates descriptor write failures.
pub fn write_resource_descriptors<'d>(
    out: &mut WriteContext<'_>,
    parent: NodeId,
    resources: impl IntoIterator<Item = &'d dyn Descriptor>,
) -> Result<()> {
    let mut ranked: Vec<(usize, ResourceKind, &dyn Descriptor)> = Vec::new();
    for descriptor in resources {
        let Some(kind) = descriptor.resource_kind() else {
            tracing::debug!(descriptor = descriptor.type_name(), "Not a resource, skipped");
            continue;
        };
        ranked.push((resource_rank(kind), kind, descriptor));
    }
    ranked.sort_by_key(|(rank, _, _)| *rank);

    for (_, kind, descriptor) in ranked {
        match kind {
            ResourceKind::DataSource => {
                DataSourceNode::new().write_descriptor(out, parent, tags::DATA_SOURCE, descriptor)?
            }
            ResourceKind::JmsConnectionFactory => JmsConnectionFactoryNode::new()
                .write_descriptor(out, parent, tags::JMS_CONNECTION_FACTORY, descriptor)?,
            ResourceKind::JmsDestination => JmsDestinationNode::new().write_descriptor(
                out,
                parent,
                tags::JMS_DESTINATION,
                descriptor,
            )?,
            ResourceKind::MailSession => {
                MailSessionNode::new().write_descriptor(out, parent, tags::MAIL_SESSION, descriptor)?
            }
            ResourceKind::ConnectionFactory => ConnectionFactoryNode::new().write_descriptor(
                out,
                parent,
                tags::CONNECTION_FACTORY,
                descriptor,
            )?,
            ResourceKind::AdministeredObject => AdministeredObjectNode::new().write_descriptor(
                out,
                parent,
                tags::ADMINISTERED_OBJECT,
                descriptor,
            )?,
        };
    }
    Ok(())
}

/// Write the sub-tags of `node` under `parent`.
///
/// The layout is the registry's `node tag -> (sub-tag, kind)` list
/// discovered while parsing, followed by any entry of `defaults` the
/// registry has not seen. A sub-tag owned by `node`'s own kind is written
/// with [`XmlNode::write_simple_text_descriptor`]. A sub-tag `node`
/// registers a handler for is written by that kind's
/// [`XmlNode::write_descriptors`]. Any other sub-tag came from an extension
/// handler: each of `node`'s [`XmlNode::extension_descriptors`] for it is
/// written by the extension kind's [`XmlNode::write_descriptor`].
///
/// # Errors
/// Propagates node creation and descriptor write failures.
pub fn write_sub_descriptors(
    node: &dyn XmlNode,
    out: &mut WriteContext<'_>,
    parent: NodeId,
    descriptor: &dyn Descriptor,
    defaults: &[(&str, NodeKind)],
) -> Result<()> {
    let node_name = node.root_tag().qname();
    let mut layout = out
        .mappings()
        .map(|mappings| mappings.mappings(&node_name))
        .unwrap_or_default();
    for (tag, kind) in defaults {
        if !layout.iter().any(|(known, _)| known == tag) {
            layout.push(((*tag).to_string(), *kind));
        }
    }

    for (sub_tag, kind) in layout {
        if sub_tag == node_name {
            continue;
        }
        if kind == node.kind() {
            node.write_simple_text_descriptor(out, parent, &sub_tag, descriptor)?;
            continue;
        }
        let sub_node = kind.instantiate()?;
        if node.core().handler(&sub_tag).is_some() {
            sub_node.write_descriptors(out, parent, &sub_tag, descriptor)?;
        } else {
            for extension in node.extension_descriptors(descriptor, &sub_tag) {
                sub_node.write_descriptor(out, parent, &sub_tag, extension)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(tree: &XmlTree) -> String {
        tree.render(2).unwrap()
    }

    fn root(tree: &mut XmlTree, name: &str) -> NodeId {
        let document = tree.document();
        append_child(tree, document, name)
    }

    #[test]
    fn test_text_helpers_skip_empty_values() {
        let mut tree = XmlTree::new();
        let root = root(&mut tree, "root");
        assert!(append_text_child(&mut tree, root, "a", None).is_none());
        assert!(append_text_child(&mut tree, root, "b", Some("")).is_none());
        append_text_child(&mut tree, root, "c", Some("x"));
        force_append_text_child(&mut tree, root, "d", "");
        append_int_child(&mut tree, root, "e", Some(5_i32));
        append_bool_child(&mut tree, root, "f", Some(false));
        append_bool_child(&mut tree, root, "g", None);
        set_attribute(&mut tree, root, "id", Some(""));

        let names: Vec<_> = tree
            .children(root)
            .iter()
            .filter_map(|id| tree.name(*id))
            .collect();
        assert_eq!(names, vec!["c", "d", "e", "f"]);
        assert_eq!(tree.attribute(root, "id"), None);
        assert!(render(&tree).contains("<e>5</e>"));
    }

    #[test]
    fn test_localized_descriptions() {
        let mut info = DescriptorInfo::new();
        info.set_description("Shop");
        info.set_localized_description("nl", "Winkel");

        let mut tree = XmlTree::new();
        let root = root(&mut tree, "root");
        write_localized_descriptions(&mut tree, root, &info);

        let descriptions = tree.child_elements(root, tags::DESCRIPTION);
        assert_eq!(descriptions.len(), 2);
        assert_eq!(tree.attribute(descriptions[0], tags::XML_LANG), None);
        assert_eq!(tree.text(descriptions[0]), "Shop");
        assert_eq!(tree.attribute(descriptions[1], tags::XML_LANG), Some("nl"));
    }

    #[test]
    fn test_qname_child_declares_prefix() {
        let mut tree = XmlTree::new();
        let root = root(&mut tree, "root");
        let element = append_qname_child(&mut tree, root, "type", "ns1", "Cart", Some("urn:shop"));
        assert_eq!(tree.text(element), "ns1:Cart");
        assert_eq!(tree.attribute(element, "xmlns:ns1"), Some("urn:shop"));
    }

    #[test]
    fn test_ejb_references_partitioned_by_locality() {
        let references = vec![
            EjbReference::new("ejb/A", true),
            EjbReference::new("ejb/B", false),
            EjbReference::new("ejb/C", true),
            EjbReference::new("ejb/D", false),
            EjbReference::new("ejb/E", true),
        ];
        let mut out = WriteContext::new();
        let root = root(&mut out.tree, "application");
        write_ejb_reference_descriptors(&mut out, root, &references).unwrap();

        let tree = out.into_tree();
        let written: Vec<(String, String)> = tree
            .children(root)
            .iter()
            .map(|id| {
                let name = tree.name(*id).unwrap_or_default().to_string();
                let ref_name = tree.child_elements(*id, tags::EJB_REF_NAME)[0];
                (name, tree.text(ref_name))
            })
            .collect();
        assert_eq!(
            written,
            vec![
                ("ejb-ref".to_string(), "ejb/B".to_string()),
                ("ejb-ref".to_string(), "ejb/D".to_string()),
                ("ejb-local-ref".to_string(), "ejb/A".to_string()),
                ("ejb-local-ref".to_string(), "ejb/C".to_string()),
                ("ejb-local-ref".to_string(), "ejb/E".to_string()),
            ]
        );
    }

    #[test]
    fn test_resources_written_in_schema_order() {
        use crate::model::{DataSourceDefinition, MailSession};

        let session = MailSession {
            name: "java:app/mail/Orders".to_string(),
            ..MailSession::default()
        };
        let data_source = DataSourceDefinition {
            name: "java:app/jdbc/Orders".to_string(),
            ..DataSourceDefinition::default()
        };
        let property = ResourceProperty::new("a", "b");
        let resources: Vec<&dyn Descriptor> = vec![&session, &property, &data_source];

        let mut out = WriteContext::new();
        let root = root(&mut out.tree, "application");
        write_resource_descriptors(&mut out, root, resources).unwrap();

        let names: Vec<_> = out
            .tree
            .children(root)
            .iter()
            .filter_map(|id| out.tree.name(*id))
            .collect();
        assert_eq!(names, vec!["data-source", "mail-session"]);
    }
}
