//! Node trait definition.
//!
//! A node handles one element kind. It owns the descriptor built for that
//! element, knows which sub-tags are handled by other node kinds and which
//! leaf values go to which descriptor operation. The parse engine keeps the
//! open nodes on a stack; a node never holds a reference to its parent.

use std::collections::{BTreeMap, HashMap};

use super::handlers::LocalizedInfoNode;
use super::types::{Diagnostic, DispatchTable, NodeKind, ParseContext};
use super::writer::WriteContext;
use crate::descriptor::{resolve_and_invoke, Descriptor};
use crate::error::{DescriptorError, Result};
use crate::model::LocalizedText;
use crate::tags;
use crate::xml::{DocType, NodeId, QualifiedTag, XmlAttribute};

/// State every node carries.
#[derive(Debug)]
pub struct NodeCore {
    tag: QualifiedTag,
    handlers: HashMap<String, NodeKind>,
    add_methods: HashMap<String, &'static str>,
    descriptor: Option<Box<dyn Descriptor>>,
    materialized: bool,
}

impl NodeCore {
    /// Create the state of a node whose tag is set when it is attached.
    ///
    /// Every node handles `description` through [`LocalizedInfoNode`].
    #[must_use]
    pub fn new() -> Self {
        let mut core = Self {
            tag: QualifiedTag::default(),
            handlers: HashMap::new(),
            add_methods: HashMap::new(),
            descriptor: None,
            materialized: false,
        };
        core.register_handler(tags::DESCRIPTION, LocalizedInfoNode::KIND);
        core
    }

    /// Create the state of a root node with a fixed tag.
    #[must_use]
    pub fn with_tag(tag: &str) -> Self {
        let mut core = Self::new();
        core.tag = QualifiedTag::new(tag);
        core
    }

    /// Handle `tag` with a sub-node of `kind`, folded through the parent's
    /// generic append.
    pub fn register_handler(&mut self, tag: &str, kind: NodeKind) {
        self.handlers.insert(tag.to_string(), kind);
    }

    /// Handle `tag` with a sub-node of `kind`, folded through the parent
    /// descriptor's adder `add_method`.
    pub fn register_handler_with(&mut self, tag: &str, kind: NodeKind, add_method: &'static str) {
        self.handlers.insert(tag.to_string(), kind);
        self.add_methods.insert(tag.to_string(), add_method);
    }

    /// Kind handling `qname`.
    #[must_use]
    pub fn handler(&self, qname: &str) -> Option<NodeKind> {
        self.handlers.get(qname).copied()
    }

    /// Adder receiving descriptors of `qname` sub-nodes.
    #[must_use]
    pub fn add_method(&self, qname: &str) -> Option<&'static str> {
        self.add_methods.get(qname).copied()
    }
}

impl Default for NodeCore {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for element nodes.
///
/// Implementors supply [`XmlNode::kind`], access to their [`NodeCore`] and
/// override the hooks they need; the parsing protocol itself is provided.
pub trait XmlNode: Send {
    /// Kind of this node.
    fn kind(&self) -> NodeKind;

    /// Shared node state.
    fn core(&self) -> &NodeCore;

    /// Mutable shared node state.
    fn core_mut(&mut self) -> &mut NodeCore;

    /// Create the descriptor this node fills. Pass-through nodes return
    /// `None`.
    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        None
    }

    /// Leaf tag to setter mapping.
    fn dispatch_table(&self) -> &DispatchTable {
        DispatchTable::empty()
    }

    /// Offer an attribute of the node's own element to the node.
    ///
    /// Returns `true` if consumed; declined attributes are routed through
    /// [`XmlNode::set_element_value`].
    fn set_attribute_value(
        &mut self,
        _element: &QualifiedTag,
        attribute: &QualifiedTag,
        _value: &str,
    ) -> bool {
        attribute.is(tags::ID)
    }

    /// Hook run once the node's own element has closed.
    fn post_parsing(&mut self) {}

    /// Generic append of a completed descriptor with no dedicated adder;
    /// `tag` is the element the descriptor was parsed from.
    ///
    /// The default accepts localized descriptions into the node's own
    /// descriptor and hands everything else back for the enclosing node.
    fn append_descriptor(
        &mut self,
        _tag: &QualifiedTag,
        descriptor: Box<dyn Descriptor>,
    ) -> std::result::Result<(), Box<dyn Descriptor>> {
        let Some(text) = descriptor.downcast_ref::<LocalizedText>() else {
            return Err(descriptor);
        };
        match self.descriptor_mut() {
            Some(own) => {
                own.info_mut()
                    .set_localized_description(&text.lang, text.text.as_str());
                Ok(())
            }
            None => Err(descriptor),
        }
    }

    /// Document type of documents rooted at this node.
    fn doc_type(&self) -> Option<DocType> {
        None
    }

    /// Whether documents rooted at this node record sub-tag mappings.
    fn is_runtime_root(&self) -> bool {
        false
    }

    /// Register the document type of this root as `public id -> system id`.
    fn register_bundles(&self, bundles: &mut BTreeMap<String, String>) {
        if let Some(doc_type) = self.doc_type() {
            bundles.insert(
                doc_type.public_id.to_string(),
                doc_type.system_id.to_string(),
            );
        }
    }

    /// Write `descriptor` as an element named `name` under `parent`.
    ///
    /// # Errors
    /// Returns `WrongDescriptor` if the descriptor is not of the node's type.
    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        _descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        Ok(out.tree.create_element(parent, name))
    }

    /// Write every descriptor this node kind owns inside `parent_descriptor`
    /// as `name` elements.
    ///
    /// # Errors
    /// Propagates descriptor write failures.
    fn write_descriptors(
        &self,
        _out: &mut WriteContext<'_>,
        _parent: NodeId,
        _name: &str,
        _parent_descriptor: &dyn Descriptor,
    ) -> Result<()> {
        Ok(())
    }

    /// Descriptors kept by `descriptor` for the extension element `tag`.
    fn extension_descriptors<'d>(
        &self,
        _descriptor: &'d dyn Descriptor,
        _tag: &str,
    ) -> Vec<&'d (dyn Descriptor + 'static)> {
        Vec::new()
    }

    /// Write the simple text value `name` of `descriptor`.
    ///
    /// # Errors
    /// Returns `WrongDescriptor` if the descriptor is not of the node's type.
    fn write_simple_text_descriptor(
        &self,
        _out: &mut WriteContext<'_>,
        _parent: NodeId,
        _name: &str,
        _descriptor: &dyn Descriptor,
    ) -> Result<()> {
        Ok(())
    }

    /// The element this node handles.
    fn root_tag(&self) -> &QualifiedTag {
        &self.core().tag
    }

    /// Attach the node to the element it handles.
    fn set_root_tag(&mut self, tag: QualifiedTag) {
        self.core_mut().tag = tag;
    }

    /// The descriptor, if created.
    fn descriptor(&self) -> Option<&(dyn Descriptor + 'static)> {
        self.core().descriptor.as_deref()
    }

    /// Create the descriptor on first use. Never replaces an existing one.
    fn materialize_descriptor(&mut self) {
        if !self.core().materialized {
            let descriptor = self.create_descriptor();
            let core = self.core_mut();
            core.descriptor = descriptor;
            core.materialized = true;
        }
    }

    /// The descriptor, created on first use.
    fn descriptor_mut(&mut self) -> Option<&mut (dyn Descriptor + 'static)> {
        self.materialize_descriptor();
        self.core_mut().descriptor.as_deref_mut()
    }

    /// Give up the completed descriptor.
    fn take_descriptor(&mut self) -> Option<Box<dyn Descriptor>> {
        self.core_mut().descriptor.take()
    }

    /// Record a namespace declared on this node's element.
    fn add_prefix_mapping(&mut self, prefix: &str, uri: &str) {
        if let Some(descriptor) = self.descriptor_mut() {
            descriptor.info_mut().add_prefix_mapping(prefix, uri);
        }
    }

    /// XPath-like location of this node below `parent_path`.
    fn xml_path(&self, parent_path: Option<&str>) -> String {
        match parent_path {
            Some(parent) => format!("{parent}/{}", self.root_tag()),
            None => self.root_tag().qname(),
        }
    }

    /// Receive the start of an element.
    ///
    /// Only the node's own element is processed: each attribute is expanded
    /// and offered to [`XmlNode::set_attribute_value`], falling back to
    /// [`XmlNode::set_element_value`].
    ///
    /// # Errors
    /// Propagates structural errors of [`XmlNode::set_element_value`].
    fn start_element(
        &mut self,
        tag: &QualifiedTag,
        attributes: &[XmlAttribute],
        context: &mut ParseContext<'_>,
    ) -> Result<()> {
        if tag != self.root_tag() {
            return Ok(());
        }
        for attribute in attributes {
            let value = context.expand(&attribute.value);
            if self.set_attribute_value(tag, &attribute.name, &value) {
                continue;
            }
            tracing::debug!(element = %tag, attribute = %attribute.name, "Routing attribute as element value");
            self.set_element_value(&attribute.name, &value, context)?;
        }
        Ok(())
    }

    /// Decide whether `tag` is a plain value of this node (`true`) or
    /// handled by a sub-node (`false`).
    ///
    /// Dynamically resolved handlers are registered on this node. Under a
    /// runtime root every decision is recorded in the mapping registry.
    fn handles_element(&mut self, tag: &QualifiedTag, context: &mut ParseContext<'_>) -> bool {
        let qname = tag.qname();
        if let Some(kind) = self.core().handler(&qname) {
            context.record_mapping(self.root_tag(), tag, kind);
            return false;
        }
        if let Some(kind) = context.extensions.resolve(&qname) {
            tracing::debug!(tag = %tag, kind = kind.name(), "Resolved extension handler");
            self.core_mut().register_handler(&qname, kind);
            context.record_mapping(self.root_tag(), tag, kind);
            return false;
        }
        context.record_mapping(self.root_tag(), tag, self.kind());
        true
    }

    /// Create the sub-node handling `tag`.
    ///
    /// The new node is attached to `tag` and its descriptor created. Returns
    /// `None`, after logging, if no kind is registered or creation fails.
    fn handler_for(
        &self,
        tag: &QualifiedTag,
        context: &mut ParseContext<'_>,
    ) -> Option<Box<dyn XmlNode>> {
        let Some(kind) = self.core().handler(&tag.qname()) else {
            tracing::warn!(tag = %tag, node = %self.root_tag(), "No handler registered");
            context.report(Diagnostic::HandlerUnavailable {
                tag: tag.qname(),
                reason: format!("no handler registered in <{}>", self.root_tag()),
            });
            return None;
        };

        match kind.instantiate() {
            Ok(mut node) => {
                node.set_root_tag(tag.clone());
                node.materialize_descriptor();
                Some(node)
            }
            Err(err) => {
                tracing::warn!(error = %err, tag = %tag, kind = kind.name(), "Cannot create handler");
                context.report(Diagnostic::HandlerUnavailable {
                    tag: tag.qname(),
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    /// Store a leaf value through the dispatch table.
    ///
    /// Unmapped tags and recoverable mapping failures are logged and
    /// recorded; the value is dropped.
    ///
    /// # Errors
    /// - `DescriptorUnavailable` if the node has no descriptor
    /// - `Mapping` if the operation is missing or failed non-recoverably
    fn set_element_value(
        &mut self,
        tag: &QualifiedTag,
        value: &str,
        context: &mut ParseContext<'_>,
    ) -> Result<()> {
        let qname = tag.qname();
        let operation = self.dispatch_table().get(&qname);
        let node = self.root_tag().qname();

        let Some(descriptor) = self.descriptor_mut() else {
            return Err(DescriptorError::DescriptorUnavailable { node, tag: qname });
        };

        let Some(operation) = operation else {
            tracing::warn!(tag = %qname, node = %node, value, "Deprecated element ignored");
            context.report(Diagnostic::UnmappedElement {
                node,
                tag: qname,
                value: value.to_string(),
            });
            return Ok(());
        };

        match resolve_and_invoke(descriptor, operation, value) {
            Ok(kind) => {
                tracing::trace!(tag = %qname, operation, %kind, "Value set");
                Ok(())
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(error = %err, tag = %qname, "Invalid value ignored");
                context.report(Diagnostic::InvalidValue {
                    tag: qname,
                    value: value.to_string(),
                    reason: err.to_string(),
                });
                Ok(())
            }
            Err(source) => Err(DescriptorError::Mapping {
                tag: qname,
                value: value.to_string(),
                source,
            }),
        }
    }

    /// Receive the end of an element; `true` when the node's own element
    /// closed, after running [`XmlNode::post_parsing`].
    fn end_element(&mut self, tag: &QualifiedTag) -> bool {
        if tag != self.root_tag() {
            return false;
        }
        self.post_parsing();
        true
    }
}

/// Borrow `descriptor` as the type a node writes, or fail with
/// `WrongDescriptor`.
///
/// # Errors
/// Returns `WrongDescriptor` naming `node` on a type mismatch.
pub fn descriptor_as<'a, T: Descriptor>(descriptor: &'a dyn Descriptor, node: &str) -> Result<&'a T> {
    descriptor
        .downcast_ref::<T>()
        .ok_or_else(|| DescriptorError::WrongDescriptor {
            node: node.to_string(),
            found: descriptor.type_name().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::NoExpansion;
    use crate::model::EnvironmentProperty;
    use crate::node::handlers::EnvEntryNode;
    use crate::node::registry::{ExtensionRegistry, NodeMappingRegistry};

    fn attached_env_entry() -> Box<dyn XmlNode> {
        let mut node = EnvEntryNode::KIND.instantiate().unwrap();
        node.set_root_tag(QualifiedTag::new(tags::ENV_ENTRY));
        node.materialize_descriptor();
        node
    }

    fn env(node: &dyn XmlNode) -> &EnvironmentProperty {
        node.descriptor()
            .and_then(|d| d.downcast_ref::<EnvironmentProperty>())
            .unwrap()
    }

    #[test]
    fn test_set_element_value_dispatches() {
        let extensions = ExtensionRegistry::default();
        let mut context = ParseContext::new(&extensions, &NoExpansion);
        let mut node = attached_env_entry();

        node.set_element_value(&QualifiedTag::new(tags::ENV_ENTRY_NAME), "greeting", &mut context)
            .unwrap();
        assert_eq!(env(node.as_ref()).name, "greeting");
        assert!(context.diagnostics.is_empty());
    }

    #[test]
    fn test_unmapped_value_is_warning() {
        let extensions = ExtensionRegistry::default();
        let mut context = ParseContext::new(&extensions, &NoExpansion);
        let mut node = attached_env_entry();

        node.set_element_value(&QualifiedTag::new("color"), "blue", &mut context)
            .unwrap();
        assert_eq!(
            context.diagnostics,
            vec![Diagnostic::UnmappedElement {
                node: "env-entry".to_string(),
                tag: "color".to_string(),
                value: "blue".to_string(),
            }]
        );
    }

    #[test]
    fn test_attributes_only_for_own_element() {
        let extensions = ExtensionRegistry::default();
        let mut context = ParseContext::new(&extensions, &NoExpansion);
        let mut node = attached_env_entry();
        let attributes = [XmlAttribute::new("id", "e1"), XmlAttribute::new("lookup-name", "java:app/x")];

        node.start_element(&QualifiedTag::new("other"), &attributes, &mut context)
            .unwrap();
        assert!(env(node.as_ref()).lookup_name.is_none());

        node.start_element(&QualifiedTag::new(tags::ENV_ENTRY), &attributes, &mut context)
            .unwrap();
        assert_eq!(
            env(node.as_ref()).lookup_name.as_ref().map(|n| n.as_str()),
            Some("java:app/x")
        );
        assert!(context.diagnostics.is_empty());
    }

    #[test]
    fn test_handles_element_records_mappings() {
        let extensions = ExtensionRegistry::default();
        let mappings = NodeMappingRegistry::new();
        let mut context = ParseContext::new(&extensions, &NoExpansion).with_mappings(&mappings);
        let mut node = attached_env_entry();

        assert!(node.handles_element(&QualifiedTag::new(tags::ENV_ENTRY_NAME), &mut context));
        assert!(!node.handles_element(&QualifiedTag::new(tags::DESCRIPTION), &mut context));
        assert_eq!(
            mappings.mappings(tags::ENV_ENTRY),
            vec![
                (tags::ENV_ENTRY_NAME.to_string(), EnvEntryNode::KIND),
                (tags::DESCRIPTION.to_string(), LocalizedInfoNode::KIND),
            ]
        );
    }

    #[test]
    fn test_handler_for_unknown_tag() {
        let extensions = ExtensionRegistry::default();
        let mut context = ParseContext::new(&extensions, &NoExpansion);
        let node = attached_env_entry();

        assert!(node.handler_for(&QualifiedTag::new("nothing"), &mut context).is_none());
        assert!(matches!(
            context.diagnostics[0],
            Diagnostic::HandlerUnavailable { .. }
        ));
    }

    #[test]
    fn test_end_element_and_xml_path() {
        let mut node = attached_env_entry();
        assert!(!node.end_element(&QualifiedTag::new(tags::ENV_ENTRY_NAME)));
        assert!(node.end_element(&QualifiedTag::new(tags::ENV_ENTRY)));
        assert_eq!(node.xml_path(Some("application")), "application/env-entry");
        assert_eq!(node.xml_path(None), "env-entry");
    }

    #[test]
    fn test_append_localized_description() {
        let mut node = attached_env_entry();
        let text = LocalizedText {
            lang: "fr".to_string(),
            text: "Bonjour".to_string(),
            ..LocalizedText::default()
        };
        let tag = QualifiedTag::new(tags::DESCRIPTION);
        assert!(node.append_descriptor(&tag, Box::new(text)).is_ok());
        assert_eq!(
            env(node.as_ref()).info.localized_description("fr"),
            Some("Bonjour")
        );

        let other = Box::new(EnvironmentProperty::default());
        assert!(node.append_descriptor(&tag, other).is_err());
    }
}
