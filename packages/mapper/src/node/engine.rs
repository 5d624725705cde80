//! Parse engine: drives nodes from a stream of element notifications.
//!
//! The engine keeps the open nodes on a frame stack. A start tag either
//! stays with the current node as a plain value or opens a sub-node; an end
//! tag delivers the collected text and, when a node's own element closes,
//! folds its descriptor into the nearest enclosing node that accepts it.
//!
//! Tags whose prefix is bound to the document's own namespace, or to the
//! namespace of the node receiving them, reach the nodes by local name.
//! Prefixed names survive only for foreign namespaces.

use super::handler::XmlNode;
use super::types::{Diagnostic, ParseContext};
use crate::config::StructuralErrorPolicy;
use crate::descriptor::{resolve_and_invoke_add, Descriptor};
use crate::error::{DescriptorError, Result};
use crate::xml::{stream_document, EventSink, QualifiedTag, XmlAttribute};

/// One open node.
struct Frame {
    node: Box<dyn XmlNode>,
    /// Namespace URI of the node's own element.
    namespace: String,
    /// Set when a structural error dropped this subtree.
    failed: bool,
}

impl Frame {
    fn new(node: Box<dyn XmlNode>, namespace: String) -> Self {
        Self {
            node,
            namespace,
            failed: false,
        }
    }
}

/// Result of parsing one document.
#[derive(Debug)]
pub struct ParsedDocument {
    /// The root descriptor.
    pub descriptor: Box<dyn Descriptor>,
    /// Non-fatal problems, in document order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedDocument {
    /// Check whether any diagnostic reports lost data.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Unwrap the root descriptor as `T`.
    ///
    /// # Errors
    /// Returns `WrongDescriptor` if the root descriptor is not a `T`.
    pub fn into_descriptor<T: Descriptor>(self) -> Result<(T, Vec<Diagnostic>)> {
        let found = self.descriptor.type_name();
        match self.descriptor.into_any().downcast::<T>() {
            Ok(descriptor) => Ok((*descriptor, self.diagnostics)),
            Err(_) => Err(DescriptorError::WrongDescriptor {
                node: std::any::type_name::<T>().to_string(),
                found: found.to_string(),
            }),
        }
    }
}

/// Event-driven parser for one document.
///
/// # Examples
/// ```
/// use descriptor_mapper::config::StructuralErrorPolicy;
/// use descriptor_mapper::expand::NoExpansion;
/// use descriptor_mapper::model::Application;
/// use descriptor_mapper::node::handlers::ApplicationNode;
/// use descriptor_mapper::node::{ExtensionRegistry, ParseContext, ParseEngine};
/// use descriptor_mapper::xml::parse_document;
///
/// let xml = "<application><display-name>Shop</display-name></application>";
/// let doc = parse_document(xml).unwrap();
/// let extensions = ExtensionRegistry::default();
/// let context = ParseContext::new(&extensions, &NoExpansion);
/// let engine = ParseEngine::new(Box::new(ApplicationNode::new()), context, StructuralErrorPolicy::Fail);
///
/// let (application, _) = engine.run(&doc).unwrap().into_descriptor::<Application>().unwrap();
/// assert_eq!(application.display_name.as_deref(), Some("Shop"));
/// ```
pub struct ParseEngine<'a> {
    root: Option<Box<dyn XmlNode>>,
    root_name: String,
    stack: Vec<Frame>,
    /// Tags of the open handled elements, as delivered to the nodes.
    open: Vec<QualifiedTag>,
    document_namespace: String,
    context: ParseContext<'a>,
    policy: StructuralErrorPolicy,
    /// Depth inside a subtree nobody handles; zero when not skipping.
    skipped_depth: usize,
    text: String,
    result: Option<Box<dyn Descriptor>>,
}

impl<'a> ParseEngine<'a> {
    /// Create an engine for a document rooted at `root`.
    #[must_use]
    pub fn new(
        root: Box<dyn XmlNode>,
        context: ParseContext<'a>,
        policy: StructuralErrorPolicy,
    ) -> Self {
        let root_name = root.root_tag().qname();
        Self {
            root: Some(root),
            root_name,
            stack: Vec::new(),
            open: Vec::new(),
            document_namespace: String::new(),
            context,
            policy,
            skipped_depth: 0,
            text: String::new(),
            result: None,
        }
    }

    /// Stream `doc` through the engine and finish.
    ///
    /// # Errors
    /// Returns the first structural error, or any error of [`Self::finish`].
    pub fn run(mut self, doc: &roxmltree::Document<'_>) -> Result<ParsedDocument> {
        stream_document(doc, &mut self)?;
        self.finish()
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.context.diagnostics
    }

    /// Complete the parse.
    ///
    /// # Errors
    /// - `Unbalanced` if elements are still open
    /// - `EmptyDocument` if the root produced no descriptor
    pub fn finish(self) -> Result<ParsedDocument> {
        if !self.stack.is_empty() || self.skipped_depth > 0 {
            return Err(DescriptorError::Unbalanced(format!(
                "{} element(s) still open",
                self.stack.len() + self.skipped_depth
            )));
        }
        let Some(descriptor) = self.result else {
            return Err(DescriptorError::EmptyDocument(self.root_name));
        };
        Ok(ParsedDocument {
            descriptor,
            diagnostics: self.context.diagnostics,
        })
    }

    fn start_root(
        &mut self,
        mut root: Box<dyn XmlNode>,
        tag: &QualifiedTag,
        attributes: &[XmlAttribute],
        namespaces: &[(String, String)],
    ) -> Result<()> {
        if tag.local_name() != root.root_tag().local_name() {
            return Err(DescriptorError::UnexpectedRoot {
                expected: root.root_tag().qname(),
                found: tag.qname(),
            });
        }
        tracing::debug!(root = %tag, kind = root.kind().name(), "Document started");
        self.context.scope.push(namespaces);
        self.document_namespace = tag.namespace_uri(&self.context.scope).to_string();
        let tag = &self.local_tag(tag, "");
        root.set_root_tag(tag.clone());
        root.materialize_descriptor();
        for (prefix, uri) in namespaces {
            root.add_prefix_mapping(prefix, uri);
        }
        let outcome = root.start_element(tag, attributes, &mut self.context);
        let namespace = self.document_namespace.clone();
        self.stack.push(Frame::new(root, namespace));
        self.open.push(tag.clone());
        self.structural(tag, outcome)
    }

    /// Drop the prefix of `tag` when it is bound to the document namespace
    /// or to `owner`, the namespace of the node receiving the tag.
    fn local_tag(&self, tag: &QualifiedTag, owner: &str) -> QualifiedTag {
        if tag.prefix().is_empty() {
            return tag.clone();
        }
        let uri = tag.namespace_uri(&self.context.scope);
        if !uri.is_empty() && (uri == self.document_namespace || uri == owner) {
            QualifiedTag::new(tag.local_name())
        } else {
            tag.clone()
        }
    }

    /// Apply the structural error policy to `outcome`.
    ///
    /// Errors in the root frame always propagate.
    fn structural(&mut self, tag: &QualifiedTag, outcome: Result<()>) -> Result<()> {
        let Err(err) = outcome else {
            return Ok(());
        };
        if self.policy == StructuralErrorPolicy::Fail || self.stack.len() <= 1 {
            return Err(err);
        }
        let Some(frame) = self.stack.last_mut() else {
            return Err(err);
        };
        let node = frame.node.root_tag().qname();
        tracing::warn!(error = %err, tag = %tag, node = %node, "Dropping subtree after structural error");
        frame.failed = true;
        self.context.report(Diagnostic::SubtreeDropped {
            tag: node,
            reason: err.to_string(),
        });
        Ok(())
    }

    /// Fold the node whose element `tag` just closed.
    fn fold(&mut self, tag: &QualifiedTag) -> Result<()> {
        let Some(mut frame) = self.stack.pop() else {
            return Ok(());
        };
        let descriptor = frame.node.take_descriptor();
        if frame.failed {
            tracing::debug!(tag = %tag, "Failed subtree discarded");
            return Ok(());
        }
        if self.stack.is_empty() {
            self.result = descriptor;
            return Ok(());
        }
        match descriptor {
            Some(descriptor) => self.place(tag, descriptor),
            None => Ok(()),
        }
    }

    /// Hand a completed descriptor to the enclosing nodes.
    ///
    /// The direct parent receives it through its adder for `tag`, if it
    /// registered one and owns a descriptor. Otherwise each enclosing node,
    /// descriptor-less grouping nodes included, is offered the descriptor
    /// in turn through its generic append.
    fn place(&mut self, tag: &QualifiedTag, descriptor: Box<dyn Descriptor>) -> Result<()> {
        let child = tag.qname();
        let type_name = descriptor.type_name();
        let mut pending = descriptor;
        let mut nearest = true;
        let mut parent_name = String::new();

        for frame in self.stack.iter_mut().rev() {
            if nearest {
                nearest = false;
                parent_name = frame.node.root_tag().qname();
                if let Some(operation) = frame.node.core().add_method(&child) {
                    if let Some(target) = frame.node.descriptor_mut() {
                        if let Err(err) = resolve_and_invoke_add(target, operation, pending) {
                            tracing::error!(error = %err, parent = %parent_name, child = %child, "Add operation failed");
                            self.context.report(Diagnostic::AddFailed {
                                parent: parent_name,
                                child,
                                reason: err.to_string(),
                            });
                        }
                        return Ok(());
                    }
                }
            }
            match frame.node.append_descriptor(tag, pending) {
                Ok(()) => return Ok(()),
                Err(rejected) => pending = rejected,
            }
        }

        let err = DescriptorError::UnplacedDescriptor {
            descriptor: type_name.to_string(),
            node: parent_name,
        };
        match self.policy {
            StructuralErrorPolicy::Fail => Err(err),
            StructuralErrorPolicy::DropSubtree => {
                tracing::warn!(error = %err, tag = %tag, "Descriptor dropped");
                self.context.report(Diagnostic::SubtreeDropped {
                    tag: child,
                    reason: err.to_string(),
                });
                Ok(())
            }
        }
    }
}

impl EventSink for ParseEngine<'_> {
    fn start_element(
        &mut self,
        tag: &QualifiedTag,
        attributes: &[XmlAttribute],
        namespaces: &[(String, String)],
    ) -> Result<()> {
        if self.skipped_depth > 0 {
            self.skipped_depth += 1;
            return Ok(());
        }
        self.text.clear();

        if let Some(root) = self.root.take() {
            return self.start_root(root, tag, attributes, namespaces);
        }
        let Some(owner) = self.stack.last().map(|top| top.namespace.clone()) else {
            return Err(DescriptorError::Unbalanced(format!(
                "<{tag}> outside the document root"
            )));
        };

        self.context.scope.push(namespaces);
        let namespace = tag.namespace_uri(&self.context.scope).to_string();
        let tag = &self.local_tag(tag, &owner);
        let Some(top) = self.stack.last_mut() else {
            return Ok(());
        };
        if top.node.handles_element(tag, &mut self.context) {
            self.open.push(tag.clone());
            let outcome = top.node.start_element(tag, attributes, &mut self.context);
            return self.structural(tag, outcome);
        }

        match top.node.handler_for(tag, &mut self.context) {
            Some(mut node) => {
                tracing::debug!(tag = %tag, kind = node.kind().name(), "Sub-node opened");
                for (prefix, uri) in namespaces {
                    node.add_prefix_mapping(prefix, uri);
                }
                let outcome = node.start_element(tag, attributes, &mut self.context);
                self.stack.push(Frame::new(node, namespace));
                self.open.push(tag.clone());
                self.structural(tag, outcome)
            }
            None => {
                self.context.scope.pop();
                self.skipped_depth = 1;
                Ok(())
            }
        }
    }

    fn characters(&mut self, text: &str) {
        if self.skipped_depth == 0 {
            self.text.push_str(text);
        }
    }

    fn end_element(&mut self, tag: &QualifiedTag) -> Result<()> {
        if self.skipped_depth > 0 {
            self.skipped_depth -= 1;
            return Ok(());
        }
        let text = std::mem::take(&mut self.text);
        let (Some(top), Some(tag)) = (self.stack.last_mut(), self.open.pop()) else {
            return Err(DescriptorError::Unbalanced(format!(
                "</{tag}> without an open element"
            )));
        };
        let tag = &tag;

        let value = text.trim();
        let outcome = if value.is_empty() {
            Ok(())
        } else {
            let value = self.context.expand(value);
            top.node.set_element_value(tag, &value, &mut self.context)
        };
        let closed = top.node.end_element(tag);
        self.context.scope.pop();
        self.structural(tag, outcome)?;

        if closed {
            self.fold(tag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::expand::NoExpansion;
    use crate::model::{Application, ApplicationRuntime, EnvironmentProperty};
    use crate::node::handler::NodeCore;
    use crate::node::handlers::{ApplicationNode, ApplicationRuntimeNode, SecurityRoleNode};
    use crate::node::registry::{ExtensionRegistry, StaticExtensions};
    use crate::node::types::{DispatchTable, NodeKind};
    use crate::xml::parse_document;
    use pretty_assertions::assert_eq;

    static SWATCH_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
        DispatchTable::new()
            .map("name", "set_name")
            .map("color", "set_color")
    });

    /// Maps `color` to an operation its descriptor does not have.
    #[derive(Debug, Default)]
    struct SwatchNode {
        core: NodeCore,
    }

    impl SwatchNode {
        const KIND: NodeKind = NodeKind::new("SwatchNode", || Ok(Box::new(SwatchNode::default())));
    }

    impl XmlNode for SwatchNode {
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
            &SWATCH_DISPATCH
        }
    }

    /// Groups children without owning a descriptor.
    #[derive(Debug)]
    struct ShelfNode {
        core: NodeCore,
    }

    impl ShelfNode {
        const KIND: NodeKind = NodeKind::new("ShelfNode", || Ok(Box::new(ShelfNode::new())));

        fn new() -> Self {
            let mut core = NodeCore::new();
            core.register_handler("security-role", SecurityRoleNode::KIND);
            Self { core }
        }
    }

    impl XmlNode for ShelfNode {
        fn kind(&self) -> NodeKind {
            Self::KIND
        }

        fn core(&self) -> &NodeCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut NodeCore {
            &mut self.core
        }
    }

    fn parse_with(
        root: Box<dyn XmlNode>,
        xml: &str,
        policy: StructuralErrorPolicy,
    ) -> Result<ParsedDocument> {
        let doc = parse_document(xml)?;
        let extensions = ExtensionRegistry::new(
            StaticExtensions::new()
                .register("swatch", SwatchNode::KIND)
                .register("ext:swatch", SwatchNode::KIND)
                .register("shelf", ShelfNode::KIND),
        );
        let context = ParseContext::new(&extensions, &NoExpansion);
        ParseEngine::new(root, context, policy).run(&doc)
    }

    fn parse_application(xml: &str, policy: StructuralErrorPolicy) -> Result<ParsedDocument> {
        parse_with(Box::new(ApplicationNode::new()), xml, policy)
    }

    #[test]
    fn test_nested_descriptors_folded_into_root() {
        let xml = r#"<application version="10">
            <description>Shop</description>
            <module><web><web-uri>shop.war</web-uri><context-root>/shop</context-root></web></module>
            <env-entry>
                <env-entry-name>greeting</env-entry-name>
                <env-entry-type>java.lang.String</env-entry-type>
                <env-entry-value>hello</env-entry-value>
            </env-entry>
        </application>"#;
        let parsed = parse_application(xml, StructuralErrorPolicy::Fail).unwrap();
        assert!(parsed.diagnostics.is_empty());

        let (application, _) = parsed.into_descriptor::<Application>().unwrap();
        assert_eq!(application.version.as_deref(), Some("10"));
        assert_eq!(application.info.description(), Some("Shop"));
        assert_eq!(application.modules[0].uri, "shop.war");
        assert_eq!(application.modules[0].context_root.as_deref(), Some("/shop"));
        assert_eq!(application.environment.env_entries[0].value.as_deref(), Some("hello"));
    }

    #[test]
    fn test_wrong_root_rejected() {
        let err = parse_application("<web-app/>", StructuralErrorPolicy::Fail).unwrap_err();
        assert!(matches!(err, DescriptorError::UnexpectedRoot { .. }));
    }

    #[test]
    fn test_unmapped_leaf_ignored() {
        let xml = r#"<glassfish-application><ext:color xmlns:ext="urn:ext">blue</ext:color><realm>file</realm></glassfish-application>"#;
        let parsed = parse_with(
            Box::new(ApplicationRuntimeNode::new()),
            xml,
            StructuralErrorPolicy::Fail,
        )
        .unwrap();
        let (runtime, diagnostics) = parsed.into_descriptor::<ApplicationRuntime>().unwrap();
        assert_eq!(runtime.realm.as_deref(), Some("file"));
        assert!(runtime.extensions.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnmappedElement {
                node: "glassfish-application".to_string(),
                tag: "ext:color".to_string(),
                value: "blue".to_string(),
            }]
        );
    }

    #[test]
    fn test_structural_error_policy() {
        let xml = "<application>
            <env-entry><env-entry-name>a</env-entry-name></env-entry>
            <swatch><color>red</color></swatch>
            <env-entry><env-entry-name>b</env-entry-name></env-entry>
        </application>";

        let err = parse_application(xml, StructuralErrorPolicy::Fail).unwrap_err();
        assert!(matches!(err, DescriptorError::Mapping { .. }));

        let parsed = parse_application(xml, StructuralErrorPolicy::DropSubtree).unwrap();
        assert!(parsed.has_errors());
        let (application, _) = parsed.into_descriptor::<Application>().unwrap();
        let names: Vec<_> = application
            .environment
            .env_entries
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_unplaced_descriptor() {
        let xml = "<application><swatch><name>x</name></swatch></application>";
        let err = parse_application(xml, StructuralErrorPolicy::Fail).unwrap_err();
        assert!(matches!(err, DescriptorError::UnplacedDescriptor { .. }));

        let parsed = parse_application(xml, StructuralErrorPolicy::DropSubtree).unwrap();
        assert!(matches!(
            parsed.diagnostics.as_slice(),
            [Diagnostic::SubtreeDropped { .. }]
        ));
    }

    #[test]
    fn test_grouping_node_without_descriptor() {
        let xml = "<application>
            <shelf>
                <description>Front shelf</description>
                <security-role><role-name>admin</role-name></security-role>
            </shelf>
        </application>";
        let parsed = parse_application(xml, StructuralErrorPolicy::DropSubtree).unwrap();
        assert!(matches!(
            parsed.diagnostics.as_slice(),
            [Diagnostic::SubtreeDropped { tag, .. }] if tag == "security-role"
        ));

        let (application, _) = parsed.into_descriptor::<Application>().unwrap();
        assert_eq!(application.info.description(), Some("Front shelf"));
        assert!(application.security_roles.is_empty());
    }

    #[test]
    fn test_extension_kept_only_by_its_own_parent() {
        let root_level = r#"<glassfish-application xmlns:ext="urn:ext">
            <ext:swatch><name>top</name></ext:swatch>
        </glassfish-application>"#;
        let parsed = parse_with(
            Box::new(ApplicationRuntimeNode::new()),
            root_level,
            StructuralErrorPolicy::Fail,
        )
        .unwrap();
        let (runtime, _) = parsed.into_descriptor::<ApplicationRuntime>().unwrap();
        assert_eq!(runtime.extensions_named("ext:swatch").count(), 1);

        let nested = r#"<glassfish-application xmlns:ext="urn:ext">
            <security-role-mapping>
                <role-name>admin</role-name>
                <ext:swatch><name>inner</name></ext:swatch>
            </security-role-mapping>
            <realm>file</realm>
        </glassfish-application>"#;
        let err = parse_with(
            Box::new(ApplicationRuntimeNode::new()),
            nested,
            StructuralErrorPolicy::Fail,
        )
        .unwrap_err();
        assert!(matches!(err, DescriptorError::UnplacedDescriptor { .. }));

        let parsed = parse_with(
            Box::new(ApplicationRuntimeNode::new()),
            nested,
            StructuralErrorPolicy::DropSubtree,
        )
        .unwrap();
        assert!(matches!(
            parsed.diagnostics.as_slice(),
            [Diagnostic::SubtreeDropped { tag, .. }] if tag == "ext:swatch"
        ));
        let (runtime, _) = parsed.into_descriptor::<ApplicationRuntime>().unwrap();
        assert!(runtime.extensions.is_empty());
        assert_eq!(runtime.security_role_mappings[0].role_name, "admin");
        assert_eq!(runtime.realm.as_deref(), Some("file"));
    }

    #[test]
    fn test_invalid_value_under_root_is_recoverable() {
        let xml = "<application><initialize-in-order>maybe</initialize-in-order></application>";
        let parsed = parse_application(xml, StructuralErrorPolicy::Fail).unwrap();
        assert!(matches!(parsed.diagnostics[0], Diagnostic::InvalidValue { .. }));
    }

    #[test]
    fn test_add_failure_keeps_parsing() {
        let xml = "<application>
            <security-role><role-name>admin</role-name></security-role>
            <security-role><role-name>admin</role-name></security-role>
            <display-name>Shop</display-name>
        </application>";
        let parsed = parse_application(xml, StructuralErrorPolicy::Fail).unwrap();
        assert!(matches!(parsed.diagnostics[0], Diagnostic::AddFailed { .. }));

        let (application, _) = parsed.into_descriptor::<Application>().unwrap();
        assert_eq!(application.security_roles.len(), 1);
        assert_eq!(application.display_name.as_deref(), Some("Shop"));
    }

    #[test]
    fn test_into_descriptor_wrong_type() {
        let parsed = parse_application("<application/>", StructuralErrorPolicy::Fail).unwrap();
        let err = parsed.into_descriptor::<ApplicationRuntime>().unwrap_err();
        assert!(matches!(err, DescriptorError::WrongDescriptor { .. }));
    }

    #[test]
    fn test_unbalanced_stream() {
        let extensions = ExtensionRegistry::default();
        let context = ParseContext::new(&extensions, &NoExpansion);
        let mut engine = ParseEngine::new(
            Box::new(ApplicationNode::new()),
            context,
            StructuralErrorPolicy::Fail,
        );
        engine
            .start_element(&QualifiedTag::new("application"), &[], &[])
            .unwrap();
        let err = engine.finish().unwrap_err();
        assert!(matches!(err, DescriptorError::Unbalanced(_)));
    }
}
