//! Types shared by nodes, registries and the parse engine.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use super::handler::XmlNode;
use super::registry::{ExtensionRegistry, NodeMappingRegistry};
use crate::error::Result;
use crate::expand::ValueExpander;
use crate::xml::{NamespaceScope, QualifiedTag};

/// Constructor of a node kind.
pub type NodeConstructor = fn() -> Result<Box<dyn XmlNode>>;

/// A handler type: a stable name plus a constructor.
///
/// Kinds are plain values, so registries store kinds and create fresh nodes
/// on demand; no node instance is ever shared between documents.
#[derive(Clone, Copy)]
pub struct NodeKind {
    name: &'static str,
    create: NodeConstructor,
}

impl NodeKind {
    /// Declare a node kind.
    #[must_use]
    pub const fn new(name: &'static str, create: NodeConstructor) -> Self {
        Self { name, create }
    }

    /// Stable kind name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Create a fresh node of this kind.
    ///
    /// # Errors
    /// Propagates the constructor's failure.
    pub fn instantiate(&self) -> Result<Box<dyn XmlNode>> {
        (self.create)()
    }
}

impl PartialEq for NodeKind {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for NodeKind {}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeKind").field(&self.name).finish()
    }
}

/// Mapping from leaf tag (or attribute) name to the setter operation that
/// receives its value.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: HashMap<&'static str, &'static str>,
}

static EMPTY_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(DispatchTable::new);

impl DispatchTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared empty table.
    #[must_use]
    pub fn empty() -> &'static DispatchTable {
        &EMPTY_DISPATCH
    }

    /// Map `tag` to `operation`.
    #[must_use]
    pub fn map(mut self, tag: &'static str, operation: &'static str) -> Self {
        self.entries.insert(tag, operation);
        self
    }

    /// Operation receiving values of `qname`.
    #[must_use]
    pub fn get(&self, qname: &str) -> Option<&'static str> {
        self.entries.get(qname).copied()
    }

    /// Number of mapped tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no tag is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Non-fatal problem recorded while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A value arrived for a tag the node does not map.
    UnmappedElement {
        node: String,
        tag: String,
        value: String,
    },
    /// A mapped value was rejected and dropped.
    InvalidValue {
        tag: String,
        value: String,
        reason: String,
    },
    /// A completed child could not be added to its parent.
    AddFailed {
        parent: String,
        child: String,
        reason: String,
    },
    /// No handler could be created for a tag; its subtree was skipped.
    HandlerUnavailable { tag: String, reason: String },
    /// A structural error discarded a subtree.
    SubtreeDropped { tag: String, reason: String },
}

impl Diagnostic {
    /// Check whether the diagnostic reports lost data rather than ignored
    /// input.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::AddFailed { .. } | Self::SubtreeDropped { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappedElement { node, tag, value } => {
                write!(f, "deprecated element <{tag}> = '{value}' in <{node}> ignored")
            }
            Self::InvalidValue { tag, value, reason } => {
                write!(f, "invalid value '{value}' for <{tag}>: {reason}")
            }
            Self::AddFailed {
                parent,
                child,
                reason,
            } => write!(f, "cannot add <{child}> to <{parent}>: {reason}"),
            Self::HandlerUnavailable { tag, reason } => {
                write!(f, "no handler for <{tag}>: {reason}")
            }
            Self::SubtreeDropped { tag, reason } => write!(f, "dropped <{tag}>: {reason}"),
        }
    }
}

/// Context passed through parsing operations.
pub struct ParseContext<'a> {
    /// Dynamic handler lookup.
    pub extensions: &'a ExtensionRegistry,

    /// Registry recording discovered sub-tags; set for runtime roots only.
    pub mappings: Option<&'a NodeMappingRegistry>,

    /// Expansion applied to attribute and text values.
    pub expander: &'a dyn ValueExpander,

    /// Namespace declarations of the open elements.
    pub scope: NamespaceScope,

    /// Problems recorded so far.
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context.
    #[must_use]
    pub fn new(extensions: &'a ExtensionRegistry, expander: &'a dyn ValueExpander) -> Self {
        Self {
            extensions,
            mappings: None,
            expander,
            scope: NamespaceScope::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Set the node mapping registry.
    #[must_use]
    pub fn with_mappings(mut self, mappings: &'a NodeMappingRegistry) -> Self {
        self.mappings = Some(mappings);
        self
    }

    /// Expand a raw value.
    #[must_use]
    pub fn expand(&self, value: &str) -> String {
        self.expander.expand(value)
    }

    /// Record `(parent, child) -> kind` when mappings are being collected.
    pub fn record_mapping(&self, parent: &QualifiedTag, child: &QualifiedTag, kind: NodeKind) {
        if let Some(mappings) = self.mappings {
            mappings.record(&parent.qname(), &child.qname(), kind);
        }
    }

    /// Record a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl fmt::Debug for ParseContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseContext")
            .field("collects_mappings", &self.mappings.is_some())
            .field("scope_depth", &self.scope.depth())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::handlers::LocalizedInfoNode;

    #[test]
    fn test_dispatch_table() {
        let table = DispatchTable::new()
            .map("env-entry-name", "set_name")
            .map("xml:lang", "set_lang");
        assert_eq!(table.get("env-entry-name"), Some("set_name"));
        assert_eq!(table.get("xml:lang"), Some("set_lang"));
        assert_eq!(table.get("lang"), None);
        assert_eq!(table.len(), 2);
        assert!(DispatchTable::empty().is_empty());
    }

    #[test]
    fn test_node_kind_identity() {
        let kind = LocalizedInfoNode::KIND;
        assert_eq!(kind, LocalizedInfoNode::KIND);
        assert_eq!(kind.name(), "LocalizedInfoNode");
        let node = kind.instantiate().unwrap();
        assert_eq!(node.kind(), kind);
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::UnmappedElement {
            node: "env-entry".to_string(),
            tag: "color".to_string(),
            value: "blue".to_string(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "deprecated element <color> = 'blue' in <env-entry> ignored"
        );
        assert!(!diagnostic.is_error());
    }
}
