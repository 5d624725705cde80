//! Process-wide registries: dynamic handler lookup and discovered sub-tag
//! mappings.
//!
//! Both registries are shared by every document processed with the same
//! context and may be populated concurrently. Entries are inserted only if
//! absent, so concurrent discovery of the same tag is idempotent.

use std::collections::HashMap;
use std::fmt;

use dashmap::DashMap;

use super::types::NodeKind;

/// Pluggable source of handlers for tags unknown at compile time.
pub trait ExtensionLookup: Send + Sync {
    /// Node kind handling the element with qualified name `qname`.
    fn lookup(&self, qname: &str) -> Option<NodeKind>;
}

/// Lookup that knows no extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtensions;

impl ExtensionLookup for NoExtensions {
    fn lookup(&self, _qname: &str) -> Option<NodeKind> {
        None
    }
}

/// In-memory extension lookup.
///
/// # Examples
/// ```
/// use descriptor_mapper::node::{ExtensionLookup, StaticExtensions};
/// use descriptor_mapper::node::handlers::RuntimePropertyNode;
///
/// let extensions = StaticExtensions::new().register("ext:property", RuntimePropertyNode::KIND);
/// assert_eq!(extensions.lookup("ext:property"), Some(RuntimePropertyNode::KIND));
/// assert_eq!(extensions.lookup("property"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticExtensions {
    kinds: HashMap<String, NodeKind>,
}

impl StaticExtensions {
    /// Create an empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `kind` for `qname`.
    #[must_use]
    pub fn register(mut self, qname: impl Into<String>, kind: NodeKind) -> Self {
        self.kinds.insert(qname.into(), kind);
        self
    }
}

impl ExtensionLookup for StaticExtensions {
    fn lookup(&self, qname: &str) -> Option<NodeKind> {
        self.kinds.get(qname).copied()
    }
}

/// Memoizing front of an [`ExtensionLookup`].
pub struct ExtensionRegistry {
    lookup: Box<dyn ExtensionLookup>,
    cache: DashMap<String, Option<NodeKind>>,
}

impl ExtensionRegistry {
    /// Wrap a lookup service.
    #[must_use]
    pub fn new(lookup: impl ExtensionLookup + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            cache: DashMap::new(),
        }
    }

    /// Resolve `qname`, asking the lookup service at most once per name.
    pub fn resolve(&self, qname: &str) -> Option<NodeKind> {
        if let Some(cached) = self.cache.get(qname) {
            return *cached;
        }
        let resolved = self.lookup.lookup(qname);
        *self
            .cache
            .entry(qname.to_string())
            .or_insert(resolved)
    }

    /// Number of memoized names, negative answers included.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new(NoExtensions)
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// `parent tag -> ordered (child tag, kind)` mappings discovered while
/// parsing runtime documents.
///
/// The serializer replays them to write extension groups in the order they
/// were first seen.
#[derive(Debug, Default)]
pub struct NodeMappingRegistry {
    mappings: DashMap<String, Vec<(String, NodeKind)>>,
}

impl NodeMappingRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `child` under `parent` is handled by `kind`, unless a
    /// mapping for that child is already known.
    pub fn record(&self, parent: &str, child: &str, kind: NodeKind) {
        let mut children = self.mappings.entry(parent.to_string()).or_default();
        if !children.iter().any(|(known, _)| known == child) {
            tracing::debug!(parent, child, kind = kind.name(), "Recorded node mapping");
            children.push((child.to_string(), kind));
        }
    }

    /// Mappings recorded for `parent`, in discovery order.
    #[must_use]
    pub fn mappings(&self, parent: &str) -> Vec<(String, NodeKind)> {
        self.mappings
            .get(parent)
            .map(|children| children.clone())
            .unwrap_or_default()
    }

    /// Kind recorded for `child` under `parent`.
    #[must_use]
    pub fn kind_of(&self, parent: &str, child: &str) -> Option<NodeKind> {
        self.mappings.get(parent).and_then(|children| {
            children
                .iter()
                .find(|(known, _)| known == child)
                .map(|(_, kind)| *kind)
        })
    }

    /// Number of parents with recorded mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Check whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::handlers::{LocalizedInfoNode, RuntimePropertyNode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingLookup {
        calls: Arc<AtomicUsize>,
    }

    impl ExtensionLookup for CountingLookup {
        fn lookup(&self, qname: &str) -> Option<NodeKind> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (qname == "ext:property").then_some(RuntimePropertyNode::KIND)
        }
    }

    #[test]
    fn test_extension_registry_memoizes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = ExtensionRegistry::new(CountingLookup {
            calls: Arc::clone(&calls),
        });

        assert_eq!(registry.resolve("ext:property"), Some(RuntimePropertyNode::KIND));
        assert_eq!(registry.resolve("ext:property"), Some(RuntimePropertyNode::KIND));
        assert_eq!(registry.resolve("ext:other"), None);
        assert_eq!(registry.resolve("ext:other"), None);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(registry.cached(), 2);
    }

    #[test]
    fn test_mapping_registry_insert_if_absent() {
        let registry = NodeMappingRegistry::new();
        registry.record("root", "b", LocalizedInfoNode::KIND);
        registry.record("root", "a", RuntimePropertyNode::KIND);
        registry.record("root", "b", RuntimePropertyNode::KIND);

        let mappings = registry.mappings("root");
        assert_eq!(
            mappings,
            vec![
                ("b".to_string(), LocalizedInfoNode::KIND),
                ("a".to_string(), RuntimePropertyNode::KIND)
            ]
        );
        assert_eq!(registry.kind_of("root", "b"), Some(LocalizedInfoNode::KIND));
        assert!(registry.mappings("other").is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_discovery_is_idempotent() {
        let registry = NodeMappingRegistry::new();
        let extensions = ExtensionRegistry::new(
            StaticExtensions::new().register("ext:property", RuntimePropertyNode::KIND),
        );

        let kinds: Vec<Option<NodeKind>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        let kind = extensions.resolve("ext:property");
                        if let Some(kind) = kind {
                            registry.record("glassfish-application", "ext:property", kind);
                        }
                        kind
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(kinds.iter().all(|k| *k == Some(RuntimePropertyNode::KIND)));
        assert_eq!(registry.mappings("glassfish-application").len(), 1);
    }
}
