//! Qualified element names and namespace scopes.

use std::fmt;

use crate::config::XML_NAMESPACE;

/// Immutable identifier of one element or attribute: local name plus an
/// optional prefix.
///
/// # Examples
/// ```
/// use descriptor_mapper::xml::QualifiedTag;
///
/// let tag = QualifiedTag::new("ns1:foo");
/// assert_eq!(tag.prefix(), "ns1");
/// assert_eq!(tag.local_name(), "foo");
/// assert_eq!(tag.qname(), "ns1:foo");
///
/// let plain = QualifiedTag::new("foo");
/// assert_eq!(plain.prefix(), "");
/// assert_eq!(plain.qname(), "foo");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QualifiedTag {
    prefix: Option<String>,
    local_name: String,
}

impl QualifiedTag {
    /// Parse a qualified name as written in a document.
    #[must_use]
    pub fn new(qname: &str) -> Self {
        let prefix = prefix_from_qname(qname);
        Self {
            local_name: local_part_from_qname(qname).to_string(),
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
        }
    }

    /// Create a tag from separate parts. An empty prefix means none.
    #[must_use]
    pub fn with_prefix(prefix: &str, local_name: &str) -> Self {
        Self {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            local_name: local_name.to_string(),
        }
    }

    /// The local part of the name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The prefix, or an empty string when unprefixed.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }

    /// The name as written: `prefix:local` or `local`.
    #[must_use]
    pub fn qname(&self) -> String {
        compose_qname(self.prefix(), &self.local_name)
    }

    /// Check whether this tag names `qname` exactly.
    #[must_use]
    pub fn is(&self, qname: &str) -> bool {
        match &self.prefix {
            Some(prefix) => qname
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|local| local == self.local_name),
            None => qname == self.local_name,
        }
    }

    /// Resolve the namespace URI of this tag in `scope`.
    ///
    /// Unresolved prefixes resolve to the empty default namespace.
    #[must_use]
    pub fn namespace_uri<'s>(&self, scope: &'s NamespaceScope) -> &'s str {
        scope.resolve(self.prefix())
    }
}

impl fmt::Display for QualifiedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

impl From<&str> for QualifiedTag {
    fn from(qname: &str) -> Self {
        Self::new(qname)
    }
}

/// Stack of namespace declarations inherited from ancestor elements.
///
/// Lookups walk from the innermost frame outwards, so the nearest
/// declaration of a prefix wins.
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an element declaring `declarations` as `(prefix, uri)` pairs.
    pub fn push(&mut self, declarations: &[(String, String)]) {
        self.frames.push(declarations.to_vec());
    }

    /// Leave the innermost element.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Resolve `prefix` (empty for the default namespace) to a URI.
    #[must_use]
    pub fn resolve(&self, prefix: &str) -> &str {
        if prefix == "xml" {
            return XML_NAMESPACE;
        }
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(declared, _)| declared == prefix)
            .map_or("", |(_, uri)| uri.as_str())
    }

    /// Number of open element frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Split a qualified name into exactly two non-empty parts, if it has them.
fn split_qname(qname: &str) -> Option<(&str, &str)> {
    let mut parts = qname.split(':').filter(|part| !part.is_empty());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(prefix), Some(local), None) => Some((prefix, local)),
        _ => None,
    }
}

/// Prefix of a `prefix:local` value, or an empty string.
///
/// # Examples
/// ```
/// use descriptor_mapper::xml::prefix_from_qname;
///
/// assert_eq!(prefix_from_qname("ns1:foo"), "ns1");
/// assert_eq!(prefix_from_qname("foo"), "");
/// ```
#[must_use]
pub fn prefix_from_qname(qname: &str) -> &str {
    split_qname(qname).map_or("", |(prefix, _)| prefix)
}

/// Local part of a `prefix:local` value; the whole value if it is not a
/// two-part name.
#[must_use]
pub fn local_part_from_qname(qname: &str) -> &str {
    split_qname(qname).map_or(qname, |(_, local)| local)
}

/// Join a prefix and a local part; an empty prefix yields the local part.
#[must_use]
pub fn compose_qname(prefix: &str, local_part: &str) -> String {
    if prefix.is_empty() {
        local_part.to_string()
    } else {
        format!("{prefix}:{local_part}")
    }
}
