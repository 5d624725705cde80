//! Streaming adapter over `roxmltree`.
//!
//! `roxmltree` builds a read-only tree; the mapper consumes documents as a
//! stream of start/text/end notifications. This module walks the tree in
//! document order and replays it into an [`EventSink`], recovering the raw
//! prefixed names from source positions.

use roxmltree::{Document, Node, ParsingOptions};

use super::qname::QualifiedTag;
use crate::error::Result;

/// An attribute on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Attribute name as written.
    pub name: QualifiedTag,
    /// Unescaped value.
    pub value: String,
}

impl XmlAttribute {
    /// Create an attribute from a qualified name and value.
    #[must_use]
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualifiedTag::new(name),
            value: value.into(),
        }
    }
}

/// Receiver of document notifications.
pub trait EventSink {
    /// An element opened. `namespaces` holds the `(prefix, uri)` pairs the
    /// element itself declares; the default namespace has an empty prefix.
    fn start_element(
        &mut self,
        tag: &QualifiedTag,
        attributes: &[XmlAttribute],
        namespaces: &[(String, String)],
    ) -> Result<()>;

    /// Character data inside the current element.
    fn characters(&mut self, text: &str);

    /// An element closed.
    fn end_element(&mut self, tag: &QualifiedTag) -> Result<()>;
}

/// Parse markup, accepting a DOCTYPE declaration.
///
/// # Errors
/// Returns `XmlParse` for malformed input.
pub fn parse_document(xml: &str) -> Result<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Ok(Document::parse_with_options(xml, options)?)
}

/// Qualified name of the root element of `xml`.
///
/// # Errors
/// Returns `XmlParse` for malformed input.
///
/// # Examples
/// ```
/// use descriptor_mapper::xml::root_element_name;
///
/// let name = root_element_name(r#"<j:application xmlns:j="urn:j"/>"#).unwrap();
/// assert_eq!(name.qname(), "j:application");
/// ```
pub fn root_element_name(xml: &str) -> Result<QualifiedTag> {
    let doc = parse_document(xml)?;
    Ok(QualifiedTag::new(raw_element_name(doc.root_element())))
}

/// Replay a parsed document into `sink`.
///
/// # Errors
/// Propagates the first error returned by the sink.
pub fn stream_document(doc: &Document<'_>, sink: &mut dyn EventSink) -> Result<()> {
    walk(doc.root_element(), sink)
}

fn walk(node: Node<'_, '_>, sink: &mut dyn EventSink) -> Result<()> {
    let tag = QualifiedTag::new(raw_element_name(node));
    let attributes: Vec<XmlAttribute> = node
        .attributes()
        .map(|attr| XmlAttribute {
            name: QualifiedTag::new(&node.document().input_text()[attr.range_qname()]),
            value: attr.value().to_string(),
        })
        .collect();

    sink.start_element(&tag, &attributes, &declared_namespaces(node))?;

    for child in node.children() {
        if child.is_element() {
            walk(child, sink)?;
        } else if child.is_text() {
            if let Some(text) = child.text() {
                sink.characters(text);
            }
        }
    }

    sink.end_element(&tag)
}

/// Element name as written in the source, prefix included.
fn raw_element_name<'input>(node: Node<'_, 'input>) -> &'input str {
    let input = node.document().input_text();
    let start = node.range().start + 1;
    input
        .get(start..)
        .and_then(|rest| {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
                .unwrap_or(rest.len());
            rest.get(..end)
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| node.tag_name().name())
}

/// Namespaces declared on `node` itself rather than inherited.
fn declared_namespaces(node: Node<'_, '_>) -> Vec<(String, String)> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| (ns.name().unwrap_or("").to_string(), ns.uri().to_string()))
        .collect()
}
