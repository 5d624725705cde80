//! Output document tree and its rendering with `quick-xml`.

use std::io::{self, Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;

/// Handle to a node of an [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Public and system identifiers of a document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocType {
    pub public_id: &'static str,
    pub system_id: &'static str,
}

#[derive(Debug, Clone)]
enum TreeNode {
    Document {
        children: Vec<NodeId>,
    },
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<NodeId>,
    },
    Text(String),
}

/// Append-only element tree built by the serializer.
///
/// # Examples
/// ```
/// use descriptor_mapper::xml::XmlTree;
///
/// let mut tree = XmlTree::new();
/// let root = tree.create_element(tree.document(), "application");
/// let name = tree.create_element(root, "display-name");
/// tree.append_text(name, "Shop");
///
/// let xml = tree.render(2).unwrap();
/// assert!(xml.contains("<display-name>Shop</display-name>"));
/// ```
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<TreeNode>,
    doc_type: Option<DocType>,
}

impl XmlTree {
    /// Create a tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::Document {
                children: Vec::new(),
            }],
            doc_type: None,
        }
    }

    /// The document node, parent of the root element.
    #[must_use]
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    /// Declare the document type written before the root element.
    pub fn set_doc_type(&mut self, doc_type: DocType) {
        self.doc_type = Some(doc_type);
    }

    /// The declared document type.
    #[must_use]
    pub fn doc_type(&self) -> Option<&DocType> {
        self.doc_type.as_ref()
    }

    /// Create an element as the last child of `parent`.
    pub fn create_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode::Element {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        });
        self.push_child(parent, id);
        id
    }

    /// Append a text node to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode::Text(text.to_string()));
        self.push_child(parent, id);
    }

    /// Set an attribute, replacing an existing one of the same name.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        if let Some(TreeNode::Element { attributes, .. }) = self.nodes.get_mut(element.0) {
            match attributes.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, current)) => *current = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Declare a namespace on `element`: `xmlns` for an empty prefix,
    /// `xmlns:prefix` otherwise.
    pub fn set_namespace(&mut self, element: NodeId, prefix: &str, uri: &str) {
        if prefix.is_empty() {
            self.set_attribute(element, "xmlns", uri);
        } else {
            self.set_attribute(element, &format!("xmlns:{prefix}"), uri);
        }
    }

    /// The root element, if one was created.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.document()).first().copied()
    }

    /// Element name of `id`.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id.0) {
            Some(TreeNode::Element { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Attribute value on element `id`.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.nodes.get(id.0) {
            Some(TreeNode::Element { attributes, .. }) => attributes
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Child nodes of `id` in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id.0) {
            Some(TreeNode::Document { children } | TreeNode::Element { children, .. }) => children,
            _ => &[],
        }
    }

    /// Child elements of `id` named `name`.
    #[must_use]
    pub fn child_elements<'a>(&'a self, id: NodeId, name: &'a str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.name(*child) == Some(name))
            .collect()
    }

    /// Concatenated text directly inside `id`.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|child| match self.nodes.get(child.0) {
                Some(TreeNode::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Render the tree as an indented document with an XML declaration.
    ///
    /// # Errors
    /// Returns `Io` if the writer fails.
    pub fn render(&self, indent: usize) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', indent);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        if let (Some(doc_type), Some(root)) = (&self.doc_type, self.root_element()) {
            let root_name = self.name(root).unwrap_or_default();
            let declaration = format!(
                "{root_name} PUBLIC \"{}\" \"{}\"",
                doc_type.public_id, doc_type.system_id
            );
            writer.write_event(Event::DocType(BytesText::from_escaped(declaration)))?;
        }

        for child in self.children(self.document()) {
            self.write_node(&mut writer, *child)?;
        }

        let bytes = writer.into_inner().into_inner();
        let mut xml = String::from_utf8(bytes)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        xml.push('\n');
        Ok(xml)
    }

    fn write_node<W: Write>(&self, writer: &mut Writer<W>, id: NodeId) -> io::Result<()> {
        match self.nodes.get(id.0) {
            Some(TreeNode::Element {
                name,
                attributes,
                children,
            }) => {
                let start = BytesStart::new(name.as_str()).with_attributes(
                    attributes
                        .iter()
                        .map(|(key, value)| (key.as_str(), value.as_str())),
                );
                if children.is_empty() {
                    return writer.write_event(Event::Empty(start));
                }
                writer.write_event(Event::Start(start))?;
                for child in children {
                    self.write_node(writer, *child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(name.as_str())))
            }
            Some(TreeNode::Text(text)) => writer.write_event(Event::Text(BytesText::new(text))),
            Some(TreeNode::Document { .. }) | None => Ok(()),
        }
    }

    fn push_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(TreeNode::Document { children } | TreeNode::Element { children, .. }) =
            self.nodes.get_mut(parent.0)
        {
            children.push(child);
        }
    }
}

impl Default for XmlTree {
    fn default() -> Self {
        Self::new()
    }
}
