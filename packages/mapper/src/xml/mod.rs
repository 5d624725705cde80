//! XML input and output: qualified names, the streaming reader and the
//! output tree.

mod qname;
mod reader;
mod tree;

pub use qname::{
    compose_qname, local_part_from_qname, prefix_from_qname, NamespaceScope, QualifiedTag,
};
pub use reader::{
    parse_document, root_element_name, stream_document, EventSink, XmlAttribute,
};
pub use tree::{DocType, NodeId, XmlTree};
