//! Descriptor Mapper - Map XML deployment descriptors onto typed descriptor
//! graphs and back.
//!
//! Documents are read as a stream of element notifications. Each element is
//! handled by a node that owns the descriptor built for it, routes leaf
//! values to named descriptor operations and hands completed descriptors to
//! its parent. Writing walks the descriptor graph and renders an XML tree.
//!
//! # Example
//!
//! ```
//! use descriptor_mapper::document::{read_application, write_application, DescriptorContext};
//!
//! let ctx = DescriptorContext::default();
//! let xml = r#"<application xmlns="https://jakarta.ee/xml/ns/jakartaee" version="10">
//!   <display-name>Shop</display-name>
//!   <module><ejb>orders.jar</ejb></module>
//! </application>"#;
//!
//! let (application, diagnostics) = read_application(xml, &ctx).unwrap();
//! assert!(diagnostics.is_empty());
//! assert_eq!(application.modules[0].uri, "orders.jar");
//!
//! let written = write_application(&application, &ctx).unwrap();
//! assert!(written.contains("<ejb>orders.jar</ejb>"));
//! ```
//!
//! # Architecture
//!
//! The mapper is organized into several modules:
//!
//! - [`config`]: Constants, parser configuration and validation
//! - [`error`]: Error types and Result alias
//! - [`tags`]: Element and attribute names
//! - [`xml`]: Qualified names, the streaming reader and the output tree
//! - [`expand`]: Placeholder expansion of raw values
//! - [`descriptor`]: Descriptor trait, operation tables and the setter resolver
//! - [`model`]: Descriptor types of the supported documents
//! - [`node`]: Nodes, registries, the parse engine and serializer helpers
//! - [`document`]: Read and write entry points
//! - [`yaml`]: YAML dumps
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod expand;
pub mod model;
pub mod node;
pub mod tags;
pub mod xml;
pub mod yaml;

// Re-export commonly used items
pub use document::{
    read_application, read_application_runtime, read_document, write_application,
    write_application_runtime, write_document, DescriptorContext, DocumentKind,
};
pub use error::{DescriptorError, Result};
pub use model::{Application, ApplicationRuntime};
pub use node::{Diagnostic, ParsedDocument};
