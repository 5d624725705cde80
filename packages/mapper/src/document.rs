//! Document entry points: read a descriptor document into a typed graph and
//! write a graph back out.
//!
//! Everything shared between documents lives in a [`DescriptorContext`]:
//! the extension registry, the sub-tag mappings recorded under runtime
//! roots, the value expander and the configuration. A context is `Sync`, so
//! independent documents may be processed concurrently against it.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::ParserConfig;
use crate::descriptor::Descriptor;
use crate::error::{DescriptorError, Result};
use crate::expand::{PropertyExpander, ValueExpander};
use crate::model::{Application, ApplicationRuntime};
use crate::node::handlers::{ApplicationNode, ApplicationRuntimeNode};
use crate::node::{
    Diagnostic, ExtensionRegistry, NodeMappingRegistry, ParseContext, ParseEngine,
    ParsedDocument, WriteContext, XmlNode,
};
use crate::tags;
use crate::xml::{parse_document, root_element_name};

/// State shared by every document read or written with it.
pub struct DescriptorContext {
    extensions: ExtensionRegistry,
    mappings: NodeMappingRegistry,
    expander: Box<dyn ValueExpander>,
    config: ParserConfig,
}

impl DescriptorContext {
    /// Create a context without extensions, expanding the configured
    /// properties.
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        Self {
            extensions: ExtensionRegistry::default(),
            mappings: NodeMappingRegistry::new(),
            expander: Box::new(PropertyExpander::from_config(&config)),
            config,
        }
    }

    /// Use `extensions` to resolve unknown tags.
    #[must_use]
    pub fn with_extensions(mut self, extensions: ExtensionRegistry) -> Self {
        self.extensions = extensions;
        self
    }

    /// Replace the value expander.
    #[must_use]
    pub fn with_expander(mut self, expander: impl ValueExpander + 'static) -> Self {
        self.expander = Box::new(expander);
        self
    }

    #[must_use]
    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    #[must_use]
    pub fn mappings(&self) -> &NodeMappingRegistry {
        &self.mappings
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl Default for DescriptorContext {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl std::fmt::Debug for DescriptorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorContext")
            .field("extensions", &self.extensions)
            .field("mappings", &self.mappings.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Document kinds with a root node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `application`
    Application,
    /// `glassfish-application`
    ApplicationRuntime,
}

impl DocumentKind {
    /// Every supported kind.
    pub const ALL: [DocumentKind; 2] = [Self::Application, Self::ApplicationRuntime];

    /// Choose the kind by the document's root element, ignoring its prefix.
    ///
    /// # Errors
    /// Returns `XmlParse` for malformed input and `UnknownDocument` for any
    /// other root.
    ///
    /// # Examples
    /// ```
    /// use descriptor_mapper::document::DocumentKind;
    ///
    /// let kind = DocumentKind::detect("<glassfish-application/>").unwrap();
    /// assert_eq!(kind, DocumentKind::ApplicationRuntime);
    /// assert!(DocumentKind::detect("<web-app/>").is_err());
    /// ```
    pub fn detect(xml: &str) -> Result<Self> {
        let root = root_element_name(xml)?;
        match root.local_name() {
            tags::APPLICATION => Ok(Self::Application),
            tags::GLASSFISH_APPLICATION => Ok(Self::ApplicationRuntime),
            _ => Err(DescriptorError::UnknownDocument(root.qname())),
        }
    }

    /// A fresh root node for this kind.
    #[must_use]
    pub fn root_node(&self) -> Box<dyn XmlNode> {
        match self {
            Self::Application => Box::new(ApplicationNode::new()),
            Self::ApplicationRuntime => Box::new(ApplicationRuntimeNode::new()),
        }
    }

    /// Root element name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Application => tags::APPLICATION,
            Self::ApplicationRuntime => tags::GLASSFISH_APPLICATION,
        }
    }
}

/// Document types of every root kind, as `public id -> system id`.
#[must_use]
pub fn register_bundles() -> BTreeMap<String, String> {
    let mut bundles = BTreeMap::new();
    for kind in DocumentKind::ALL {
        kind.root_node().register_bundles(&mut bundles);
    }
    bundles
}

/// Parse `xml` with `root` as the root node.
///
/// Sub-tag mappings are recorded only when `root` is a runtime root.
///
/// # Errors
/// Returns `XmlParse` for malformed input, otherwise the first structural
/// error the configured policy does not absorb.
pub fn read_document(
    xml: &str,
    root: Box<dyn XmlNode>,
    ctx: &DescriptorContext,
) -> Result<ParsedDocument> {
    let doc = parse_document(xml)?;
    let mut context = ParseContext::new(&ctx.extensions, ctx.expander.as_ref());
    if root.is_runtime_root() {
        context = context.with_mappings(&ctx.mappings);
    }
    ParseEngine::new(root, context, ctx.config.structural_errors).run(&doc)
}

/// Parse an `application` document.
///
/// # Errors
/// As [`read_document`].
pub fn read_application(
    xml: &str,
    ctx: &DescriptorContext,
) -> Result<(Application, Vec<Diagnostic>)> {
    read_document(xml, Box::new(ApplicationNode::new()), ctx)?.into_descriptor()
}

/// Parse a `glassfish-application` document.
///
/// # Errors
/// As [`read_document`].
pub fn read_application_runtime(
    xml: &str,
    ctx: &DescriptorContext,
) -> Result<(ApplicationRuntime, Vec<Diagnostic>)> {
    read_document(xml, Box::new(ApplicationRuntimeNode::new()), ctx)?.into_descriptor()
}

/// Serialize `descriptor` as a document rooted at `root`.
///
/// # Errors
/// Returns `WrongDescriptor` if a node meets a descriptor it cannot write,
/// or `Io` if rendering fails.
pub fn write_document(
    root: &dyn XmlNode,
    descriptor: &dyn Descriptor,
    ctx: &DescriptorContext,
) -> Result<String> {
    let mut out = WriteContext::new();
    if root.is_runtime_root() {
        out = out.with_mappings(&ctx.mappings);
    }
    if let Some(doc_type) = root.doc_type() {
        out.tree.set_doc_type(doc_type);
    }
    let document = out.tree.document();
    let name = root.root_tag().qname();
    root.write_descriptor(&mut out, document, &name, descriptor)?;
    out.into_tree().render(ctx.config.indent)
}

/// Serialize an `application` document.
///
/// # Errors
/// As [`write_document`].
pub fn write_application(application: &Application, ctx: &DescriptorContext) -> Result<String> {
    write_document(&ApplicationNode::new(), application, ctx)
}

/// Serialize a `glassfish-application` document.
///
/// # Errors
/// As [`write_document`].
pub fn write_application_runtime(
    runtime: &ApplicationRuntime,
    ctx: &DescriptorContext,
) -> Result<String> {
    write_document(&ApplicationRuntimeNode::new(), runtime, ctx)
}

/// Save a serialized document to `path`.
///
/// Writes to a temp file next to `path`, syncs it and renames it into place,
/// so a failed write never leaves a truncated document behind.
///
/// # Errors
/// Returns `Io` if the file cannot be written.
pub fn save_document(content: &str, path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.xml".to_string());
    let temp_file = path.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_file, path)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RUNTIME_APPLICATION_PUBLIC_ID, RUNTIME_APPLICATION_SYSTEM_ID};
    use tempfile::tempdir;

    #[test]
    fn test_detect_ignores_prefix() {
        let xml = r#"<j:application xmlns:j="https://jakarta.ee/xml/ns/jakartaee"/>"#;
        assert_eq!(DocumentKind::detect(xml).unwrap(), DocumentKind::Application);
        let err = DocumentKind::detect("<ejb-jar/>").unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownDocument(name) if name == "ejb-jar"));
    }

    #[test]
    fn test_register_bundles() {
        let bundles = register_bundles();
        assert_eq!(bundles.len(), 1);
        assert_eq!(
            bundles.get(RUNTIME_APPLICATION_PUBLIC_ID).map(String::as_str),
            Some(RUNTIME_APPLICATION_SYSTEM_ID)
        );
    }

    #[test]
    fn test_runtime_document_has_doc_type() {
        let ctx = DescriptorContext::default();
        let xml = write_application_runtime(&ApplicationRuntime::default(), &ctx).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(RUNTIME_APPLICATION_PUBLIC_ID));
        assert!(xml.contains("<glassfish-application/>"));
    }

    #[test]
    fn test_mappings_recorded_for_runtime_roots_only() {
        let ctx = DescriptorContext::default();
        read_application("<application><display-name>A</display-name></application>", &ctx)
            .unwrap();
        assert!(ctx.mappings().is_empty());

        read_application_runtime(
            "<glassfish-application><realm>file</realm></glassfish-application>",
            &ctx,
        )
        .unwrap();
        assert_eq!(
            ctx.mappings().mappings(tags::GLASSFISH_APPLICATION),
            vec![(tags::REALM.to_string(), ApplicationRuntimeNode::KIND)]
        );
    }

    #[test]
    fn test_properties_expanded() {
        let mut config = ParserConfig::default();
        config.set_property("app.name", "Shop").unwrap();
        let ctx = DescriptorContext::new(config);

        let xml = "<application><display-name>${app.name}</display-name></application>";
        let (application, _) = read_application(xml, &ctx).unwrap();
        assert_eq!(application.display_name.as_deref(), Some("Shop"));
    }

    #[test]
    fn test_save_document() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("application.xml");
        let saved = save_document("<application/>\n", &path).unwrap();

        assert_eq!(saved, path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "<application/>\n");
        assert!(!temp_dir.path().join(".application.xml.tmp").exists());
    }
}
