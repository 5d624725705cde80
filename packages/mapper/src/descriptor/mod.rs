//! Descriptor abstraction: typed records reachable through named operations.
//!
//! A descriptor is the in-memory form of one element. The parser never
//! touches descriptor fields directly; it goes through the operation table
//! each type publishes (see [`Operations`]) and the compatible-setter
//! resolver.

mod operations;
mod resolver;
mod value;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub use operations::{InvokeResult, OperationSet, Operations};
pub use resolver::{resolve_and_invoke, resolve_and_invoke_add};
pub use value::{CoercionError, JndiName, ScalarValue, ValueKind};

/// Access to the concrete type behind a trait object.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Resource definition kinds a descriptor may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    DataSource,
    MailSession,
    ConnectionFactory,
    AdministeredObject,
    JmsConnectionFactory,
    JmsDestination,
}

/// A typed record for one element.
pub trait Descriptor: AsAny + Send + fmt::Debug {
    /// Operation table of this type.
    fn operations(&self) -> &'static dyn OperationSet;

    /// Shared localized text and namespace bookkeeping.
    fn info(&self) -> &DescriptorInfo;

    /// Mutable access to the shared bookkeeping.
    fn info_mut(&mut self) -> &mut DescriptorInfo;

    /// Resource kind, for resource definitions.
    fn resource_kind(&self) -> Option<ResourceKind> {
        None
    }

    /// Short type name for diagnostics.
    fn type_name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

impl<'a> dyn Descriptor + 'a {
    /// Check the concrete type.
    #[must_use]
    pub fn is<T: Descriptor>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow as a concrete type.
    #[must_use]
    pub fn downcast_ref<T: Descriptor>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow as a concrete type.
    pub fn downcast_mut<T: Descriptor>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Bookkeeping every descriptor carries: localized descriptions and the
/// namespace prefixes declared on its element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DescriptorInfo {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    descriptions: BTreeMap<String, String>,
    #[serde(skip)]
    prefix_mapping: BTreeMap<String, String>,
}

impl DescriptorInfo {
    /// Create empty bookkeeping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Description without a language tag.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.descriptions.get("").map(String::as_str)
    }

    /// Set the description without a language tag.
    pub fn set_description(&mut self, text: impl Into<String>) {
        self.descriptions.insert(String::new(), text.into());
    }

    /// Set the description for `lang`; an empty `lang` means untagged.
    pub fn set_localized_description(&mut self, lang: &str, text: impl Into<String>) {
        self.descriptions.insert(lang.to_string(), text.into());
    }

    /// Description for `lang`.
    #[must_use]
    pub fn localized_description(&self, lang: &str) -> Option<&str> {
        self.descriptions.get(lang).map(String::as_str)
    }

    /// All `(lang, text)` pairs, untagged first.
    pub fn localized_descriptions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.descriptions
            .iter()
            .map(|(lang, text)| (lang.as_str(), text.as_str()))
    }

    /// Record a namespace declaration; a repeated prefix is rebound.
    pub fn add_prefix_mapping(&mut self, prefix: &str, uri: &str) {
        self.prefix_mapping
            .insert(prefix.to_string(), uri.to_string());
    }

    /// Declared `(prefix, uri)` pairs, default namespace first.
    pub fn prefix_mapping(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefix_mapping
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    /// Check whether any namespace was declared.
    #[must_use]
    pub fn has_prefix_mapping(&self) -> bool {
        !self.prefix_mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnvironmentProperty, MailSession};

    #[test]
    fn test_downcast() {
        let boxed: Box<dyn Descriptor> = Box::new(MailSession::default());
        assert!(boxed.is::<MailSession>());
        assert!(!boxed.is::<EnvironmentProperty>());
        assert!(boxed.downcast_ref::<MailSession>().is_some());
        assert_eq!(boxed.type_name(), "MailSession");
        assert_eq!(boxed.resource_kind(), Some(ResourceKind::MailSession));
    }

    #[test]
    fn test_localized_descriptions_order() {
        let mut info = DescriptorInfo::new();
        info.set_localized_description("nl", "Winkel");
        info.set_description("Shop");
        info.set_localized_description("de", "Laden");

        let all: Vec<_> = info.localized_descriptions().collect();
        assert_eq!(all, vec![("", "Shop"), ("de", "Laden"), ("nl", "Winkel")]);
        assert_eq!(info.description(), Some("Shop"));
    }

    #[test]
    fn test_prefix_mapping_rebinds() {
        let mut info = DescriptorInfo::new();
        info.add_prefix_mapping("", "urn:a");
        info.add_prefix_mapping("x", "urn:x");
        info.add_prefix_mapping("", "urn:b");
        let mapping: Vec<_> = info.prefix_mapping().collect();
        assert_eq!(mapping, vec![("", "urn:b"), ("x", "urn:x")]);
        assert!(info.has_prefix_mapping());
    }
}
