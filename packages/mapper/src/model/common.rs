//! Descriptors shared by several element kinds.

use std::sync::LazyLock;

use serde::Serialize;

use crate::descriptor::{Descriptor, DescriptorInfo, OperationSet, Operations};

/// One `description` element: text plus its language.
///
/// Folded into the enclosing descriptor's localized descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText {
    pub info: DescriptorInfo,
    /// Language tag; empty when untagged.
    pub lang: String,
    pub text: String,
}

static LOCALIZED_TEXT_OPERATIONS: LazyLock<Operations<LocalizedText>> = LazyLock::new(|| {
    Operations::<LocalizedText>::new()
        .string("set_lang", |d, v| {
            d.lang = v;
            Ok(())
        })
        .string("set_text", |d, v| {
            d.text = v;
            Ok(())
        })
});

impl Descriptor for LocalizedText {
    fn operations(&self) -> &'static dyn OperationSet {
        &*LOCALIZED_TEXT_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}

/// A name/value configuration property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceProperty {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    pub value: String,
}

impl ResourceProperty {
    /// Create a property.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            info: DescriptorInfo::default(),
            name: name.into(),
            value: value.into(),
        }
    }
}

static RESOURCE_PROPERTY_OPERATIONS: LazyLock<Operations<ResourceProperty>> =
    LazyLock::new(|| {
        Operations::<ResourceProperty>::new()
            .string("set_name", |d, v| {
                d.name = v;
                Ok(())
            })
            .string("set_value", |d, v| {
                d.value = v;
                Ok(())
            })
    });

impl Descriptor for ResourceProperty {
    fn operations(&self) -> &'static dyn OperationSet {
        &*RESOURCE_PROPERTY_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }
}
