//! Element nodes, handler registries, the parse engine and the serializer
//! helpers.

mod engine;
mod handler;
pub mod handlers;
mod registry;
mod types;
pub mod writer;

pub use engine::{ParseEngine, ParsedDocument};
pub use handler::{descriptor_as, NodeCore, XmlNode};
pub use registry::{
    ExtensionLookup, ExtensionRegistry, NoExtensions, NodeMappingRegistry, StaticExtensions,
};
pub use types::{Diagnostic, DispatchTable, NodeConstructor, NodeKind, ParseContext};
pub use writer::WriteContext;
