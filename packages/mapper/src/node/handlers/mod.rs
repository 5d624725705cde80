//! Node kinds of the supported descriptors.

mod application;
mod environment;
mod localized;
mod resources;
mod runtime;

pub use application::{ApplicationNode, ModuleNode, SecurityRoleNode};
pub use environment::{
    EjbReferenceNode, EnvEntryNode, MessageDestinationRefNode, ResourceEnvRefNode,
    ResourceRefNode,
};
pub use localized::{LocalizedInfoNode, PropertyNode, RuntimePropertyNode};
pub use resources::{
    AdministeredObjectNode, ConnectionFactoryNode, DataSourceNode, JmsConnectionFactoryNode,
    JmsDestinationNode, MailSessionNode,
};
pub use runtime::{ApplicationRuntimeNode, RuntimeRefNode, SecurityRoleMappingNode};
