//! Descriptor types of the supported schemas.

mod application;
mod common;
mod environment;
mod resources;
mod runtime;

pub use application::{Application, Module, ModuleType, SecurityRole};
pub use common::{LocalizedText, ResourceProperty};
pub use environment::{
    EjbReference, EnvironmentProperty, JndiEnvironment, MessageDestinationReference,
    MessageDestinationUsage, ResAuth, ResourceEnvReference, ResourceReference, SharingScope,
    EJB_REF_TYPES,
};
pub use resources::{
    AdministeredObjectDefinition, ConnectionFactoryDefinition, DataSourceDefinition,
    JmsConnectionFactoryDefinition, JmsDestinationDefinition, MailSession, ResourceDefinition,
    TransactionSupport,
};
pub use runtime::{
    ApplicationRuntime, ExtensionDescriptor, RuntimeReference, RuntimeReferenceKind,
    SecurityRoleMapping,
};
