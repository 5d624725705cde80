//! Nodes for resource definitions.
//!
//! Every definition carries `property` children, folded through the
//! definition's `add_property` adder.

use std::sync::LazyLock;

use super::localized::PropertyNode;
use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::model::{
    AdministeredObjectDefinition, ConnectionFactoryDefinition, DataSourceDefinition,
    JmsConnectionFactoryDefinition, JmsDestinationDefinition, MailSession,
};
use crate::node::handler::{descriptor_as, NodeCore, XmlNode};
use crate::node::types::{DispatchTable, NodeKind};
use crate::node::writer::{
    append_bool_child, append_int_child, append_text_child, force_append_text_child,
    write_localized_descriptions, write_properties, WriteContext,
};
use crate::tags;
use crate::xml::NodeId;

fn resource_core() -> NodeCore {
    let mut core = NodeCore::new();
    core.register_handler_with(tags::PROPERTY, PropertyNode::KIND, "add_property");
    core
}

/// Handles `data-source`.
#[derive(Debug)]
pub struct DataSourceNode {
    core: NodeCore,
}

static DATA_SOURCE_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::NAME, "set_name")
        .map(tags::CLASS_NAME, "set_class_name")
        .map(tags::SERVER_NAME, "set_server_name")
        .map(tags::PORT_NUMBER, "set_port_number")
        .map(tags::DATABASE_NAME, "set_database_name")
        .map(tags::URL, "set_url")
        .map(tags::USER, "set_user")
        .map(tags::PASSWORD, "set_password")
        .map(tags::LOGIN_TIMEOUT, "set_login_timeout")
        .map(tags::TRANSACTIONAL, "set_transactional")
        .map(tags::INITIAL_POOL_SIZE, "set_initial_pool_size")
        .map(tags::MAX_POOL_SIZE, "set_max_pool_size")
        .map(tags::MIN_POOL_SIZE, "set_min_pool_size")
        .map(tags::MAX_IDLE_TIME, "set_max_idle_time")
});

impl DataSourceNode {
    pub const KIND: NodeKind = NodeKind::new("DataSourceNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self {
            core: resource_core(),
        }
    }
}

impl Default for DataSourceNode {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlNode for DataSourceNode {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        Some(Box::new(DataSourceDefinition::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &DATA_SOURCE_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let ds = descriptor_as::<DataSourceDefinition>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &ds.info);
        force_append_text_child(tree, element, tags::NAME, &ds.name);
        append_text_child(tree, element, tags::CLASS_NAME, ds.class_name.as_deref());
        append_text_child(tree, element, tags::SERVER_NAME, ds.server_name.as_deref());
        append_int_child(tree, element, tags::PORT_NUMBER, ds.port_number);
        append_text_child(tree, element, tags::DATABASE_NAME, ds.database_name.as_deref());
        append_text_child(tree, element, tags::URL, ds.url.as_deref());
        append_text_child(tree, element, tags::USER, ds.user.as_deref());
        append_text_child(tree, element, tags::PASSWORD, ds.password.as_deref());
        write_properties(out, element, &ds.properties)?;
        let tree = &mut out.tree;
        append_int_child(tree, element, tags::LOGIN_TIMEOUT, ds.login_timeout);
        append_bool_child(tree, element, tags::TRANSACTIONAL, ds.transactional);
        append_int_child(tree, element, tags::INITIAL_POOL_SIZE, ds.initial_pool_size);
        append_int_child(tree, element, tags::MAX_POOL_SIZE, ds.max_pool_size);
        append_int_child(tree, element, tags::MIN_POOL_SIZE, ds.min_pool_size);
        append_int_child(tree, element, tags::MAX_IDLE_TIME, ds.max_idle_time);
        Ok(element)
    }
}

/// Handles `mail-session`.
#[derive(Debug)]
pub struct MailSessionNode {
    core: NodeCore,
}

static MAIL_SESSION_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::NAME, "set_name")
        .map(tags::STORE_PROTOCOL, "set_store_protocol")
        .map(tags::TRANSPORT_PROTOCOL, "set_transport_protocol")
        .map(tags::HOST, "set_host")
        .map(tags::USER, "set_user")
        .map(tags::PASSWORD, "set_password")
        .map(tags::FROM, "set_from")
});

impl MailSessionNode {
    pub const KIND: NodeKind = NodeKind::new("MailSessionNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self {
            core: resource_core(),
        }
    }
}

impl Default for MailSessionNode {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlNode for MailSessionNode {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        Some(Box::new(MailSession::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &MAIL_SESSION_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let session = descriptor_as::<MailSession>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &session.info);
        force_append_text_child(tree, element, tags::NAME, &session.name);
        append_text_child(tree, element, tags::STORE_PROTOCOL, session.store_protocol.as_deref());
        append_text_child(
            tree,
            element,
            tags::TRANSPORT_PROTOCOL,
            session.transport_protocol.as_deref(),
        );
        append_text_child(tree, element, tags::HOST, session.host.as_deref());
        append_text_child(tree, element, tags::USER, session.user.as_deref());
        append_text_child(tree, element, tags::PASSWORD, session.password.as_deref());
        append_text_child(tree, element, tags::FROM, session.from.as_deref());
        write_properties(out, element, &session.properties)?;
        Ok(element)
    }
}

/// Handles `connection-factory`.
#[derive(Debug)]
pub struct ConnectionFactoryNode {
    core: NodeCore,
}

static CONNECTION_FACTORY_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::NAME, "set_name")
        .map(tags::INTERFACE_NAME, "set_interface_name")
        .map(tags::RESOURCE_ADAPTER, "set_resource_adapter")
        .map(tags::MAX_POOL_SIZE, "set_max_pool_size")
        .map(tags::MIN_POOL_SIZE, "set_min_pool_size")
        .map(tags::TRANSACTION_SUPPORT, "set_transaction_support")
});

impl ConnectionFactoryNode {
    pub const KIND: NodeKind =
        NodeKind::new("ConnectionFactoryNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self {
            core: resource_core(),
        }
    }
}

impl Default for ConnectionFactoryNode {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlNode for ConnectionFactoryNode {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        Some(Box::new(ConnectionFactoryDefinition::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &CONNECTION_FACTORY_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let factory = descriptor_as::<ConnectionFactoryDefinition>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &factory.info);
        force_append_text_child(tree, element, tags::NAME, &factory.name);
        append_text_child(tree, element, tags::INTERFACE_NAME, factory.interface_name.as_deref());
        append_text_child(
            tree,
            element,
            tags::RESOURCE_ADAPTER,
            factory.resource_adapter.as_deref(),
        );
        append_int_child(tree, element, tags::MAX_POOL_SIZE, factory.max_pool_size);
        append_int_child(tree, element, tags::MIN_POOL_SIZE, factory.min_pool_size);
        append_text_child(
            tree,
            element,
            tags::TRANSACTION_SUPPORT,
            factory.transaction_support.map(|t| t.as_str()),
        );
        write_properties(out, element, &factory.properties)?;
        Ok(element)
    }
}

/// Handles `administered-object`.
#[derive(Debug)]
pub struct AdministeredObjectNode {
    core: NodeCore,
}

static ADMINISTERED_OBJECT_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::NAME, "set_name")
        .map(tags::INTERFACE_NAME, "set_interface_name")
        .map(tags::CLASS_NAME, "set_class_name")
        .map(tags::RESOURCE_ADAPTER, "set_resource_adapter")
});

impl AdministeredObjectNode {
    pub const KIND: NodeKind =
        NodeKind::new("AdministeredObjectNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self {
            core: resource_core(),
        }
    }
}

impl Default for AdministeredObjectNode {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlNode for AdministeredObjectNode {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        Some(Box::new(AdministeredObjectDefinition::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &ADMINISTERED_OBJECT_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let object = descriptor_as::<AdministeredObjectDefinition>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &object.info);
        force_append_text_child(tree, element, tags::NAME, &object.name);
        append_text_child(tree, element, tags::INTERFACE_NAME, object.interface_name.as_deref());
        append_text_child(tree, element, tags::CLASS_NAME, object.class_name.as_deref());
        append_text_child(
            tree,
            element,
            tags::RESOURCE_ADAPTER,
            object.resource_adapter.as_deref(),
        );
        write_properties(out, element, &object.properties)?;
        Ok(element)
    }
}

/// Handles `jms-connection-factory`.
#[derive(Debug)]
pub struct JmsConnectionFactoryNode {
    core: NodeCore,
}

static JMS_CONNECTION_FACTORY_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::NAME, "set_name")
        .map(tags::INTERFACE_NAME, "set_interface_name")
        .map(tags::CLASS_NAME, "set_class_name")
        .map(tags::RESOURCE_ADAPTER, "set_resource_adapter")
        .map(tags::USER, "set_user")
        .map(tags::PASSWORD, "set_password")
        .map(tags::CLIENT_ID, "set_client_id")
        .map(tags::TRANSACTIONAL, "set_transactional")
        .map(tags::MAX_POOL_SIZE, "set_max_pool_size")
        .map(tags::MIN_POOL_SIZE, "set_min_pool_size")
});

impl JmsConnectionFactoryNode {
    pub const KIND: NodeKind =
        NodeKind::new("JmsConnectionFactoryNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self {
            core: resource_core(),
        }
    }
}

impl Default for JmsConnectionFactoryNode {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlNode for JmsConnectionFactoryNode {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        Some(Box::new(JmsConnectionFactoryDefinition::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &JMS_CONNECTION_FACTORY_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let factory = descriptor_as::<JmsConnectionFactoryDefinition>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &factory.info);
        force_append_text_child(tree, element, tags::NAME, &factory.name);
        append_text_child(tree, element, tags::INTERFACE_NAME, factory.interface_name.as_deref());
        append_text_child(tree, element, tags::CLASS_NAME, factory.class_name.as_deref());
        append_text_child(
            tree,
            element,
            tags::RESOURCE_ADAPTER,
            factory.resource_adapter.as_deref(),
        );
        append_text_child(tree, element, tags::USER, factory.user.as_deref());
        append_text_child(tree, element, tags::PASSWORD, factory.password.as_deref());
        append_text_child(tree, element, tags::CLIENT_ID, factory.client_id.as_deref());
        write_properties(out, element, &factory.properties)?;
        let tree = &mut out.tree;
        append_bool_child(tree, element, tags::TRANSACTIONAL, factory.transactional);
        append_int_child(tree, element, tags::MAX_POOL_SIZE, factory.max_pool_size);
        append_int_child(tree, element, tags::MIN_POOL_SIZE, factory.min_pool_size);
        Ok(element)
    }
}

/// Handles `jms-destination`.
#[derive(Debug)]
pub struct JmsDestinationNode {
    core: NodeCore,
}

static JMS_DESTINATION_DISPATCH: LazyLock<DispatchTable> = LazyLock::new(|| {
    DispatchTable::new()
        .map(tags::NAME, "set_name")
        .map(tags::INTERFACE_NAME, "set_interface_name")
        .map(tags::CLASS_NAME, "set_class_name")
        .map(tags::RESOURCE_ADAPTER, "set_resource_adapter")
        .map(tags::DESTINATION_NAME, "set_destination_name")
});

impl JmsDestinationNode {
    pub const KIND: NodeKind = NodeKind::new("JmsDestinationNode", || Ok(Box::new(Self::new())));

    #[must_use]
    pub fn new() -> Self {
        Self {
            core: resource_core(),
        }
    }
}

impl Default for JmsDestinationNode {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlNode for JmsDestinationNode {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn create_descriptor(&self) -> Option<Box<dyn Descriptor>> {
        Some(Box::new(JmsDestinationDefinition::default()))
    }

    fn dispatch_table(&self) -> &DispatchTable {
        &JMS_DESTINATION_DISPATCH
    }

    fn write_descriptor(
        &self,
        out: &mut WriteContext<'_>,
        parent: NodeId,
        name: &str,
        descriptor: &dyn Descriptor,
    ) -> Result<NodeId> {
        let destination = descriptor_as::<JmsDestinationDefinition>(descriptor, name)?;
        let tree = &mut out.tree;
        let element = tree.create_element(parent, name);
        write_localized_descriptions(tree, element, &destination.info);
        force_append_text_child(tree, element, tags::NAME, &destination.name);
        append_text_child(
            tree,
            element,
            tags::INTERFACE_NAME,
            destination.interface_name.as_deref(),
        );
        append_text_child(tree, element, tags::CLASS_NAME, destination.class_name.as_deref());
        append_text_child(
            tree,
            element,
            tags::RESOURCE_ADAPTER,
            destination.resource_adapter.as_deref(),
        );
        append_text_child(
            tree,
            element,
            tags::DESTINATION_NAME,
            destination.destination_name.as_deref(),
        );
        write_properties(out, element, &destination.properties)?;
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceProperty;

    #[test]
    fn test_data_source_properties_before_pool_settings() {
        let ds = DataSourceDefinition {
            name: "java:app/jdbc/Orders".to_string(),
            port_number: Some(5432),
            max_pool_size: Some(10),
            properties: vec![ResourceProperty::new("ssl", "true")],
            ..DataSourceDefinition::default()
        };
        let mut out = WriteContext::new();
        let document = out.tree.document();
        let element = DataSourceNode::new()
            .write_descriptor(&mut out, document, tags::DATA_SOURCE, &ds)
            .unwrap();

        let names: Vec<_> = out
            .tree
            .children(element)
            .iter()
            .filter_map(|id| out.tree.name(*id))
            .collect();
        assert_eq!(names, vec!["name", "port-number", "property", "max-pool-size"]);
    }

    #[test]
    fn test_resource_nodes_register_property_adder() {
        let node = JmsDestinationNode::new();
        assert_eq!(node.core().handler(tags::PROPERTY), Some(PropertyNode::KIND));
        assert_eq!(node.core().add_method(tags::PROPERTY), Some("add_property"));
    }
}
