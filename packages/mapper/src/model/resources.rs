//! Resource definitions an application declares for itself.

use std::sync::LazyLock;

use serde::Serialize;

use super::common::ResourceProperty;
use crate::descriptor::{Descriptor, DescriptorInfo, OperationSet, Operations, ResourceKind};
use crate::error::InvocationError;

/// A `data-source` definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataSourceDefinition {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ResourceProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_timeout: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_pool_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pool_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pool_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_idle_time: Option<i32>,
}

fn non_negative(field: &str, value: i32) -> Result<i32, InvocationError> {
    if value < 0 {
        return Err(InvocationError::IllegalArgument(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(value)
}

static DATA_SOURCE_OPERATIONS: LazyLock<Operations<DataSourceDefinition>> = LazyLock::new(|| {
    Operations::<DataSourceDefinition>::new()
        .string("set_name", |d, v| {
            d.name = v;
            Ok(())
        })
        .string("set_class_name", |d, v| {
            d.class_name = Some(v);
            Ok(())
        })
        .string("set_server_name", |d, v| {
            d.server_name = Some(v);
            Ok(())
        })
        .int("set_port_number", |d, v| {
            d.port_number = Some(non_negative("port-number", v)?);
            Ok(())
        })
        .string("set_database_name", |d, v| {
            d.database_name = Some(v);
            Ok(())
        })
        .string("set_url", |d, v| {
            d.url = Some(v);
            Ok(())
        })
        .string("set_user", |d, v| {
            d.user = Some(v);
            Ok(())
        })
        .string("set_password", |d, v| {
            d.password = Some(v);
            Ok(())
        })
        .int("set_login_timeout", |d, v| {
            d.login_timeout = Some(non_negative("login-timeout", v)?);
            Ok(())
        })
        .bool("set_transactional", |d, v| {
            d.transactional = Some(v);
            Ok(())
        })
        .int("set_initial_pool_size", |d, v| {
            d.initial_pool_size = Some(non_negative("initial-pool-size", v)?);
            Ok(())
        })
        .int("set_max_pool_size", |d, v| {
            d.max_pool_size = Some(non_negative("max-pool-size", v)?);
            Ok(())
        })
        .int("set_min_pool_size", |d, v| {
            d.min_pool_size = Some(non_negative("min-pool-size", v)?);
            Ok(())
        })
        .int("set_max_idle_time", |d, v| {
            d.max_idle_time = Some(v);
            Ok(())
        })
        .adder::<ResourceProperty>("add_property", |d, p| {
            d.properties.push(p);
            Ok(())
        })
});

impl Descriptor for DataSourceDefinition {
    fn operations(&self) -> &'static dyn OperationSet {
        &*DATA_SOURCE_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }

    fn resource_kind(&self) -> Option<ResourceKind> {
        Some(ResourceKind::DataSource)
    }
}

/// A `mail-session` definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MailSession {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ResourceProperty>,
}

static MAIL_SESSION_OPERATIONS: LazyLock<Operations<MailSession>> = LazyLock::new(|| {
    Operations::<MailSession>::new()
        .string("set_name", |d, v| {
            d.name = v;
            Ok(())
        })
        .string("set_store_protocol", |d, v| {
            d.store_protocol = Some(v);
            Ok(())
        })
        .string("set_transport_protocol", |d, v| {
            d.transport_protocol = Some(v);
            Ok(())
        })
        .string("set_host", |d, v| {
            d.host = Some(v);
            Ok(())
        })
        .string("set_user", |d, v| {
            d.user = Some(v);
            Ok(())
        })
        .string("set_password", |d, v| {
            d.password = Some(v);
            Ok(())
        })
        .string("set_from", |d, v| {
            d.from = Some(v);
            Ok(())
        })
        .adder::<ResourceProperty>("add_property", |d, p| {
            d.properties.push(p);
            Ok(())
        })
});

impl Descriptor for MailSession {
    fn operations(&self) -> &'static dyn OperationSet {
        &*MAIL_SESSION_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }

    fn resource_kind(&self) -> Option<ResourceKind> {
        Some(ResourceKind::MailSession)
    }
}

/// Transaction level a connection factory supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionSupport {
    NoTransaction,
    LocalTransaction,
    XaTransaction,
}

impl TransactionSupport {
    /// Parse the element text.
    ///
    /// # Errors
    /// Returns `IllegalArgument` for an unknown level.
    pub fn parse(value: &str) -> Result<Self, InvocationError> {
        match value {
            "NoTransaction" => Ok(Self::NoTransaction),
            "LocalTransaction" => Ok(Self::LocalTransaction),
            "XATransaction" => Ok(Self::XaTransaction),
            other => Err(InvocationError::IllegalArgument(format!(
                "unknown transaction-support '{other}'"
            ))),
        }
    }

    /// Element text.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoTransaction => "NoTransaction",
            Self::LocalTransaction => "LocalTransaction",
            Self::XaTransaction => "XATransaction",
        }
    }
}

/// A `connection-factory` definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionFactoryDefinition {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_adapter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_support: Option<TransactionSupport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pool_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pool_size: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ResourceProperty>,
}

static CONNECTION_FACTORY_OPERATIONS: LazyLock<Operations<ConnectionFactoryDefinition>> =
    LazyLock::new(|| {
        Operations::<ConnectionFactoryDefinition>::new()
            .string("set_name", |d, v| {
                d.name = v;
                Ok(())
            })
            .string("set_interface_name", |d, v| {
                d.interface_name = Some(v);
                Ok(())
            })
            .string("set_resource_adapter", |d, v| {
                d.resource_adapter = Some(v);
                Ok(())
            })
            .string("set_transaction_support", |d, v| {
                d.transaction_support = Some(TransactionSupport::parse(&v)?);
                Ok(())
            })
            .int("set_max_pool_size", |d, v| {
                d.max_pool_size = Some(non_negative("max-pool-size", v)?);
                Ok(())
            })
            .int("set_min_pool_size", |d, v| {
                d.min_pool_size = Some(non_negative("min-pool-size", v)?);
                Ok(())
            })
            .adder::<ResourceProperty>("add_property", |d, p| {
                d.properties.push(p);
                Ok(())
            })
    });

impl Descriptor for ConnectionFactoryDefinition {
    fn operations(&self) -> &'static dyn OperationSet {
        &*CONNECTION_FACTORY_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }

    fn resource_kind(&self) -> Option<ResourceKind> {
        Some(ResourceKind::ConnectionFactory)
    }
}

/// An `administered-object` definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdministeredObjectDefinition {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_adapter: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ResourceProperty>,
}

static ADMINISTERED_OBJECT_OPERATIONS: LazyLock<Operations<AdministeredObjectDefinition>> =
    LazyLock::new(|| {
        Operations::<AdministeredObjectDefinition>::new()
            .string("set_name", |d, v| {
                d.name = v;
                Ok(())
            })
            .string("set_interface_name", |d, v| {
                d.interface_name = Some(v);
                Ok(())
            })
            .string("set_class_name", |d, v| {
                d.class_name = Some(v);
                Ok(())
            })
            .string("set_resource_adapter", |d, v| {
                d.resource_adapter = Some(v);
                Ok(())
            })
            .adder::<ResourceProperty>("add_property", |d, p| {
                d.properties.push(p);
                Ok(())
            })
    });

impl Descriptor for AdministeredObjectDefinition {
    fn operations(&self) -> &'static dyn OperationSet {
        &*ADMINISTERED_OBJECT_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }

    fn resource_kind(&self) -> Option<ResourceKind> {
        Some(ResourceKind::AdministeredObject)
    }
}

/// A `jms-connection-factory` definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JmsConnectionFactoryDefinition {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_adapter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ResourceProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pool_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pool_size: Option<i32>,
}

static JMS_CONNECTION_FACTORY_OPERATIONS: LazyLock<Operations<JmsConnectionFactoryDefinition>> =
    LazyLock::new(|| {
        Operations::<JmsConnectionFactoryDefinition>::new()
            .string("set_name", |d, v| {
                d.name = v;
                Ok(())
            })
            .string("set_interface_name", |d, v| {
                d.interface_name = Some(v);
                Ok(())
            })
            .string("set_class_name", |d, v| {
                d.class_name = Some(v);
                Ok(())
            })
            .string("set_resource_adapter", |d, v| {
                d.resource_adapter = Some(v);
                Ok(())
            })
            .string("set_user", |d, v| {
                d.user = Some(v);
                Ok(())
            })
            .string("set_password", |d, v| {
                d.password = Some(v);
                Ok(())
            })
            .string("set_client_id", |d, v| {
                d.client_id = Some(v);
                Ok(())
            })
            .bool("set_transactional", |d, v| {
                d.transactional = Some(v);
                Ok(())
            })
            .int("set_max_pool_size", |d, v| {
                d.max_pool_size = Some(non_negative("max-pool-size", v)?);
                Ok(())
            })
            .int("set_min_pool_size", |d, v| {
                d.min_pool_size = Some(non_negative("min-pool-size", v)?);
                Ok(())
            })
            .adder::<ResourceProperty>("add_property", |d, p| {
                d.properties.push(p);
                Ok(())
            })
    });

impl Descriptor for JmsConnectionFactoryDefinition {
    fn operations(&self) -> &'static dyn OperationSet {
        &*JMS_CONNECTION_FACTORY_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }

    fn resource_kind(&self) -> Option<ResourceKind> {
        Some(ResourceKind::JmsConnectionFactory)
    }
}

/// A `jms-destination` definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JmsDestinationDefinition {
    #[serde(flatten)]
    pub info: DescriptorInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_adapter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ResourceProperty>,
}

static JMS_DESTINATION_OPERATIONS: LazyLock<Operations<JmsDestinationDefinition>> =
    LazyLock::new(|| {
        Operations::<JmsDestinationDefinition>::new()
            .string("set_name", |d, v| {
                d.name = v;
                Ok(())
            })
            .string("set_interface_name", |d, v| {
                d.interface_name = Some(v);
                Ok(())
            })
            .string("set_class_name", |d, v| {
                d.class_name = Some(v);
                Ok(())
            })
            .string("set_resource_adapter", |d, v| {
                d.resource_adapter = Some(v);
                Ok(())
            })
            .string("set_destination_name", |d, v| {
                d.destination_name = Some(v);
                Ok(())
            })
            .adder::<ResourceProperty>("add_property", |d, p| {
                d.properties.push(p);
                Ok(())
            })
    });

impl Descriptor for JmsDestinationDefinition {
    fn operations(&self) -> &'static dyn OperationSet {
        &*JMS_DESTINATION_OPERATIONS
    }

    fn info(&self) -> &DescriptorInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut DescriptorInfo {
        &mut self.info
    }

    fn resource_kind(&self) -> Option<ResourceKind> {
        Some(ResourceKind::JmsDestination)
    }
}

fn take<T: Descriptor>(descriptor: Box<dyn Descriptor>) -> Option<T> {
    descriptor.into_any().downcast::<T>().ok().map(|d| *d)
}

/// Any resource definition the application schema can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceDefinition {
    DataSource(DataSourceDefinition),
    MailSession(MailSession),
    ConnectionFactory(ConnectionFactoryDefinition),
    AdministeredObject(AdministeredObjectDefinition),
    JmsConnectionFactory(JmsConnectionFactoryDefinition),
    JmsDestination(JmsDestinationDefinition),
}

impl ResourceDefinition {
    /// Check whether `descriptor` is a definition this enum can hold.
    #[must_use]
    pub fn accepts(descriptor: &dyn Descriptor) -> bool {
        descriptor.is::<DataSourceDefinition>()
            || descriptor.is::<MailSession>()
            || descriptor.is::<ConnectionFactoryDefinition>()
            || descriptor.is::<AdministeredObjectDefinition>()
            || descriptor.is::<JmsConnectionFactoryDefinition>()
            || descriptor.is::<JmsDestinationDefinition>()
    }

    /// Take ownership of a boxed definition; `None` if it is none.
    #[must_use]
    pub fn from_descriptor(descriptor: Box<dyn Descriptor>) -> Option<Self> {
        if descriptor.is::<DataSourceDefinition>() {
            take(descriptor).map(Self::DataSource)
        } else if descriptor.is::<MailSession>() {
            take(descriptor).map(Self::MailSession)
        } else if descriptor.is::<ConnectionFactoryDefinition>() {
            take(descriptor).map(Self::ConnectionFactory)
        } else if descriptor.is::<AdministeredObjectDefinition>() {
            take(descriptor).map(Self::AdministeredObject)
        } else if descriptor.is::<JmsConnectionFactoryDefinition>() {
            take(descriptor).map(Self::JmsConnectionFactory)
        } else if descriptor.is::<JmsDestinationDefinition>() {
            take(descriptor).map(Self::JmsDestination)
        } else {
            None
        }
    }

    /// The definition as a descriptor.
    #[must_use]
    pub fn as_descriptor(&self) -> &dyn Descriptor {
        match self {
            Self::DataSource(d) => d,
            Self::MailSession(d) => d,
            Self::ConnectionFactory(d) => d,
            Self::AdministeredObject(d) => d,
            Self::JmsConnectionFactory(d) => d,
            Self::JmsDestination(d) => d,
        }
    }

    /// Resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::DataSource(d) => &d.name,
            Self::MailSession(d) => &d.name,
            Self::ConnectionFactory(d) => &d.name,
            Self::AdministeredObject(d) => &d.name,
            Self::JmsConnectionFactory(d) => &d.name,
            Self::JmsDestination(d) => &d.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::resolve_and_invoke;

    #[test]
    fn test_negative_pool_size_rejected() {
        let mut ds = DataSourceDefinition::default();
        let err = resolve_and_invoke(&mut ds, "set_max_pool_size", "-1").unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(ds.max_pool_size, None);
    }

    #[test]
    fn test_transactional_is_strict_bool() {
        let mut ds = DataSourceDefinition::default();
        assert!(resolve_and_invoke(&mut ds, "set_transactional", "yes").is_err());
        resolve_and_invoke(&mut ds, "set_transactional", "TRUE").unwrap();
        assert_eq!(ds.transactional, Some(true));
    }

    #[test]
    fn test_resource_definition_from_descriptor() {
        let session = MailSession {
            name: "java:app/mail/Orders".to_string(),
            ..MailSession::default()
        };
        let definition = ResourceDefinition::from_descriptor(Box::new(session)).unwrap();
        assert!(matches!(definition, ResourceDefinition::MailSession(_)));
        assert_eq!(definition.name(), "java:app/mail/Orders");
        assert_eq!(
            definition.as_descriptor().resource_kind(),
            Some(ResourceKind::MailSession)
        );

        let property = Box::new(ResourceProperty::new("a", "b"));
        assert!(ResourceDefinition::from_descriptor(property).is_none());
    }

    #[test]
    fn test_transaction_support_text() {
        assert_eq!(
            TransactionSupport::parse("XATransaction").unwrap().as_str(),
            "XATransaction"
        );
        assert!(TransactionSupport::parse("Xa").is_err());
    }
}
