//! Element and attribute names of the supported descriptor schemas.

// Shared
pub const DESCRIPTION: &str = "description";
pub const DISPLAY_NAME: &str = "display-name";
pub const ID: &str = "id";
pub const XML_LANG: &str = "xml:lang";
pub const VERSION: &str = "version";
pub const SCHEMA_LOCATION: &str = "xsi:schemaLocation";
pub const NAME: &str = "name";
pub const VALUE: &str = "value";
pub const PROPERTY: &str = "property";
pub const LOOKUP_NAME: &str = "lookup-name";
pub const MAPPED_NAME: &str = "mapped-name";
pub const JNDI_NAME: &str = "jndi-name";

// Application
pub const APPLICATION: &str = "application";
pub const APPLICATION_NAME: &str = "application-name";
pub const INITIALIZE_IN_ORDER: &str = "initialize-in-order";
pub const LIBRARY_DIRECTORY: &str = "library-directory";
pub const MODULE: &str = "module";
pub const WEB: &str = "web";
pub const WEB_URI: &str = "web-uri";
pub const CONTEXT_ROOT: &str = "context-root";
pub const EJB: &str = "ejb";
pub const JAVA: &str = "java";
pub const CONNECTOR: &str = "connector";
pub const ALT_DD: &str = "alt-dd";
pub const SECURITY_ROLE: &str = "security-role";
pub const ROLE_NAME: &str = "role-name";

// JNDI environment
pub const ENV_ENTRY: &str = "env-entry";
pub const ENV_ENTRY_NAME: &str = "env-entry-name";
pub const ENV_ENTRY_TYPE: &str = "env-entry-type";
pub const ENV_ENTRY_VALUE: &str = "env-entry-value";
pub const EJB_REF: &str = "ejb-ref";
pub const EJB_LOCAL_REF: &str = "ejb-local-ref";
pub const EJB_REF_NAME: &str = "ejb-ref-name";
pub const EJB_REF_TYPE: &str = "ejb-ref-type";
pub const HOME: &str = "home";
pub const REMOTE: &str = "remote";
pub const LOCAL_HOME: &str = "local-home";
pub const LOCAL: &str = "local";
pub const EJB_LINK: &str = "ejb-link";
pub const RESOURCE_REF: &str = "resource-ref";
pub const RES_REF_NAME: &str = "res-ref-name";
pub const RES_TYPE: &str = "res-type";
pub const RES_AUTH: &str = "res-auth";
pub const RES_SHARING_SCOPE: &str = "res-sharing-scope";
pub const RESOURCE_ENV_REF: &str = "resource-env-ref";
pub const RESOURCE_ENV_REF_NAME: &str = "resource-env-ref-name";
pub const RESOURCE_ENV_REF_TYPE: &str = "resource-env-ref-type";
pub const MESSAGE_DESTINATION_REF: &str = "message-destination-ref";
pub const MESSAGE_DESTINATION_REF_NAME: &str = "message-destination-ref-name";
pub const MESSAGE_DESTINATION_TYPE: &str = "message-destination-type";
pub const MESSAGE_DESTINATION_USAGE: &str = "message-destination-usage";
pub const MESSAGE_DESTINATION_LINK: &str = "message-destination-link";

// Resource definitions
pub const DATA_SOURCE: &str = "data-source";
pub const MAIL_SESSION: &str = "mail-session";
pub const CONNECTION_FACTORY: &str = "connection-factory";
pub const ADMINISTERED_OBJECT: &str = "administered-object";
pub const JMS_CONNECTION_FACTORY: &str = "jms-connection-factory";
pub const JMS_DESTINATION: &str = "jms-destination";
pub const CLASS_NAME: &str = "class-name";
pub const INTERFACE_NAME: &str = "interface-name";
pub const RESOURCE_ADAPTER: &str = "resource-adapter";
pub const SERVER_NAME: &str = "server-name";
pub const PORT_NUMBER: &str = "port-number";
pub const DATABASE_NAME: &str = "database-name";
pub const URL: &str = "url";
pub const USER: &str = "user";
pub const PASSWORD: &str = "password";
pub const TRANSACTIONAL: &str = "transactional";
pub const INITIAL_POOL_SIZE: &str = "initial-pool-size";
pub const MAX_POOL_SIZE: &str = "max-pool-size";
pub const MIN_POOL_SIZE: &str = "min-pool-size";
pub const MAX_IDLE_TIME: &str = "max-idle-time";
pub const LOGIN_TIMEOUT: &str = "login-timeout";
pub const STORE_PROTOCOL: &str = "store-protocol";
pub const TRANSPORT_PROTOCOL: &str = "transport-protocol";
pub const HOST: &str = "host";
pub const FROM: &str = "from";
pub const TRANSACTION_SUPPORT: &str = "transaction-support";
pub const CLIENT_ID: &str = "client-id";
pub const DESTINATION_NAME: &str = "destination-name";

// Runtime application
pub const GLASSFISH_APPLICATION: &str = "glassfish-application";
pub const UNIQUE_ID: &str = "unique-id";
pub const SECURITY_ROLE_MAPPING: &str = "security-role-mapping";
pub const PRINCIPAL_NAME: &str = "principal-name";
pub const GROUP_NAME: &str = "group-name";
pub const REALM: &str = "realm";
pub const ARCHIVE_NAME: &str = "archive-name";
pub const KEEP_STATE: &str = "keep-state";
pub const VERSION_IDENTIFIER: &str = "version-identifier";
