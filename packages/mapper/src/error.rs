//! Error types for the descriptor mapper.
//!
//! Uses the dual-error pattern: `DescriptorError` for library consumers
//! with detailed error context, and `ResolveError` / `InvocationError` for the
//! setter resolution layer, which callers inspect to decide whether a mapping
//! failure is recoverable.

use thiserror::Error;

use crate::descriptor::CoercionError;

/// Main error type for the descriptor mapper library.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// A value had to be stored but the node owns no descriptor.
    #[error("No descriptor available in <{node}> to receive <{tag}>")]
    DescriptorUnavailable { node: String, tag: String },

    /// A dispatched value could not be mapped in a non-recoverable way.
    #[error("Cannot map <{tag}> = '{value}': {source}")]
    Mapping {
        tag: String,
        value: String,
        #[source]
        source: ResolveError,
    },

    /// No node on the enclosing chain accepted a completed descriptor.
    #[error("Cannot add {descriptor} to <{node}>")]
    UnplacedDescriptor { descriptor: String, node: String },

    /// The document root does not match the root node kind.
    #[error("Unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot { expected: String, found: String },

    /// The notification stream was not balanced.
    #[error("Unbalanced document: {0}")]
    Unbalanced(String),

    /// The document produced no root descriptor.
    #[error("Document <{0}> produced no descriptor")]
    EmptyDocument(String),

    /// A descriptor of an unexpected type was handed to a node.
    #[error("Node <{node}> cannot handle descriptor {found}")]
    WrongDescriptor { node: String, found: String },

    /// No root node kind is known for a document.
    #[error("Unknown document type with root <{0}>")]
    UnknownDocument(String),

    /// A node kind could not be instantiated.
    #[error("Cannot create node {kind}: {reason}")]
    NodeCreation { kind: String, reason: String },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for descriptor mapper operations.
pub type Result<T> = std::result::Result<T, DescriptorError>;

/// Failure raised by a descriptor operation once it has been invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The operation rejected the value itself.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// The operation failed for any other reason.
    #[error("{0}")]
    Failed(String),
}

impl InvocationError {
    /// Check whether the failure is an argument rejection.
    #[must_use]
    pub fn is_illegal_argument(&self) -> bool {
        matches!(self, Self::IllegalArgument(_))
    }
}

/// Outcome of a failed compatible-setter resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The descriptor declares the operation for none of the candidate types.
    #[error("{descriptor} has no operation '{operation}'")]
    NotFound {
        operation: String,
        descriptor: &'static str,
    },

    /// The operation exists but the value coerces to none of its types.
    #[error("'{value}' is not a valid argument for {descriptor}.{operation}: {}", format_failures(.failures))]
    Coercion {
        operation: String,
        descriptor: &'static str,
        value: String,
        failures: Vec<CoercionError>,
    },

    /// The operation was invoked and failed.
    #[error("{descriptor}.{operation} failed: {source}")]
    Invocation {
        operation: String,
        descriptor: &'static str,
        #[source]
        source: InvocationError,
    },
}

impl ResolveError {
    /// Check whether parsing may continue after this failure.
    ///
    /// Coercion failures and argument rejections only lose the one value;
    /// a missing operation or any other invocation failure is structural.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::Coercion { .. } => true,
            Self::Invocation { source, .. } => source.is_illegal_argument(),
        }
    }
}

fn format_failures(failures: &[CoercionError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
