use crate::graph::NodeId;
use thiserror::Error;

/// Errors raised by structural operations on a [`Graph`](crate::graph::Graph).
///
/// Connection-rule violations are not errors: `add_connection` simply returns `false`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} does not exist in this graph")]
    NodeNotFound(NodeId),

    #[error("No node named '{0}' exists in this graph")]
    NodeNameNotFound(String),

    #[error("Operator '{0}' is not registered")]
    UnknownOperator(String),

    #[error("A node named '{0}' already exists")]
    DuplicateName(String),

    #[error("Input slot {slot} of node '{node}' is not connected")]
    EmptySlot { node: String, slot: usize },

    #[error("Connection from '{source_node}' into slot {slot} of '{target_node}' was rejected")]
    ConnectionRejected {
        source_node: String,
        target_node: String,
        slot: usize,
    },

    #[error(transparent)]
    Form(#[from] FormError),
}

/// Failure reported by an operator while computing its target product.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    #[error("Missing source product '{0}'")]
    MissingSource(String),

    #[error("Missing parameter '{0}'")]
    MissingParameter(String),

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("{0}")]
    Failed(String),
}

/// Errors raised by a parameter form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Operator has no parameter named '{0}'")]
    UnknownParameter(String),

    #[error("Parameter '{name}' cannot be serialized: {reason}")]
    NotSerializable { name: String, reason: String },
}

/// Errors raised while reading or writing persisted graph state.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to read or write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised while loading a [`GraphConfig`](crate::config::GraphConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for '{key}': {message}")]
    Invalid { key: String, message: String },
}
