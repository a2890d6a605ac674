//! Prelude module for convenient imports
//!
//! Re-exports the types needed to build, edit and validate a graph.
//!
//! # Example
//!
//! ```rust,no_run
//! use opgraph::prelude::*;
//!
//! # fn run_example() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = GraphDefinition::from_file("path/to/graph.json")?;
//! let mut graph = Graph::with_defaults().with_definition(&definition)?;
//!
//! for pass in graph.validate_all() {
//!     println!("{} -> {}", pass.source, pass.source_status);
//! }
//! # Ok(())
//! # }
//! ```

// Graph core
pub use crate::graph::{
    Graph, GraphEvent, GraphNode, NodeId, Position, ValidationPass, ValidationStatus,
};

// Operators and forms
pub use crate::operator::{
    FormState, FormValidation, Operator, OperatorContext, OperatorMetadata, OperatorRegistry,
    ParameterDescriptor, ParameterForm, Product, SimpleForm, SourceProducts,
};

// Values
pub use crate::value::{ParamKind, ParamMap, ParamValue};

// Context, configuration and notifications
pub use crate::config::{GraphConfig, GraphContext};
pub use crate::notify::{LogSink, MemorySink, Notification, NotificationSink, Severity};

// Persistence
pub use crate::definition::{EdgeDefinition, GraphDefinition, NodeDefinition};

// Error types
pub use crate::error::{ConfigError, FormError, GraphError, OperatorError, PersistError};
