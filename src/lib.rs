//! # opgraph - Operator Graph Core
//!
//! **opgraph** is the dataflow core behind a visual operator-graph editor. Users
//! place operator nodes (`Read`, `Filter`, `Write`, ...) on a canvas, wire one
//! node's output into numbered input slots of another, edit parameters and
//! select nodes. This crate owns the part of that editor that is not drawing:
//!
//! - **Connection rules**: slots are filled contiguously from zero, a producer
//!   feeds a consumer at most once, bounded nodes never exceed their maximum,
//!   and a connection that would close a cycle is rejected.
//! - **Lazy validation**: wiring and editing only mark nodes dirty. A node is
//!   recomputed when it is deselected (or on explicit request) and caches its
//!   output product for downstream nodes.
//! - **Fast invalidation**: when a node fails, everything downstream is flagged
//!   as `Warning` without being recomputed.
//! - **Event fan-out**: creation, deletion, updates and selection changes are
//!   published as [`GraphEvent`](graph::GraphEvent)s over channels.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use opgraph::prelude::*;
//!
//! let mut graph = Graph::with_defaults();
//! let read = graph.add_node("Read")?;
//! let filter = graph.add_node("Filter")?;
//! let write = graph.add_node("Write")?;
//!
//! assert!(graph.add_connection(filter, read, 0));
//! assert!(graph.add_connection(write, filter, 0));
//!
//! graph.set_parameter(read, "file", "scene.dim")?;
//! graph.set_parameter(write, "file", "scene_filtered.dim")?;
//!
//! // Validation runs when the user leaves a node.
//! for id in [read, filter, write] {
//!     graph.select(id)?;
//!     graph.deselect();
//! }
//! assert_eq!(graph.status(write), Some(ValidationStatus::Validated));
//! # Ok::<(), opgraph::error::GraphError>(())
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod graph;
pub mod notify;
pub mod operator;
pub mod prelude;
pub mod value;
