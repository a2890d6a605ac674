use crate::error::{GraphError, PersistError};
use crate::graph::{Graph, NodeId, Position};
use crate::value::ParamMap;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;

/// Serializable topology of a graph: its nodes and connections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

/// One node of a [`GraphDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique node name. Generated from the operator when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub operator: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub parameters: ParamMap,
}

/// A connection from `source`'s output into input `slot` of `target`, by node name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub slot: usize,
}

impl GraphDefinition {
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &str) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).map_err(|e| PersistError::Io {
            path: path.to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &str) -> Result<(), PersistError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| PersistError::Io {
            path: path.to_string(),
            source: e,
        })
    }
}

impl Graph {
    /// Adds the nodes and connections of `definition` to this graph.
    ///
    /// Parameters are applied as the nodes' baseline configuration. Edges into
    /// the same node are connected in slot order. Returns the created node ids
    /// in definition order. On error every node created so far is removed
    /// again, leaving the graph as it was.
    pub fn load_definition(&mut self, definition: &GraphDefinition) -> Result<Vec<NodeId>, GraphError> {
        let mut created = Vec::with_capacity(definition.nodes.len());
        if let Err(e) = self.apply_definition(definition, &mut created) {
            log::debug!("definition rejected ({}), removing {} node(s)", e, created.len());
            for id in created.into_iter().rev() {
                // Ids were just created by this load, so every node exists.
                let _ = self.remove_node(id);
            }
            return Err(e);
        }
        Ok(created)
    }

    fn apply_definition(
        &mut self,
        definition: &GraphDefinition,
        created: &mut Vec<NodeId>,
    ) -> Result<(), GraphError> {
        for node in &definition.nodes {
            let id = match &node.name {
                Some(name) => self.add_named_node(&node.operator, name, node.position)?,
                None => self.add_node_at(&node.operator, node.position)?,
            };
            created.push(id);
            for (name, value) in &node.parameters {
                self.set_parameter(id, name, value.clone())?;
            }
            self.commit_parameters(id)?;
        }

        let by_name: AHashMap<String, NodeId> = self
            .nodes()
            .map(|n| (n.name().to_string(), n.id()))
            .collect();
        let lookup = |name: &str| {
            by_name
                .get(name)
                .copied()
                .ok_or_else(|| GraphError::NodeNameNotFound(name.to_string()))
        };

        let edges = definition
            .edges
            .iter()
            .sorted_by(|a, b| (&a.target, a.slot).cmp(&(&b.target, b.slot)));
        for edge in edges {
            let source = lookup(&edge.source)?;
            let target = lookup(&edge.target)?;
            if !self.add_connection(target, source, edge.slot) {
                return Err(GraphError::ConnectionRejected {
                    source_node: edge.source.clone(),
                    target_node: edge.target.clone(),
                    slot: edge.slot,
                });
            }
        }
        Ok(())
    }

    /// Builds a graph from a definition, using the graph's registry and context.
    pub fn with_definition(mut self, definition: &GraphDefinition) -> Result<Self, GraphError> {
        self.load_definition(definition)?;
        Ok(self)
    }

    /// Captures the current topology and committed parameters.
    pub fn to_definition(&self) -> GraphDefinition {
        let nodes = self
            .nodes()
            .map(|n| NodeDefinition {
                name: Some(n.name().to_string()),
                operator: n.operator_name().to_string(),
                position: n.position(),
                parameters: n.parameters(),
            })
            .collect();
        let edges = self
            .connections()
            .into_iter()
            .filter_map(|(producer, consumer, slot)| {
                Some(EdgeDefinition {
                    source: self.node(producer)?.name().to_string(),
                    target: self.node(consumer)?.name().to_string(),
                    slot,
                })
            })
            .collect();
        GraphDefinition { nodes, edges }
    }
}
