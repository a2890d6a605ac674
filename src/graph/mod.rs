use crate::config::{GraphConfig, GraphContext};
use crate::error::GraphError;
use crate::operator::OperatorRegistry;
use crate::value::ParamValue;
use ahash::{AHashMap, AHashSet};
use std::sync::mpsc::Receiver;

mod connection;
mod event;
mod node;
pub mod persist;
mod propagate;
mod topology;
mod validation;

use event::EventBus;

pub use event::GraphEvent;
pub use node::{GraphNode, NodeId, Position};
pub use propagate::ValidationPass;
pub use validation::ValidationStatus;

/// The editable operator graph: an arena of nodes, their connections and the
/// current selection.
///
/// All mutation goes through `&mut self`. Validation is lazy: connecting,
/// disconnecting or editing parameters only marks nodes dirty, and the actual
/// recomputation happens when a node is deselected or validation is requested.
pub struct Graph {
    registry: OperatorRegistry,
    context: GraphContext,
    nodes: AHashMap<NodeId, GraphNode>,
    /// Insertion order, which is also the painting order.
    order: Vec<NodeId>,
    next_id: usize,
    selected: Option<NodeId>,
    events: EventBus,
}

impl Graph {
    pub fn new(registry: OperatorRegistry, context: GraphContext) -> Self {
        Self {
            registry,
            context,
            nodes: AHashMap::new(),
            order: Vec::new(),
            next_id: 0,
            selected: None,
            events: EventBus::default(),
        }
    }

    /// A graph over the built-in operators that reports through the `log` facade.
    pub fn with_defaults() -> Self {
        Self::new(OperatorRegistry::with_defaults(), GraphContext::default())
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn context(&self) -> &GraphContext {
        &self.context
    }

    pub fn config(&self) -> &GraphConfig {
        &self.context.config
    }

    /// Returns a channel receiving every subsequent [`GraphEvent`].
    pub fn subscribe(&mut self) -> Receiver<GraphEvent> {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|n| n.name == name).map(|n| n.id)
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn status(&self, id: NodeId) -> Option<ValidationStatus> {
        self.nodes.get(&id).map(|n| n.status)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    fn node_ref(&self, id: NodeId) -> Result<&GraphNode, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut GraphNode, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Next free name for an `operator` node: the operator name followed by one
    /// more than the highest numeric suffix already in use. When that suffix is
    /// `usize::MAX`, the lowest free suffix is used instead.
    pub fn unique_name(&self, operator: &str) -> String {
        let prefix = format!("{}{}", operator, self.context.config.name_separator);
        let used: AHashSet<usize> = self
            .nodes()
            .filter_map(|n| n.name.strip_prefix(&prefix))
            .filter_map(|suffix| suffix.parse::<usize>().ok())
            .collect();
        let counter = match used.iter().max() {
            None => 0,
            Some(highest) => highest
                .checked_add(1)
                .or_else(|| (0..usize::MAX).find(|n| !used.contains(n)))
                .unwrap_or(0),
        };
        format!("{}{}", prefix, counter)
    }

    pub fn add_node(&mut self, operator: &str) -> Result<NodeId, GraphError> {
        self.add_node_at(operator, Position::default())
    }

    pub fn add_node_at(&mut self, operator: &str, position: Position) -> Result<NodeId, GraphError> {
        let name = self.unique_name(operator);
        self.add_named_node(operator, &name, position)
    }

    /// Creates a node with an explicit name. Names must be unique.
    pub fn add_named_node(
        &mut self,
        operator: &str,
        name: &str,
        position: Position,
    ) -> Result<NodeId, GraphError> {
        let op = self
            .registry
            .get(operator)
            .ok_or_else(|| GraphError::UnknownOperator(operator.to_string()))?;
        if self.find(name).is_some() {
            return Err(GraphError::DuplicateName(name.to_string()));
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;
        let mut node = GraphNode::new(id, name.to_string(), operator, op);
        node.position = self.context.config.snap(position);
        self.nodes.insert(id, node);
        self.order.push(id);

        log::debug!("created node '{}' ({}) as {}", name, operator, id);
        self.context.sink.info(name, "Created");
        self.events.publish(GraphEvent::Created(id));
        Ok(id)
    }

    /// Deletes a node. Every dependent loses its connection from this node;
    /// the deletion does not validate anything.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let (dependents, producers) = {
            let node = self.node_ref(id)?;
            (node.dependents.clone(), node.incoming.clone())
        };

        for dependent in dependents {
            if let Some(consumer) = self.nodes.get_mut(&dependent) {
                if let Some(slot) = consumer.slot_of(id) {
                    consumer.detach(slot);
                    self.events.publish(GraphEvent::Updated(dependent));
                }
            }
        }
        for producer in producers {
            if let Some(p) = self.nodes.get_mut(&producer) {
                p.dependents.retain(|d| *d != id);
            }
        }

        if self.selected == Some(id) {
            self.selected = None;
        }
        self.order.retain(|n| *n != id);
        let name = self
            .nodes
            .remove(&id)
            .map(|n| n.name)
            .unwrap_or_default();

        log::debug!("deleted node '{}' ({})", name, id);
        self.context.sink.info(&name, "Deleted");
        self.events.publish(GraphEvent::Deleted { id, name });
        Ok(())
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        for id in self.order.clone() {
            // Ids come from `order`, so every node exists.
            let _ = self.remove_node(id);
        }
    }

    /// Replaces the graph with the starting layout: one `Read` and one `Write` node.
    pub fn reset_to_default(&mut self) -> Result<(NodeId, NodeId), GraphError> {
        self.clear();
        let read = self.add_node_at("Read", Position::new(90, 30))?;
        let write = self.add_node_at("Write", Position::new(390, 30))?;
        self.context.sink.info("Graph", "empty graph created.");
        Ok((read, write))
    }

    /// Moves a node, snapping to the configured grid. Returns the final position.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<Position, GraphError> {
        let snapped = self.context.config.snap(position);
        self.node_mut(id)?.position = snapped;
        self.events.publish(GraphEvent::Updated(id));
        Ok(snapped)
    }

    /// Edits a parameter in the node's form. The edit stays pending until the
    /// form is committed, which happens on selection refresh or deselection.
    pub fn set_parameter(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<(), GraphError> {
        self.node_mut(id)?.form.set_parameter(name, value.into())?;
        self.events.publish(GraphEvent::Updated(id));
        Ok(())
    }

    /// Commits pending form edits as the node's baseline configuration, so they
    /// are not reported as a change on the next deselection.
    pub(crate) fn commit_parameters(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.node_mut(id)?.check_changes();
        Ok(())
    }

    /// Selects `id`. A different, previously selected node is deselected first,
    /// which may validate it.
    pub fn select(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.node_ref(id)?;
        if let Some(previous) = self.selected {
            if previous != id {
                self.deselect();
            }
        }

        self.refresh_sources(id);
        self.node_mut(id)?.selected = true;
        self.selected = Some(id);
        self.events.publish(GraphEvent::Selected(id));
        Ok(())
    }

    /// Deselects the current node and re-validates it when it has no output,
    /// its parameters changed, or a validation is owed.
    ///
    /// Returns the new status when a validation ran.
    pub fn deselect(&mut self) -> Option<ValidationStatus> {
        let id = self.selected.take()?;
        let node = self.nodes.get_mut(&id)?;
        node.selected = false;
        let config_changed = node.check_changes();
        let owed = node.output.is_none() || node.recompute_needed || config_changed;

        let status = if owed {
            log::debug!("'{}' changed, validating on deselect", node.name);
            Some(self.validate_and_propagate(id))
        } else {
            None
        };
        self.events.publish(GraphEvent::Deselected(id));
        status
    }
}
