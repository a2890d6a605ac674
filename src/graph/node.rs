use super::validation::ValidationStatus;
use crate::operator::{Operator, OperatorContext, OperatorMetadata, ParameterForm, Product};
use crate::value::ParamMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Stable handle of a node inside a [`Graph`](super::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Canvas position of a node. Only used for layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One operator instance in the graph.
///
/// A node keeps its producers in slot order and the nodes consuming its output.
/// It caches the outcome of its last validation together with the output product.
pub struct GraphNode {
    pub(super) id: NodeId,
    pub(super) name: String,
    pub(super) operator_name: String,
    pub(super) position: Position,
    /// Snapshot of the committed form parameters, used to detect edits.
    pub(super) configuration: ParamMap,
    /// Parameters as last serialized by a successful form check.
    pub(super) persisted: ParamMap,
    pub(super) status: ValidationStatus,
    pub(super) changed: bool,
    pub(super) recompute_needed: bool,
    pub(super) output: Option<Arc<Product>>,
    pub(super) incoming: Vec<NodeId>,
    pub(super) dependents: Vec<NodeId>,
    pub(super) visible_inputs: usize,
    pub(super) selected: bool,
    pub(super) form: Box<dyn ParameterForm>,
    pub(super) context: OperatorContext,
}

impl GraphNode {
    pub(super) fn new(
        id: NodeId,
        name: String,
        operator_name: &str,
        operator: Arc<dyn Operator>,
    ) -> Self {
        let form = operator.create_form();
        let configuration = form.parameters();
        let visible_inputs = operator.metadata().min_inputs;
        Self {
            id,
            name,
            operator_name: operator_name.to_string(),
            position: Position::default(),
            configuration,
            persisted: ParamMap::new(),
            status: ValidationStatus::Unchecked,
            changed: false,
            recompute_needed: true,
            output: None,
            incoming: Vec::new(),
            dependents: Vec::new(),
            visible_inputs,
            selected: false,
            form,
            context: OperatorContext::new(operator),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registry name this node was created from.
    pub fn operator_name(&self) -> &str {
        &self.operator_name
    }

    pub fn metadata(&self) -> &OperatorMetadata {
        self.context.metadata()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    /// Cached output of the last successful validation.
    pub fn output(&self) -> Option<&Arc<Product>> {
        self.output.as_ref()
    }

    /// Producers feeding this node, indexed by input slot.
    pub fn incoming(&self) -> &[NodeId] {
        &self.incoming
    }

    /// Nodes consuming this node's output.
    pub fn dependents(&self) -> &[NodeId] {
        &self.dependents
    }

    pub fn connection_count(&self) -> usize {
        self.incoming.len()
    }

    /// Number of input slots currently offered to the user.
    pub fn visible_inputs(&self) -> usize {
        self.visible_inputs
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Whether a validation is owed regardless of parameter edits.
    pub fn needs_validation(&self) -> bool {
        self.recompute_needed
    }

    /// `true` when enough producers are connected to attempt a validation.
    pub fn is_complete(&self) -> bool {
        self.incoming.len() >= self.metadata().min_inputs
    }

    /// A node whose operator accepts no inputs.
    pub fn is_source(&self) -> bool {
        !self.metadata().accepts_inputs()
    }

    /// Committed parameters of the node's form.
    pub fn parameters(&self) -> ParamMap {
        self.form.parameters()
    }

    /// Parameters as last serialized for persistence.
    pub fn persisted_parameters(&self) -> &ParamMap {
        &self.persisted
    }

    pub fn form(&self) -> &dyn ParameterForm {
        self.form.as_ref()
    }

    pub fn slot_of(&self, producer: NodeId) -> Option<usize> {
        self.incoming.iter().position(|p| *p == producer)
    }

    /// Checks the rules local to this node for placing `producer` at `slot`:
    /// slots are filled contiguously, a producer feeds at most one slot, and
    /// bounded nodes never exceed their maximum.
    pub fn accepts(&self, slot: usize, producer: NodeId) -> bool {
        if producer == self.id || self.incoming.contains(&producer) {
            return false;
        }
        if slot != self.incoming.len() {
            return false;
        }
        match self.metadata().max_inputs {
            Some(max) => slot < max,
            None => true,
        }
    }

    pub(super) fn attach(&mut self, producer: NodeId) {
        self.incoming.push(producer);
        let (min, max) = (self.metadata().min_inputs, self.metadata().max_inputs);
        let grown = (self.incoming.len() + 1).max(min);
        self.visible_inputs = match max {
            Some(max) => grown.min(max.max(min)),
            None => grown,
        };
        self.changed = true;
        self.recompute_needed = true;
    }

    pub(super) fn detach(&mut self, slot: usize) -> Option<NodeId> {
        if slot >= self.incoming.len() {
            return None;
        }
        let producer = self.incoming.remove(slot);
        let min = self.metadata().min_inputs;
        self.visible_inputs = self.visible_inputs.saturating_sub(1).max(min);
        self.changed = true;
        self.recompute_needed = true;
        Some(producer)
    }
}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("operator", &self.operator_name)
            .field("status", &self.status)
            .field("incoming", &self.incoming)
            .field("dependents", &self.dependents)
            .finish()
    }
}
