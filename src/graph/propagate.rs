use super::node::NodeId;
use super::validation::ValidationStatus;
use super::Graph;
use crate::error::GraphError;
use crate::operator::Product;
use std::sync::Arc;

/// Summary of a validation pass started from one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPass {
    pub source: NodeId,
    pub source_status: ValidationStatus,
    /// Downstream nodes recomputed, in the order they were processed.
    pub revalidated: Vec<NodeId>,
    /// Downstream nodes only flagged as broken.
    pub invalidated: Vec<NodeId>,
}

impl ValidationPass {
    pub fn succeeded(&self) -> bool {
        self.source_status != ValidationStatus::Error
    }
}

impl Graph {
    /// Cached outputs of the producers of `id`, by slot.
    pub(super) fn input_products(&self, id: NodeId) -> Vec<Option<Arc<Product>>> {
        self.nodes
            .get(&id)
            .map(|node| {
                node.incoming
                    .iter()
                    .map(|p| self.nodes.get(p).and_then(|n| n.output.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(super) fn refresh_sources(&mut self, id: NodeId) {
        let inputs = self.input_products(id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.update_sources(&inputs);
        }
    }

    /// Recomputes one node and flags its direct dependents as changed.
    fn recompute(&mut self, id: NodeId) -> ValidationStatus {
        let inputs = self.input_products(id);
        let sink = self.context.sink.clone();
        let Some(node) = self.nodes.get_mut(&id) else {
            return ValidationStatus::Unchecked;
        };
        let status = node.recompute_output(&inputs, sink.as_ref());
        let dependents = node.dependents.clone();
        for dependent in dependents {
            if let Some(d) = self.nodes.get_mut(&dependent) {
                d.changed = true;
            }
        }
        status
    }

    /// Recomputes `id`; when it did not validate, everything downstream is
    /// invalidated without being recomputed.
    pub(super) fn validate_and_propagate(&mut self, id: NodeId) -> ValidationStatus {
        let status = self.recompute(id);
        if status != ValidationStatus::Validated {
            self.invalidate_downstream(id);
        }
        status
    }

    /// Validates a single node on request, exactly as deselecting it would.
    pub fn validate_node(&mut self, id: NodeId) -> Result<ValidationStatus, GraphError> {
        self.node_ref(id)?;
        Ok(self.validate_and_propagate(id))
    }

    /// Flags `id` as `Warning` without recomputing it.
    pub fn invalidate(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.node_mut(id)?.invalidate();
        Ok(())
    }

    /// Flags every node downstream of `id` as `Warning`. Returns the flagged nodes.
    pub fn invalidate_downstream(&mut self, id: NodeId) -> Vec<NodeId> {
        let downstream = self.downstream(id);
        for n in &downstream {
            if let Some(node) = self.nodes.get_mut(n) {
                node.invalidate();
            }
        }
        downstream
    }

    /// Validates the part of the graph fed by `source`.
    ///
    /// When `include_source` is set the source is recomputed first. If it ends in
    /// `Error`, every downstream node is invalidated; otherwise downstream nodes
    /// refresh their sources and are recomputed layer by layer, nearest first.
    pub fn validate_from(
        &mut self,
        source: NodeId,
        include_source: bool,
    ) -> Result<ValidationPass, GraphError> {
        self.node_ref(source)?;
        if include_source {
            self.recompute(source);
        }
        let source_status = self.node_ref(source)?.status;
        let layers = self.downstream_layers(source);
        log::debug!(
            "validation pass from {} over {} layer(s)",
            source,
            layers.len()
        );

        let mut pass = ValidationPass {
            source,
            source_status,
            revalidated: Vec::new(),
            invalidated: Vec::new(),
        };
        for (_, layer) in layers {
            for id in layer {
                if source_status == ValidationStatus::Error {
                    if let Some(node) = self.nodes.get_mut(&id) {
                        node.invalidate();
                    }
                    pass.invalidated.push(id);
                } else {
                    self.refresh_sources(id);
                    self.recompute(id);
                    pass.revalidated.push(id);
                }
            }
        }
        Ok(pass)
    }

    /// Validates the whole graph, starting from every source node.
    pub fn validate_all(&mut self) -> Vec<ValidationPass> {
        let sources: Vec<NodeId> = self
            .nodes()
            .filter(|n| n.is_source())
            .map(|n| n.id)
            .collect();
        let mut passes = Vec::with_capacity(sources.len());
        for source in sources {
            self.refresh_sources(source);
            if let Ok(pass) = self.validate_from(source, true) {
                passes.push(pass);
            }
        }
        passes
    }
}
