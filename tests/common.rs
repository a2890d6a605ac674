//! Common test utilities for building graphs and operators.
use opgraph::prelude::*;
use std::sync::Arc;

/// A graph over the built-in operators whose notifications are recorded.
#[allow(dead_code)]
pub fn recording_graph() -> (Graph, MemorySink) {
    let sink = MemorySink::new();
    let context = GraphContext::with_sink(Arc::new(sink.clone()));
    (Graph::new(OperatorRegistry::with_defaults(), context), sink)
}

/// Same as [`recording_graph`], with the test operators registered as well.
#[allow(dead_code)]
pub fn recording_graph_with_test_operators() -> (Graph, MemorySink) {
    let sink = MemorySink::new();
    let context = GraphContext::with_sink(Arc::new(sink.clone()));
    let registry = OperatorRegistry::with_defaults()
        .with_operator(Arc::new(FailingOperator::new()))
        .with_operator(Arc::new(PairOperator::new()));
    (Graph::new(registry, context), sink)
}

/// Builds `Read -> Filter -> Write` with file parameters set on Read and Write.
///
/// Nothing is validated yet.
#[allow(dead_code)]
pub fn create_chain(graph: &mut Graph) -> (NodeId, NodeId, NodeId) {
    let read = graph.add_node("Read").expect("add Read");
    let filter = graph.add_node("Filter").expect("add Filter");
    let write = graph.add_node("Write").expect("add Write");
    assert!(graph.add_connection(filter, read, 0));
    assert!(graph.add_connection(write, filter, 0));
    graph.set_parameter(read, "file", "data/scene.dim").expect("set file");
    graph
        .set_parameter(write, "file", "out/result.dim")
        .expect("set file");
    (read, filter, write)
}

/// A `Read` node pointing at `file`.
#[allow(dead_code)]
pub fn add_reader(graph: &mut Graph, file: &str) -> NodeId {
    let id = graph.add_node("Read").expect("add Read");
    graph.set_parameter(id, "file", file).expect("set file");
    id
}

/// Simulates the user clicking a node and then leaving it.
#[allow(dead_code)]
pub fn touch(graph: &mut Graph, id: NodeId) -> Option<ValidationStatus> {
    graph.select(id).expect("select");
    graph.deselect()
}

/// Single-input operator whose computation always fails.
pub struct FailingOperator {
    metadata: OperatorMetadata,
}

impl FailingOperator {
    pub fn new() -> Self {
        Self {
            metadata: OperatorMetadata::new("Failing", "Test")
                .with_inputs(1, Some(1))
                .with_sources(&["sourceProduct"]),
        }
    }
}

impl Operator for FailingOperator {
    fn metadata(&self) -> &OperatorMetadata {
        &self.metadata
    }

    fn compute(&self, _: &SourceProducts, _: &ParamMap) -> Result<Product, OperatorError> {
        Err(OperatorError::Failed("disk full".to_string()))
    }
}

/// Operator with two named sources and at most two inputs.
pub struct PairOperator {
    metadata: OperatorMetadata,
}

impl PairOperator {
    pub fn new() -> Self {
        Self {
            metadata: OperatorMetadata::new("Pair", "Test")
                .with_inputs(2, Some(2))
                .with_sources(&["master", "slave"]),
        }
    }
}

impl Operator for PairOperator {
    fn metadata(&self) -> &OperatorMetadata {
        &self.metadata
    }

    fn compute(
        &self,
        sources: &SourceProducts,
        _: &ParamMap,
    ) -> Result<Product, OperatorError> {
        let master = sources
            .get("master")
            .ok_or_else(|| OperatorError::MissingSource("master".to_string()))?;
        let slave = sources
            .get("slave")
            .ok_or_else(|| OperatorError::MissingSource("slave".to_string()))?;
        let mut product = Product::new(format!("{}+{}", master.name, slave.name), "Pair");
        product.sources = vec![master.name.clone(), slave.name.clone()];
        Ok(product)
    }
}
