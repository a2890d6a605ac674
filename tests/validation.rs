//! Tests for deselect-triggered validation and propagation.
mod common;

use common::*;
use opgraph::prelude::*;

#[test]
fn test_chain_validates_node_by_node() {
    let (mut graph, sink) = recording_graph();
    let (read, filter, write) = create_chain(&mut graph);

    assert_eq!(touch(&mut graph, read), Some(ValidationStatus::Validated));
    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Validated));
    assert_eq!(touch(&mut graph, write), Some(ValidationStatus::Validated));

    assert_eq!(graph.node(read).unwrap().output().unwrap().name, "scene");
    let filtered = graph.node(filter).unwrap().output().unwrap().clone();
    assert_eq!(filtered.name, "scene_filtered");
    assert_eq!(filtered.sources, vec!["scene".to_string()]);
    assert_eq!(
        graph.node(write).unwrap().output().unwrap().sources,
        vec!["scene_filtered".to_string()]
    );

    let last = sink.last_for("Write 0").unwrap();
    assert_eq!(last.severity, Severity::Ok);
    assert_eq!(last.message, "Validated");
}

#[test]
fn test_chain_visited_backwards_stays_unvalidated() {
    let (mut graph, _) = recording_graph();
    let (read, filter, write) = create_chain(&mut graph);

    assert_eq!(touch(&mut graph, write), Some(ValidationStatus::Warning));
    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Warning));
    assert_eq!(graph.status(read), Some(ValidationStatus::Unchecked));
    assert!(graph.node(write).unwrap().output().is_none());
}

#[test]
fn test_missing_inputs_give_warning() {
    let (mut graph, sink) = recording_graph();
    let filter = graph.add_node("Filter").unwrap();

    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Warning));

    let node = graph.node(filter).unwrap();
    assert!(node.output().is_none());
    assert!(!node.is_complete());
    let last = sink.last_for("Filter 0").unwrap();
    assert_eq!(last.severity, Severity::Warning);
    assert_eq!(
        last.message,
        "Some input products are missing. Node can not be validated"
    );
}

#[test]
fn test_upstream_without_output_gives_warning() {
    let (mut graph, _) = recording_graph();
    let read = graph.add_node("Read").unwrap();
    let filter = graph.add_node("Filter").unwrap();
    graph.add_connection(filter, read, 0);

    // Read is never validated, so Filter has nothing to bind.
    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Warning));
    assert!(graph.node(filter).unwrap().output().is_none());
}

#[test]
fn test_deselect_without_changes_skips_validation() {
    let (mut graph, sink) = recording_graph();
    let read = add_reader(&mut graph, "scene.dim");
    touch(&mut graph, read);
    sink.clear();

    assert_eq!(touch(&mut graph, read), None);
    assert!(sink.records().is_empty());
    assert_eq!(graph.status(read), Some(ValidationStatus::Validated));
}

#[test]
fn test_parameter_edit_revalidates_on_deselect() {
    let (mut graph, _) = recording_graph();
    let read = add_reader(&mut graph, "scene.dim");
    touch(&mut graph, read);

    graph.set_parameter(read, "file", "other/area.tif").unwrap();
    assert_eq!(touch(&mut graph, read), Some(ValidationStatus::Validated));
    assert_eq!(graph.node(read).unwrap().output().unwrap().name, "area");
}

#[test]
fn test_downstream_only_recomputes_when_visited() {
    let (mut graph, _) = recording_graph();
    let (read, filter, _) = create_chain(&mut graph);
    touch(&mut graph, read);
    touch(&mut graph, filter);

    graph.set_parameter(read, "file", "data/coast.dim").unwrap();
    touch(&mut graph, read);

    let node = graph.node(filter).unwrap();
    assert!(node.is_changed());
    assert_eq!(node.status(), ValidationStatus::Validated);
    assert_eq!(node.output().unwrap().name, "scene_filtered");

    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Validated));
    assert_eq!(
        graph.node(filter).unwrap().output().unwrap().name,
        "coast_filtered"
    );
}

#[test]
fn test_selecting_another_node_validates_the_previous_one() {
    let (mut graph, _) = recording_graph();
    let read = add_reader(&mut graph, "scene.dim");
    let filter = graph.add_node("Filter").unwrap();

    graph.select(read).unwrap();
    graph.select(filter).unwrap();

    assert_eq!(graph.status(read), Some(ValidationStatus::Validated));
    assert_eq!(graph.status(filter), Some(ValidationStatus::Unchecked));
}

#[test]
fn test_missing_required_parameter_gives_warning() {
    let (mut graph, sink) = recording_graph();
    let read = graph.add_node("Read").unwrap();

    assert_eq!(touch(&mut graph, read), Some(ValidationStatus::Warning));
    let last = sink.last_for("Read 0").unwrap();
    assert_eq!(last.severity, Severity::Warning);
    assert!(last.message.starts_with("Operator UI could not be validated"));
    assert!(last.message.contains("file"));
}

#[test]
fn test_mistyped_parameter_gives_error() {
    let (mut graph, sink) = recording_graph();
    let read = add_reader(&mut graph, "scene.dim");
    let filter = graph.add_node("Filter").unwrap();
    graph.add_connection(filter, read, 0);
    touch(&mut graph, read);

    graph.set_parameter(filter, "iterations", "many").unwrap();
    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Error));

    let last = sink.last_for("Filter 0").unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(last.message.contains("iterations"));
}

#[test]
fn test_unserializable_configuration_gives_error() {
    let (mut graph, sink) = recording_graph();
    let read = add_reader(&mut graph, "scene.dim");
    let filter = graph.add_node("Filter").unwrap();
    graph.add_connection(filter, read, 0);
    touch(&mut graph, read);

    graph.set_parameter(filter, "iterations", f64::NAN).unwrap();
    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Error));
    assert!(
        sink.last_for("Filter 0")
            .unwrap()
            .message
            .starts_with("could not retrieve configuration")
    );
}

#[test]
fn test_operator_failure_gives_error() {
    let (mut graph, sink) = recording_graph();
    let read = add_reader(&mut graph, "scene.dim");
    let filter = graph.add_node("Filter").unwrap();
    graph.add_connection(filter, read, 0);
    touch(&mut graph, read);

    graph.set_parameter(filter, "iterations", 0.5).unwrap();
    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Error));

    let node = graph.node(filter).unwrap();
    assert!(node.output().is_none());
    let last = sink.last_for("Filter 0").unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(last.message.contains("must be a positive integer"));
}

#[test]
fn test_failure_invalidates_everything_downstream() {
    let (mut graph, _) = recording_graph_with_test_operators();
    let read = add_reader(&mut graph, "scene.dim");
    let failing = graph.add_node("Failing").unwrap();
    let filter = graph.add_node("Filter").unwrap();
    let write = graph.add_node("Write").unwrap();
    graph.add_connection(failing, read, 0);
    graph.add_connection(filter, failing, 0);
    graph.add_connection(write, filter, 0);
    touch(&mut graph, read);

    assert_eq!(touch(&mut graph, failing), Some(ValidationStatus::Error));
    for id in [filter, write] {
        let node = graph.node(id).unwrap();
        assert_eq!(node.status(), ValidationStatus::Warning);
        assert!(node.needs_validation());
    }
    assert_eq!(graph.status(read), Some(ValidationStatus::Validated));
}

#[test]
fn test_recovered_node_validates_again() {
    let (mut graph, _) = recording_graph();
    let (read, filter, write) = create_chain(&mut graph);
    for id in [read, filter, write] {
        touch(&mut graph, id);
    }

    graph.set_parameter(filter, "iterations", 0.0).unwrap();
    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Error));
    assert_eq!(graph.status(write), Some(ValidationStatus::Warning));

    graph.set_parameter(filter, "iterations", 2.0).unwrap();
    assert_eq!(touch(&mut graph, filter), Some(ValidationStatus::Validated));
    assert_eq!(touch(&mut graph, write), Some(ValidationStatus::Validated));
}

#[test]
fn test_unbounded_node_binds_variable_tail() {
    let (mut graph, _) = recording_graph();
    let merge = graph.add_node("BandMerge").unwrap();
    for (slot, file) in ["a.dim", "b.dim", "c.dim"].into_iter().enumerate() {
        let read = add_reader(&mut graph, file);
        touch(&mut graph, read);
        assert!(graph.add_connection(merge, read, slot));
    }

    assert_eq!(touch(&mut graph, merge), Some(ValidationStatus::Validated));
    let output = graph.node(merge).unwrap().output().unwrap().clone();
    assert_eq!(output.name, "a_merged");
    assert_eq!(output.sources, vec!["a", "b", "c"]);
    assert_eq!(
        output.attributes.get("mergedCount"),
        Some(&ParamValue::Number(3.0))
    );
}

#[test]
fn test_missing_product_in_tail_gives_warning() {
    let (mut graph, _) = recording_graph();
    let a = add_reader(&mut graph, "a.dim");
    let b = add_reader(&mut graph, "b.dim");
    let merge = graph.add_node("BandMerge").unwrap();
    graph.add_connection(merge, a, 0);
    graph.add_connection(merge, b, 1);
    touch(&mut graph, a);

    assert_eq!(touch(&mut graph, merge), Some(ValidationStatus::Warning));
}

#[test]
fn test_named_sources_bind_by_position() {
    let (mut graph, _) = recording_graph_with_test_operators();
    let master = add_reader(&mut graph, "master.dim");
    let slave = add_reader(&mut graph, "slave.dim");
    let pair = graph.add_node("Pair").unwrap();
    graph.add_connection(pair, slave, 0);
    graph.add_connection(pair, master, 1);
    touch(&mut graph, master);
    touch(&mut graph, slave);

    assert_eq!(touch(&mut graph, pair), Some(ValidationStatus::Validated));
    assert_eq!(
        graph.node(pair).unwrap().output().unwrap().name,
        "slave+master"
    );
}

#[test]
fn test_selecting_changed_node_refreshes_its_sources() {
    let (mut graph, _) = recording_graph();
    let read = add_reader(&mut graph, "scene.dim");
    let filter = graph.add_node("Filter").unwrap();
    graph.add_connection(filter, read, 0);
    touch(&mut graph, read);

    graph.select(filter).unwrap();
    let node = graph.node(filter).unwrap();
    assert!(!node.is_changed());
    assert!(node.needs_validation());
}

#[test]
fn test_invalidate_only_flags_the_node() {
    let (mut graph, _) = recording_graph();
    let read = add_reader(&mut graph, "scene.dim");
    touch(&mut graph, read);

    graph.invalidate(read).unwrap();

    let node = graph.node(read).unwrap();
    assert_eq!(node.status(), ValidationStatus::Warning);
    assert!(node.output().is_some());
    assert!(node.needs_validation());
    assert_eq!(touch(&mut graph, read), Some(ValidationStatus::Validated));
}

#[test]
fn test_validate_from_walks_downstream_nearest_first() {
    let (mut graph, _) = recording_graph();
    let (read, filter, write) = create_chain(&mut graph);

    let pass = graph.validate_from(read, true).unwrap();

    assert!(pass.succeeded());
    assert_eq!(pass.source_status, ValidationStatus::Validated);
    assert_eq!(pass.revalidated, vec![filter, write]);
    assert!(pass.invalidated.is_empty());
    assert_eq!(graph.status(write), Some(ValidationStatus::Validated));
}

#[test]
fn test_validate_from_failed_source_invalidates_downstream() {
    let (mut graph, _) = recording_graph();
    let (read, filter, write) = create_chain(&mut graph);
    graph.set_parameter(read, "formatName", 3.0).unwrap();

    let pass = graph.validate_from(read, true).unwrap();

    assert!(!pass.succeeded());
    assert_eq!(pass.source_status, ValidationStatus::Error);
    assert!(pass.revalidated.is_empty());
    assert_eq!(pass.invalidated, vec![filter, write]);
    assert_eq!(graph.status(filter), Some(ValidationStatus::Warning));
    assert_eq!(graph.status(write), Some(ValidationStatus::Warning));
}

#[test]
fn test_validate_from_without_source_uses_cached_status() {
    let (mut graph, _) = recording_graph();
    let (read, filter, write) = create_chain(&mut graph);
    touch(&mut graph, read);

    let pass = graph.validate_from(read, false).unwrap();
    assert_eq!(pass.source_status, ValidationStatus::Validated);
    assert_eq!(pass.revalidated, vec![filter, write]);
}

#[test]
fn test_validate_all_starts_from_every_source() {
    let (mut graph, _) = recording_graph();
    let a = add_reader(&mut graph, "a.dim");
    let b = add_reader(&mut graph, "b.dim");
    let merge = graph.add_node("BandMerge").unwrap();
    graph.add_connection(merge, a, 0);
    graph.add_connection(merge, b, 1);

    let passes = graph.validate_all();

    assert_eq!(passes.len(), 2);
    assert!(passes.iter().all(ValidationPass::succeeded));
    assert_eq!(graph.status(merge), Some(ValidationStatus::Validated));
    assert_eq!(
        graph.node(merge).unwrap().output().unwrap().sources,
        vec!["a", "b"]
    );
}

#[test]
fn test_validate_node_matches_deselect() {
    let (mut graph, _) = recording_graph();
    let filter = graph.add_node("Filter").unwrap();

    assert_eq!(graph.validate_node(filter), Ok(ValidationStatus::Warning));
    graph.remove_node(filter).unwrap();
    assert_eq!(
        graph.validate_node(filter),
        Err(GraphError::NodeNotFound(filter))
    );
}
