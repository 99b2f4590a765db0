use ragreduce::{EditorGraph, FallbackPolicy, RagError};
use std::fs;
mod common;
use common::run_reduction;

const SAVED_GRAPH: &str = r#"{
    "nodes": ["P1", "P2", "P3", "R1 (1)", "R2 (2)"],
    "edges": [
        ["R1 (1)", "P1"],
        ["P1", "R2 (2)"],
        ["R2 (2)", "P2"],
        ["R2 (2)", "P2"],
        ["P2", "R1 (1)"],
        ["P3", "R2 (2)"]
    ],
    "node_positions": {
        "P1": [1.0, 1.0], "P2": [3.0, 1.0], "P3": [5.0, 1.0],
        "R1 (1)": [2.0, 4.0], "R2 (2)": [4.0, 4.0]
    },
    "node_indexes": {"process": 4, "resource": 3}
}"#;

#[test]
fn test_saved_graph_reduces_to_deadlock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.txt");
    fs::write(&path, SAVED_GRAPH).unwrap();

    let document = EditorGraph::load(&path).unwrap();
    let snapshot = document.extract().unwrap();
    assert_eq!(snapshot.resources, vec!["R1", "R2"]);
    assert_eq!(snapshot.capacities["R2"], 2);

    // P3 waits for R2 but both units sit with P2, which waits on P1
    let harness = run_reduction(&snapshot, FallbackPolicy::DeclareDeadlock);
    assert!(harness.outcome.removed_trace.is_empty());
    assert_eq!(harness.outcome.deadlocked_subset, vec!["P1", "P2", "P3"]);
}

#[test]
fn test_removed_processes_lose_their_edges() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("graph.txt");
    let output = dir.path().join("reduced.txt");
    fs::write(&input, SAVED_GRAPH).unwrap();

    let mut document = EditorGraph::load(&input).unwrap();
    let snapshot = document.extract().unwrap();
    let harness = run_reduction(&snapshot, FallbackPolicy::FewestAllocations);
    assert!(harness.outcome.is_resolved());

    for process in &harness.outcome.removed_trace {
        document.remove_process_edges(process);
    }
    document.save(&output).unwrap();

    let reduced = EditorGraph::load(&output).unwrap();
    assert!(reduced.edges.is_empty());
    assert_eq!(reduced.nodes.len(), 5);
    assert_eq!(reduced.node_positions.len(), 5);
    assert_eq!(reduced.node_indexes, document.node_indexes);
}

#[test]
fn test_malformed_capacity_is_reported() {
    let document: EditorGraph = serde_json::from_str(
        r#"{"nodes": ["P1", "R1 (lots)"], "edges": [["P1", "R1 (lots)"]]}"#,
    )
    .unwrap();

    match document.extract() {
        Err(RagError::MalformedCapacity { label }) => assert_eq!(label, "R1 (lots)"),
        other => panic!("Expected MalformedCapacity, got {other:?}"),
    }
}

#[test]
fn test_missing_file_has_context() {
    let dir = tempfile::tempdir().unwrap();
    let err = EditorGraph::load(dir.path().join("nope.txt")).unwrap_err();
    assert!(err.to_string().contains("Failed to open graph file"));
}
