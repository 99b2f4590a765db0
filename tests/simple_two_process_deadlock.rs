use ragreduce::{FallbackPolicy, GraphSnapshot, RemovalKind};
mod common;
use common::{assert_conserved, assert_partition, run_reduction};

fn classic_cycle() -> GraphSnapshot {
    GraphSnapshot::new()
        .process("P1")
        .process("P2")
        .resource("R1", 1)
        .resource("R2", 1)
        .allocate("R1", "P1")
        .request("P1", "R2")
        .allocate("R2", "P2")
        .request("P2", "R1")
}

#[test]
fn test_simple_two_process_deadlock() {
    let snapshot = classic_cycle();
    let harness = run_reduction(&snapshot, FallbackPolicy::DeclareDeadlock);
    let outcome = &harness.outcome;

    assert!(outcome.removed_trace.is_empty());
    assert!(harness.events.is_empty());
    assert_eq!(outcome.deadlocked_subset, vec!["P1", "P2"]);
    assert!(!outcome.is_resolved());
    assert_partition(&snapshot, &harness);
}

#[test]
fn test_deadlock_after_partial_reduction() {
    // P0 can finish, the P1/P2 cycle cannot
    let snapshot = classic_cycle()
        .process("P0")
        .resource("R3", 2)
        .allocate("R3", "P0")
        .allocate("R3", "P1");

    let harness = run_reduction(&snapshot, FallbackPolicy::DeclareDeadlock);
    let outcome = &harness.outcome;

    assert_eq!(outcome.removed_trace, vec!["P0"]);
    assert_eq!(outcome.steps[0].kind, RemovalKind::Safe);
    assert_eq!(outcome.deadlocked_subset, vec!["P1", "P2"]);
    assert_eq!(harness.events[0].remaining_capacity["R3"], 1);
    assert_conserved(&snapshot, &harness);
    assert_partition(&snapshot, &harness);
}

#[test]
fn test_process_needing_two_units_of_single_free_unit_deadlocks() {
    // One unit of R1 is free but P2 needs two of them
    let snapshot = GraphSnapshot::new()
        .process("P1")
        .process("P2")
        .resource("R1", 2)
        .resource("R2", 1)
        .allocate("R1", "P1")
        .request("P1", "R2")
        .allocate("R2", "P2")
        .request("P2", "R1")
        .request("P2", "R1");

    let harness = run_reduction(&snapshot, FallbackPolicy::DeclareDeadlock);

    assert!(harness.outcome.removed_trace.is_empty());
    assert_eq!(harness.outcome.deadlocked_subset, vec!["P1", "P2"]);
}
