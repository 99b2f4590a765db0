use ragreduce::{
    FallbackPolicy, GraphSnapshot, Reducer, ReductionOutcome, RemovalEvent,
    ResourceAllocationGraph,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex as StdMutex};

pub struct ReductionHarness {
    pub outcome: ReductionOutcome,
    pub events: Vec<RemovalEvent>,
}

pub fn run_reduction(snapshot: &GraphSnapshot, policy: FallbackPolicy) -> ReductionHarness {
    let events = Arc::new(StdMutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    let outcome = Reducer::new()
        .fallback(policy)
        .on_removal(move |event| sink.lock().unwrap().push(event.clone()))
        .run(snapshot)
        .expect("Snapshot should be valid");

    let events = events.lock().unwrap().clone();
    ReductionHarness { outcome, events }
}

/// Every unit is either free or held by a process that is still active
#[allow(dead_code)]
pub fn assert_conserved(snapshot: &GraphSnapshot, harness: &ReductionHarness) {
    let allocation = ResourceAllocationGraph::new(snapshot).allocation_map();

    for event in &harness.events {
        for resource in &snapshot.resources {
            let held = event
                .active
                .iter()
                .flat_map(|p| allocation[p].iter())
                .filter(|r| *r == resource)
                .count() as u32;
            assert_eq!(
                event.remaining_capacity[resource] + held,
                snapshot.capacities[resource],
                "units of {resource} not conserved after step {}",
                event.step
            );
        }
    }
}

/// Each step removes exactly one process, and removed plus deadlocked
/// processes are exactly the declared ones
#[allow(dead_code)]
pub fn assert_partition(snapshot: &GraphSnapshot, harness: &ReductionHarness) {
    let outcome = &harness.outcome;
    let mut previous = snapshot.processes.len();
    for event in &harness.events {
        assert_eq!(event.active.len() + 1, previous, "step {} did not remove one process", event.step);
        previous = event.active.len();
    }
    assert!(harness.events.len() <= snapshot.processes.len());

    let removed: BTreeSet<_> = outcome.removed_trace.iter().collect();
    let deadlocked: BTreeSet<_> = outcome.deadlocked_subset.iter().collect();
    let declared: BTreeSet<_> = snapshot.processes.iter().collect();

    assert_eq!(removed.len(), outcome.removed_trace.len(), "process removed twice");
    assert!(removed.is_disjoint(&deadlocked));
    assert_eq!(
        removed.union(&deadlocked).copied().collect::<BTreeSet<_>>(),
        declared
    );
}
