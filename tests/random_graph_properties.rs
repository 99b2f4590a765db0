use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use ragreduce::{
    CapacityMap, FallbackPolicy, GraphSnapshot, RemovalKind, ResourceAllocationGraph,
    remaining_capacity,
};
use std::collections::BTreeSet;
mod common;
use common::{ReductionHarness, assert_conserved, assert_partition, run_reduction};

const GRAPHS: u64 = 300;

/// Build a random but well-formed graph: no resource is over-allocated
fn random_snapshot(rng: &mut StdRng) -> GraphSnapshot {
    let processes: Vec<String> = (1..=rng.random_range(1..=6))
        .map(|i| format!("P{i}"))
        .collect();
    let mut snapshot = GraphSnapshot::new();
    for process in &processes {
        snapshot = snapshot.process(process.clone());
    }

    for r in 1..=rng.random_range(1..=4) {
        let resource = format!("R{r}");
        let capacity = rng.random_range(0..=3);
        snapshot = snapshot.resource(resource.clone(), capacity);

        for _ in 0..rng.random_range(0..=capacity) {
            let holder = &processes[rng.random_range(0..processes.len())];
            snapshot = snapshot.allocate(resource.clone(), holder.clone());
        }
        for _ in 0..rng.random_range(0..=3) {
            let waiter = &processes[rng.random_range(0..processes.len())];
            snapshot = snapshot.request(waiter.clone(), resource.clone());
        }
    }
    snapshot
}

/// Free units before each step, followed by the free units at the end
fn remaining_before_steps(snapshot: &GraphSnapshot, harness: &ReductionHarness) -> Vec<CapacityMap> {
    let allocation = ResourceAllocationGraph::new(snapshot).allocation_map();
    let initial = remaining_capacity(&allocation, &snapshot.capacities).unwrap();

    std::iter::once(initial)
        .chain(harness.events.iter().map(|e| {
            e.remaining_capacity
                .iter()
                .map(|(r, &free)| (r.clone(), free))
                .collect()
        }))
        .collect()
}

fn can_be_satisfied(requests: &[String], remaining: &CapacityMap) -> bool {
    requests.iter().all(|r| {
        let wanted = requests.iter().filter(|x| *x == r).count() as u32;
        remaining[r] >= wanted
    })
}

#[test]
fn test_invariants_hold_on_random_graphs() {
    for seed in 0..GRAPHS {
        let mut rng = StdRng::seed_from_u64(seed);
        let snapshot = random_snapshot(&mut rng);
        let request = ResourceAllocationGraph::new(&snapshot).request_map();

        for policy in [FallbackPolicy::DeclareDeadlock, FallbackPolicy::FewestAllocations] {
            let harness = run_reduction(&snapshot, policy);
            assert_conserved(&snapshot, &harness);
            assert_partition(&snapshot, &harness);

            let remaining = remaining_before_steps(&snapshot, &harness);

            for (i, step) in harness.outcome.steps.iter().enumerate() {
                let requests = &request[&step.process];
                match step.kind {
                    RemovalKind::Safe => assert!(
                        requests.is_empty(),
                        "seed {seed}: {} removed safely with pending requests",
                        step.process
                    ),
                    RemovalKind::Heuristic => assert!(
                        can_be_satisfied(requests, &remaining[i]),
                        "seed {seed}: heuristic victim {} was not satisfiable",
                        step.process
                    ),
                    RemovalKind::Forced => {
                        assert_eq!(policy, FallbackPolicy::FewestAllocations)
                    }
                }
            }

            let at_end = remaining.last().unwrap();
            for process in &harness.outcome.deadlocked_subset {
                assert!(
                    !can_be_satisfied(&request[process], at_end),
                    "seed {seed}: deadlocked {process} could have been satisfied"
                );
            }

            if policy == FallbackPolicy::FewestAllocations {
                assert!(harness.outcome.is_resolved(), "seed {seed}");
            }
        }
    }
}

#[test]
fn test_safe_set_independent_of_scan_order() {
    for seed in 0..GRAPHS {
        let mut rng = StdRng::seed_from_u64(seed);
        let snapshot = random_snapshot(&mut rng);

        let leading_safe = |snapshot: &GraphSnapshot| -> BTreeSet<String> {
            run_reduction(snapshot, FallbackPolicy::DeclareDeadlock)
                .outcome
                .steps
                .iter()
                .take_while(|s| s.kind == RemovalKind::Safe)
                .map(|s| s.process.clone())
                .collect()
        };

        let expected = leading_safe(&snapshot);
        for _ in 0..3 {
            let mut shuffled = snapshot.clone();
            shuffled.processes.shuffle(&mut rng);
            assert_eq!(leading_safe(&shuffled), expected, "seed {seed}");
        }
    }
}

#[test]
fn test_derived_maps_are_idempotent() {
    for seed in 0..GRAPHS {
        let mut rng = StdRng::seed_from_u64(seed);
        let snapshot = random_snapshot(&mut rng);

        let first = ResourceAllocationGraph::new(&snapshot);
        let second = ResourceAllocationGraph::new(&snapshot);
        assert_eq!(first.allocation_map(), second.allocation_map());
        assert_eq!(first.request_map(), second.request_map());
        assert_eq!(
            remaining_capacity(&first.allocation_map(), &snapshot.capacities).unwrap(),
            remaining_capacity(&second.allocation_map(), &snapshot.capacities).unwrap()
        );
    }
}
