pub mod heuristic;

use crate::core::accountant::CapacityLedger;
use crate::core::error::Result;
use crate::core::graph::{GraphSnapshot, ResourceAllocationGraph};
use crate::core::logger::{EventLogger, GraphState};
use crate::core::types::{
    AllocationMap, ProcessId, ReductionOutcome, RemovalEvent, RemovalKind, RemovalStep, RequestMap,
    ResourceId,
};
use chrono::Utc;
use heuristic::{FallbackPolicy, Victim, choose_victim};
use std::collections::BTreeMap;

/// Receives every removal as it happens
pub trait RemovalObserver {
    fn on_removal(&mut self, event: &RemovalEvent);
}

impl<F> RemovalObserver for F
where
    F: FnMut(&RemovalEvent),
{
    fn on_removal(&mut self, event: &RemovalEvent) {
        self(event)
    }
}

/// State of a single reduction run
///
/// The engine owns private copies of the allocation and request maps and of
/// the capacity ledger; the snapshot it was built from is never modified.
///
/// # How it works
///
/// 1. *Safe reduction*: any active process with no pending request can run
///    to completion. It is removed, its units are released, and the scan
///    restarts from the first active process.
/// 2. *Victim selection*: when every active process still waits for
///    something, [`choose_victim`] picks the next process to remove. After
///    each such removal, safe reduction runs again.
/// 3. When no victim can be picked, the remaining processes are reported as
///    deadlocked.
///
/// Every iteration either removes exactly one process or stops, so a run
/// takes at most as many steps as there are processes.
pub struct ReductionEngine<'a> {
    snapshot: &'a GraphSnapshot,
    active: Vec<ProcessId>,
    allocation: AllocationMap,
    request: RequestMap,
    ledger: CapacityLedger,
    steps: Vec<RemovalStep>,
}

impl<'a> ReductionEngine<'a> {
    /// Prepare a run over a snapshot
    ///
    /// All structural checks happen here, before any state is mutated.
    ///
    /// # Errors
    /// Any validation error of the snapshot, `UnknownResource` or
    /// `OverAllocated` from the capacity accounting.
    pub fn new(snapshot: &'a GraphSnapshot) -> Result<Self> {
        snapshot.validate()?;

        let rag = ResourceAllocationGraph::new(snapshot);
        let allocation = rag.allocation_map();
        let request = rag.request_map();
        let ledger = CapacityLedger::new(&allocation, &snapshot.capacities)?;

        Ok(Self {
            snapshot,
            active: snapshot.processes.clone(),
            allocation,
            request,
            ledger,
            steps: Vec::with_capacity(snapshot.processes.len()),
        })
    }

    /// Processes not removed yet, in scan order
    pub fn active(&self) -> &[ProcessId] {
        &self.active
    }

    pub fn allocation(&self) -> &AllocationMap {
        &self.allocation
    }

    pub fn request(&self) -> &RequestMap {
        &self.request
    }

    pub fn ledger(&self) -> &CapacityLedger {
        &self.ledger
    }

    /// Run the reduction to completion
    ///
    /// # Arguments
    /// * `policy` - What to do when no victim satisfies its requests
    /// * `observer` - Called once per removal, in trace order
    /// * `logger` - Optional event log receiving every step and the outcome
    pub fn run(
        mut self,
        policy: FallbackPolicy,
        observer: &mut dyn RemovalObserver,
        logger: Option<&EventLogger>,
    ) -> ReductionOutcome {
        let mut deadlocked_subset = Vec::new();

        loop {
            while let Some(process) = self.next_safe() {
                self.remove(
                    Victim {
                        process,
                        kind: RemovalKind::Safe,
                    },
                    observer,
                    logger,
                );
            }

            if self.active.is_empty() {
                break;
            }

            match choose_victim(
                policy,
                &self.active,
                &self.allocation,
                &self.request,
                &self.ledger,
            ) {
                Some(victim) => self.remove(victim, observer, logger),
                None => {
                    deadlocked_subset = self.active.clone();
                    break;
                }
            }
        }

        let outcome = ReductionOutcome {
            removed_trace: self.steps.iter().map(|s| s.process.clone()).collect(),
            steps: self.steps,
            deadlocked_subset,
            finished_at: Utc::now().to_rfc3339(),
        };

        if let Some(logger) = logger {
            logger.log_outcome(&outcome);
        }
        outcome
    }

    /// First active process with an empty request list
    fn next_safe(&self) -> Option<ProcessId> {
        self.active
            .iter()
            .find(|p| self.request.get(*p).is_none_or(Vec::is_empty))
            .cloned()
    }

    /// Remove a process, release its units and report the step
    fn remove(
        &mut self,
        victim: Victim,
        observer: &mut dyn RemovalObserver,
        logger: Option<&EventLogger>,
    ) {
        let Victim { process, kind } = victim;

        self.active.retain(|p| *p != process);
        let released = self.allocation.remove(&process).unwrap_or_default();
        self.request.remove(&process);
        for resource in &released {
            self.ledger.release(resource);
        }

        debug_assert!(self.ledger.is_conserved(&self.allocation));

        let step = self.steps.len();
        self.steps.push(RemovalStep {
            process: process.clone(),
            kind,
        });

        if let Some(logger) = logger {
            let graph = GraphState::capture(
                &self.active,
                &self.snapshot.resources,
                &self.allocation,
                &self.request,
                self.ledger.totals(),
                self.ledger.remaining(),
            );
            logger.log_removal(step, &process, kind, &released, &graph);
        }

        let event = RemovalEvent {
            step,
            process,
            kind,
            released,
            remaining_capacity: self.remaining_snapshot(),
            active: self.active.clone(),
        };
        observer.on_removal(&event);
    }

    fn remaining_snapshot(&self) -> BTreeMap<ResourceId, u32> {
        self.ledger
            .remaining()
            .iter()
            .map(|(r, &free)| (r.clone(), free))
            .collect()
    }
}
