use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Process identifier type
///
/// Uniquely identifies a process node in the resource allocation graph.
pub type ProcessId = String;

/// Resource identifier type
///
/// Uniquely identifies a resource node. The capacity of a resource is kept
/// separately in a [`CapacityMap`] and never encoded in the identifier.
pub type ResourceId = String;

/// Resources currently held by each process, one entry per held unit
pub type AllocationMap = FxHashMap<ProcessId, Vec<ResourceId>>;

/// Resources each process is waiting for, one entry per awaited unit
pub type RequestMap = FxHashMap<ProcessId, Vec<ResourceId>>;

/// Units per resource (total or remaining, depending on context)
pub type CapacityMap = FxHashMap<ResourceId, u32>;

/// The role a node plays in the graph
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A process that holds and requests resource units
    Process,
    /// A resource with a fixed number of interchangeable units
    Resource,
}

/// How a process left the graph during reduction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RemovalKind {
    /// The process had no pending requests and ran to completion
    Safe,
    /// Every unit the process waits for is free, so it was picked to run next
    Heuristic,
    /// Picked by the fallback policy even though its requests cannot be met
    Forced,
}

/// A single removal performed by the reduction engine
///
/// Events are produced synchronously, one per removed process, in the same
/// order as the removal trace. `remaining_capacity` and `active` describe
/// the graph right after the removal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemovalEvent {
    /// Zero-based position of this removal in the trace
    pub step: usize,
    /// The process that was removed
    pub process: ProcessId,
    /// Why the process could be removed
    pub kind: RemovalKind,
    /// Units handed back to their resources, one entry per unit
    pub released: Vec<ResourceId>,
    /// Free units per resource after the release
    pub remaining_capacity: BTreeMap<ResourceId, u32>,
    /// Processes still in the graph, in scan order
    pub active: Vec<ProcessId>,
}

/// One entry of the removal trace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemovalStep {
    pub process: ProcessId,
    pub kind: RemovalKind,
}

/// Represents the result of a reduction run
///
/// A non-empty `deadlocked_subset` means the reduction could not finish:
/// those processes are still waiting on each other. This is an ordinary
/// result, not an error, and the caller decides how to react to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionOutcome {
    /// Removed processes, in removal order
    pub removed_trace: Vec<ProcessId>,

    /// The same removals annotated with how each one was decided
    pub steps: Vec<RemovalStep>,

    /// Processes left in an unresolvable deadlock, in scan order
    ///
    /// Empty when the graph was fully reduced.
    pub deadlocked_subset: Vec<ProcessId>,

    /// RFC 3339 timestamp of when the run finished
    pub finished_at: String,
}

impl ReductionOutcome {
    /// Whether every process was removed
    pub fn is_resolved(&self) -> bool {
        self.deadlocked_subset.is_empty()
    }

    /// Whether a deadlock was encountered at all
    ///
    /// This is true for an unresolved run and also for a run that only
    /// finished because the fallback policy forced a process out.
    pub fn deadlock_detected(&self) -> bool {
        !self.deadlocked_subset.is_empty()
            || self.steps.iter().any(|s| s.kind == RemovalKind::Forced)
    }
}
