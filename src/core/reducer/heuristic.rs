//! Victim selection once safe reduction stalls
//!
//! When every remaining process still waits for something, the engine has
//! to pick one to remove. A process is a *candidate* if, for each resource
//! it requests, that resource has free units and at least as many free
//! units as the process itself asks for. The first candidate (scan order)
//! whose requests are all currently free becomes the victim.
//!
//! If no process qualifies, the [`FallbackPolicy`] decides whether the run
//! stops with a deadlock or forces a process out anyway.

use crate::core::accountant::CapacityLedger;
use crate::core::types::{AllocationMap, ProcessId, RemovalKind, RequestMap, ResourceId};
use serde::{Deserialize, Serialize};

/// What to do when no process can be satisfied with the free units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackPolicy {
    /// Stop and report every remaining process as deadlocked
    #[default]
    DeclareDeadlock,
    /// Remove the process holding the fewest units and keep reducing
    ///
    /// Ties go to the first process in scan order. With this policy every
    /// run ends with all processes removed.
    FewestAllocations,
}

/// The process picked for removal and how it was picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Victim {
    pub process: ProcessId,
    pub kind: RemovalKind,
}

/// Whether the free units cover this process's own requests
///
/// Each requested resource must have a free unit, and at least as many
/// free units as the number of times the process requests it.
pub fn is_candidate(requests: &[ResourceId], ledger: &CapacityLedger) -> bool {
    requests.iter().all(|resource| {
        let free = ledger.available(resource);
        let wanted = requests.iter().filter(|r| *r == resource).count();
        free > 0 && free as usize >= wanted
    })
}

/// Whether every requested resource has at least one free unit
pub fn all_requests_free(requests: &[ResourceId], ledger: &CapacityLedger) -> bool {
    requests.iter().all(|resource| ledger.available(resource) > 0)
}

/// Pick the next process to remove among `active`
///
/// # Returns
/// * `Some(victim)` - a `Heuristic` victim, or a `Forced` one chosen by the
///   fallback policy
/// * `None` - the remaining processes are deadlocked
pub fn choose_victim(
    policy: FallbackPolicy,
    active: &[ProcessId],
    allocation: &AllocationMap,
    request: &RequestMap,
    ledger: &CapacityLedger,
) -> Option<Victim> {
    let requests_of = |process: &ProcessId| request.get(process).map(Vec::as_slice).unwrap_or(&[]);

    let satisfiable = active
        .iter()
        .filter(|p| is_candidate(requests_of(*p), ledger))
        .find(|p| all_requests_free(requests_of(*p), ledger));

    if let Some(process) = satisfiable {
        return Some(Victim {
            process: process.clone(),
            kind: RemovalKind::Heuristic,
        });
    }

    match policy {
        FallbackPolicy::DeclareDeadlock => None,
        FallbackPolicy::FewestAllocations => active
            .iter()
            .min_by_key(|p| allocation.get(*p).map_or(0, Vec::len))
            .map(|process| Victim {
                process: process.clone(),
                kind: RemovalKind::Forced,
            }),
    }
}
