//! Capacity accounting for resource units
//!
//! The remaining capacity of a resource is its total capacity minus the
//! units currently allocated to active processes. During a reduction the
//! [`CapacityLedger`] owns those numbers and only ever moves them upward,
//! one unit per released allocation.

use crate::core::error::{RagError, Result};
use crate::core::types::{AllocationMap, CapacityMap};
use fxhash::FxHashMap;

/// Compute the free units of every resource
///
/// # Arguments
/// * `allocation` - Units held per process, one entry per unit
/// * `capacity` - Total units per resource
///
/// # Errors
/// - `UnknownResource` if an allocation names a resource with no capacity
/// - `OverAllocated` if a resource has more units allocated than it owns
pub fn remaining_capacity(allocation: &AllocationMap, capacity: &CapacityMap) -> Result<CapacityMap> {
    let mut allocated: FxHashMap<&str, usize> = FxHashMap::default();
    for held in allocation.values() {
        for resource in held {
            if !capacity.contains_key(resource) {
                return Err(RagError::UnknownResource(resource.clone()));
            }
            *allocated.entry(resource.as_str()).or_default() += 1;
        }
    }

    capacity
        .iter()
        .map(|(resource, &total)| {
            let used = allocated.get(resource.as_str()).copied().unwrap_or(0);
            u32::try_from(used)
                .ok()
                .and_then(|used| total.checked_sub(used))
                .map(|free| (resource.clone(), free))
                .ok_or_else(|| RagError::OverAllocated {
                    resource: resource.clone(),
                    capacity: total,
                    allocated: used,
                })
        })
        .collect()
}

/// Per-run bookkeeping of total and remaining units
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    totals: CapacityMap,
    remaining: CapacityMap,
}

impl CapacityLedger {
    /// Create a ledger from the allocations present at the start of a run
    pub fn new(allocation: &AllocationMap, capacity: &CapacityMap) -> Result<Self> {
        Ok(Self {
            remaining: remaining_capacity(allocation, capacity)?,
            totals: capacity.clone(),
        })
    }

    /// Free units of a resource (zero for unknown resources)
    pub fn available(&self, resource: &str) -> u32 {
        self.remaining.get(resource).copied().unwrap_or(0)
    }

    /// Hand one unit back to a resource
    pub fn release(&mut self, resource: &str) {
        let total = self.totals.get(resource).copied().unwrap_or(0);
        if let Some(free) = self.remaining.get_mut(resource) {
            debug_assert!(*free < total, "released more units of {resource} than it owns");
            *free = (*free + 1).min(total);
        }
    }

    pub fn totals(&self) -> &CapacityMap {
        &self.totals
    }

    pub fn remaining(&self) -> &CapacityMap {
        &self.remaining
    }

    /// Check that every unit is either free or held by an active process
    pub fn is_conserved(&self, allocation: &AllocationMap) -> bool {
        match remaining_capacity(allocation, &self.totals) {
            Ok(expected) => expected == self.remaining,
            Err(_) => false,
        }
    }
}
