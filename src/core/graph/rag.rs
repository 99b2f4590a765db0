//! Allocation and request maps derived from a snapshot
//!
//! The graph is first flattened into an adjacency list
//! `node -> [successors]`. Since every edge joins a process and a resource,
//! the two halves of that list read directly as reduction state:
//! 1. *Process rows* are request lists: `P -> R` means P waits for R.
//! 2. *Resource rows* list the holders: `R -> P` means P holds a unit of R,
//!    so inverting them gives each process its allocation list.

use crate::core::graph::snapshot::GraphSnapshot;
use crate::core::types::{AllocationMap, RequestMap};
use fxhash::FxHashMap;

/// Adjacency view over a borrowed snapshot
pub struct ResourceAllocationGraph<'a> {
    snapshot: &'a GraphSnapshot,
    adjacency: FxHashMap<&'a str, Vec<&'a str>>,
}

impl<'a> ResourceAllocationGraph<'a> {
    /// Build the adjacency list for a snapshot
    ///
    /// Every declared node gets a row, even without edges. Only edges that
    /// pass validation are included.
    pub fn new(snapshot: &'a GraphSnapshot) -> Self {
        let mut adjacency: FxHashMap<&str, Vec<&str>> = snapshot
            .processes
            .iter()
            .chain(snapshot.resources.iter())
            .map(|node| (node.as_str(), Vec::new()))
            .collect();

        for (_, from, to) in snapshot.classified_edges() {
            adjacency.entry(from).or_default().push(to);
        }

        Self {
            snapshot,
            adjacency,
        }
    }

    /// Successors of a node, in edge order
    pub fn successors(&self, node: &str) -> &[&'a str] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resources each process is waiting for
    ///
    /// Every process is a key, with an empty list if it requests nothing.
    pub fn request_map(&self) -> RequestMap {
        self.snapshot
            .processes
            .iter()
            .map(|process| {
                let requests = self
                    .successors(process)
                    .iter()
                    .map(|r| r.to_string())
                    .collect();
                (process.clone(), requests)
            })
            .collect()
    }

    /// Resources each process is holding
    ///
    /// Entries are grouped by resource in declaration order. Every process
    /// is a key, with an empty list if it holds nothing.
    pub fn allocation_map(&self) -> AllocationMap {
        let mut allocation: AllocationMap = self
            .snapshot
            .processes
            .iter()
            .map(|process| (process.clone(), Vec::new()))
            .collect();

        for resource in &self.snapshot.resources {
            for &holder in self.successors(resource) {
                if let Some(held) = allocation.get_mut(holder) {
                    held.push(resource.clone());
                }
            }
        }
        allocation
    }
}
