//! Immutable graph snapshot consumed by the reduction engine
//!
//! A snapshot is a flat description of a resource allocation graph taken
//! at the moment a reduction starts:
//! - `processes`: process ids in scan order (used for every tie-break)
//! - `resources`: resource ids in declaration order
//! - `capacities`: total units per resource
//! - `edges`: `(from, to)` pairs, `process -> resource` for a request and
//!   `resource -> process` for an allocation
//!
//! Parallel edges are kept; each one stands for a single unit.

use crate::core::error::{RagError, Result};
use crate::core::types::{CapacityMap, NodeKind, ProcessId, ResourceId};
use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub processes: Vec<ProcessId>,
    pub resources: Vec<ResourceId>,
    pub capacities: CapacityMap,
    pub edges: Vec<(String, String)>,
}

/// A validated edge, tagged with its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `process -> resource`: the process waits for one unit
    Request,
    /// `resource -> process`: the process holds one unit
    Allocation,
}

impl GraphSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a process, appended to the scan order
    pub fn process(mut self, id: impl Into<ProcessId>) -> Self {
        self.processes.push(id.into());
        self
    }

    /// Declare a resource with its total number of units
    pub fn resource(mut self, id: impl Into<ResourceId>, capacity: u32) -> Self {
        let id = id.into();
        self.capacities.insert(id.clone(), capacity);
        self.resources.push(id);
        self
    }

    /// Add a single `process -> resource` request edge
    pub fn request(mut self, process: impl Into<String>, resource: impl Into<String>) -> Self {
        self.edges.push((process.into(), resource.into()));
        self
    }

    /// Add a single `resource -> process` allocation edge
    pub fn allocate(mut self, resource: impl Into<String>, process: impl Into<String>) -> Self {
        self.edges.push((resource.into(), process.into()));
        self
    }

    /// Look up which kind of node an id refers to
    pub fn kind_of(&self, id: &str) -> Option<NodeKind> {
        if self.processes.iter().any(|p| p == id) {
            Some(NodeKind::Process)
        } else if self.resources.iter().any(|r| r == id) {
            Some(NodeKind::Resource)
        } else {
            None
        }
    }

    /// Check the structural contract of the snapshot
    ///
    /// Validation runs before any reduction state is built, so a failing
    /// snapshot never leaves partially reduced maps behind.
    ///
    /// # Errors
    /// - `DuplicateNode` if an id is declared twice (in either list)
    /// - `MissingCapacity` if a resource has no capacity entry
    /// - `UnknownResource` if a capacity names an undeclared resource
    /// - `UnknownProcess` / `UnknownResource` / `UnknownNode` if an edge
    ///   endpoint is not declared
    /// - `InvalidEdge` if an edge joins two nodes of the same kind
    pub fn validate(&self) -> Result<()> {
        let kinds = self.node_kinds()?;

        for resource in &self.resources {
            if !self.capacities.contains_key(resource) {
                return Err(RagError::MissingCapacity(resource.clone()));
            }
        }
        for resource in self.capacities.keys() {
            if kinds.get(resource.as_str()) != Some(&NodeKind::Resource) {
                return Err(RagError::UnknownResource(resource.clone()));
            }
        }

        for (from, to) in &self.edges {
            classify_edge(&kinds, from, to)?;
        }
        Ok(())
    }

    /// Iterate over the edges with their direction resolved
    ///
    /// Edges that fail validation are skipped; call [`Self::validate`]
    /// first to reject them.
    pub fn classified_edges(&self) -> impl Iterator<Item = (EdgeKind, &str, &str)> {
        let kinds = self.node_kinds().unwrap_or_default();
        self.edges.iter().filter_map(move |(from, to)| {
            classify_edge(&kinds, from, to)
                .ok()
                .map(|kind| (kind, from.as_str(), to.as_str()))
        })
    }

    fn node_kinds(&self) -> Result<FxHashMap<&str, NodeKind>> {
        let mut kinds = FxHashMap::default();
        let mut seen = FxHashSet::default();

        let tagged = self
            .processes
            .iter()
            .map(|p| (p, NodeKind::Process))
            .chain(self.resources.iter().map(|r| (r, NodeKind::Resource)));

        for (id, kind) in tagged {
            if !seen.insert(id.as_str()) {
                return Err(RagError::DuplicateNode(id.clone()));
            }
            kinds.insert(id.as_str(), kind);
        }
        Ok(kinds)
    }
}

fn classify_edge(kinds: &FxHashMap<&str, NodeKind>, from: &str, to: &str) -> Result<EdgeKind> {
    use NodeKind::{Process, Resource};

    match (kinds.get(from), kinds.get(to)) {
        (Some(Process), Some(Resource)) => Ok(EdgeKind::Request),
        (Some(Resource), Some(Process)) => Ok(EdgeKind::Allocation),
        (Some(_), Some(_)) => Err(RagError::InvalidEdge {
            from: from.to_string(),
            to: to.to_string(),
        }),
        // The known endpoint tells us what the unknown one should have been
        (None, Some(Resource)) => Err(RagError::UnknownProcess(from.to_string())),
        (None, Some(Process)) => Err(RagError::UnknownResource(from.to_string())),
        (Some(Process), None) => Err(RagError::UnknownResource(to.to_string())),
        (Some(Resource), None) => Err(RagError::UnknownProcess(to.to_string())),
        (None, None) => Err(RagError::UnknownNode(from.to_string())),
    }
}
