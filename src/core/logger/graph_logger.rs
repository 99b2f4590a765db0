use crate::core::types::{AllocationMap, CapacityMap, ProcessId, RequestMap, ResourceId};
use serde::Serialize;

/// Represents a link between a process and a resource
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct GraphLink {
    /// Node the edge leaves
    pub source: String,
    /// Node the edge enters
    pub target: String,
    /// Type of relationship ("allocation" or "request")
    #[serde(rename = "type")]
    pub link_type: String,
}

/// Remaining units of one resource
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ResourceState {
    pub id: ResourceId,
    pub capacity: u32,
    pub remaining: u32,
}

/// Represents the state of the graph still being reduced
///
/// This structure provides a snapshot of all active processes, every
/// resource and the edges that remain after a removal step. It is written
/// next to each event so a viewer can replay the reduction.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct GraphState {
    /// Processes still in the graph, in scan order
    pub processes: Vec<ProcessId>,
    /// All resources, in declaration order
    pub resources: Vec<ResourceState>,
    /// Allocation links first, then request links
    pub links: Vec<GraphLink>,
}

impl GraphState {
    /// Capture the current reduction state
    ///
    /// # Arguments
    /// * `active` - Processes not removed yet
    /// * `resources` - Declared resources, in order
    /// * `allocation` / `request` - Current edge maps
    /// * `totals` / `remaining` - Total and free units per resource
    pub fn capture(
        active: &[ProcessId],
        resources: &[ResourceId],
        allocation: &AllocationMap,
        request: &RequestMap,
        totals: &CapacityMap,
        remaining: &CapacityMap,
    ) -> Self {
        let resources = resources
            .iter()
            .map(|id| ResourceState {
                id: id.clone(),
                capacity: totals.get(id).copied().unwrap_or(0),
                remaining: remaining.get(id).copied().unwrap_or(0),
            })
            .collect();

        let mut links = Vec::new();
        for process in active {
            for resource in allocation.get(process).into_iter().flatten() {
                links.push(GraphLink {
                    source: resource.clone(),
                    target: process.clone(),
                    link_type: "allocation".to_string(),
                });
            }
        }
        for process in active {
            for resource in request.get(process).into_iter().flatten() {
                links.push(GraphLink {
                    source: process.clone(),
                    target: resource.clone(),
                    link_type: "request".to_string(),
                });
            }
        }

        GraphState {
            processes: active.to_vec(),
            resources,
            links,
        }
    }
}
