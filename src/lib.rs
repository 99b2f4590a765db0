//! # ragreduce
//!
//! Deadlock analysis for resource allocation graphs by graph reduction.
//!
//! A resource allocation graph connects processes and resources: an edge
//! `resource -> process` means the process holds one unit of the resource,
//! an edge `process -> resource` means it waits for one. Reduction removes
//! processes that can run to completion and releases their units, until
//! either every process is gone or the rest are stuck in a deadlock.
//!
//! ## Features
//!
//! - Snapshot extraction from editor graph documents
//! - Allocation, request and remaining capacity maps
//! - Safe reduction plus a configurable victim heuristic
//! - Per-step removal events and JSON-lines event logs
//!
//! ## Example
//!
//! ```
//! use ragreduce::{GraphSnapshot, Reducer};
//!
//! let snapshot = GraphSnapshot::new()
//!     .process("P1")
//!     .process("P2")
//!     .resource("R1", 1)
//!     .allocate("R1", "P1")
//!     .request("P2", "R1");
//!
//! let outcome = Reducer::new().run(&snapshot).unwrap();
//! assert_eq!(outcome.removed_trace, vec!["P1", "P2"]);
//! assert!(outcome.is_resolved());
//! ```

mod core;
pub use crate::core::{
    FallbackPolicy, RagError, Reducer, ReductionEngine, RemovalObserver, reduce,
    accountant::{CapacityLedger, remaining_capacity},
    graph::{EdgeKind, EditorGraph, GraphSnapshot, NodeIndexes, ResourceAllocationGraph},
    logger::{EventLogger, GraphLink, GraphState, ResourceState},
    types::{
        AllocationMap, CapacityMap, NodeKind, ProcessId, ReductionOutcome, RemovalEvent,
        RemovalKind, RemovalStep, RequestMap, ResourceId,
    },
};
