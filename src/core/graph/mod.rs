//! Graph module for resource allocation graphs
//!
//! This module turns a graph into the state the reduction works on:
//! - Editor documents: labelled nodes as saved by the graph editor
//! - Snapshots: validated process/resource/edge lists
//! - Allocation and request maps derived from a snapshot

pub mod editor;
pub mod rag;
pub mod snapshot;

pub use editor::{EditorGraph, NodeIndexes};
pub use rag::ResourceAllocationGraph;
pub use snapshot::{EdgeKind, GraphSnapshot};
