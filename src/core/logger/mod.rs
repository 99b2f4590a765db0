//! Logging functionality for reductions
//!
//! This module records each removal step of a reduction, with a snapshot
//! of the graph left behind, so a run can be inspected or replayed later.

mod event_logger;
mod graph_logger;

pub use event_logger::EventLogger;
pub use graph_logger::{GraphLink, GraphState, ResourceState};
