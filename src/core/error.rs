use thiserror::Error;

/// Errors raised while turning a graph into reduction state
///
/// Every variant describes malformed input and is raised before the
/// reduction touches any state. An unresolvable deadlock is not an error;
/// it is reported in [`crate::ReductionOutcome::deadlocked_subset`].
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Resource label '{label}' does not declare an integer capacity")]
    MalformedCapacity { label: String },

    #[error("Node label '{0}' is neither a process (P...) nor a resource (R...)")]
    UnrecognizedNode(String),

    #[error("Node '{0}' is declared more than once")]
    DuplicateNode(String),

    #[error("Resource '{0}' has no capacity")]
    MissingCapacity(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown process: {0}")]
    UnknownProcess(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Edge {from} -> {to} must join a process and a resource")]
    InvalidEdge { from: String, to: String },

    #[error("Resource '{resource}' has {allocated} units allocated but a capacity of {capacity}")]
    OverAllocated {
        resource: String,
        capacity: u32,
        allocated: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RagError>;
