use thiserror::Error;

/// Top-level error type for the Spherica geometry kernel.
#[derive(Debug, Error)]
pub enum SphericaError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations on the sphere.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("edges do not cross: {0}")]
    EdgesDoNotCross(String),
}

/// Errors related to edge-graph topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("edge chain ends at vertex {vertex} without returning to its start")]
    OpenChain { vertex: usize },

    #[error("edge {src}->{dst} has no sibling edge")]
    MissingSibling { src: usize, dst: usize },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to geometry operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`SphericaError`].
pub type Result<T> = std::result::Result<T, SphericaError>;
