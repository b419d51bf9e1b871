use thiserror::Error;

/// Top-level error type for the simplification engine.
#[derive(Debug, Error)]
pub enum SimplifyError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to the vertex store and the configuration ring.
///
/// These indicate that index bookkeeping is broken; further iteration on the
/// same data is unsound.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("configuration {index} does not start at ring position {expected}")]
    IndexMismatch { index: usize, expected: usize },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to simplification operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("move is blocked: {0}")]
    Blocked(String),

    #[error("unknown decider policy: {0}")]
    UnknownDecider(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`SimplifyError`].
pub type Result<T> = std::result::Result<T, SimplifyError>;
