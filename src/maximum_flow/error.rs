use crate::maximum_flow::graph::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("node {0} is already registered")]
    DuplicateNode(NodeId),

    #[error("node {0} is not registered")]
    UnknownNode(NodeId),

    #[error("invalid endpoints: {0}")]
    InvalidEndpoint(String),

    #[error("negative capacity {capacity} on edge {from} -> {to}")]
    NegativeCapacity { from: NodeId, to: NodeId, capacity: String },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
