//! Graph and transform error types.

use thiserror::Error;
use trellis_data::DataError;

use crate::id::NodeId;
use crate::token::ValueToken;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type returned by [`Transform`] implementations.
///
/// [`Transform`]: crate::Transform
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur while building or executing a data graph.
///
/// Build-time variants are returned synchronously by the builder call that
/// introduced the defect; run-time variants surface through the future
/// returned by the execution entry points.
#[derive(Debug, Clone, Error)]
pub enum GraphError {
    /// The same value name was declared twice on one node.
    #[error("duplicate value '{name}' on a single node")]
    DuplicateValue {
        /// Name of the duplicated value.
        name: String,
    },

    /// A token was requested for a value the node does not declare.
    #[error("node {node} does not declare a value named '{name}'")]
    UnknownValue {
        /// The node the token was requested from.
        node: NodeId,
        /// The undeclared value name.
        name: String,
    },

    /// The parent references of the registered nodes form a cycle.
    #[error("graph contains a cycle")]
    CyclicGraph,

    /// A token does not resolve to a declared output of a registered parent.
    #[error("{token} does not resolve to a declared output of a registered parent")]
    DanglingReference {
        /// The unresolvable token.
        token: ValueToken,
    },

    /// No result node was set before `build()`.
    #[error("no result node was set")]
    NoResult,

    /// The graph is structurally unusable for the requested operation.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// An inference-reachable transform requires a train-only value.
    #[error("node {node} requires train-only value '{name}' during inference")]
    TrainOnlyValueUnavailable {
        /// The consuming node.
        node: NodeId,
        /// Name of the train-only value.
        name: String,
    },

    /// A trainable transform was applied before any training run.
    #[error("node {node} was applied before being trained")]
    UntrainedTransform {
        /// The node holding the untrained transform.
        node: NodeId,
    },

    /// A transform failed while processing its input.
    #[error("node {node} failed: {message}")]
    NodeFailed {
        /// The failed node.
        node: NodeId,
        /// Error message reported by the transform.
        message: String,
    },

    /// A data model operation failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GraphError {
    /// Attaches node context to an error reported by a transform.
    pub(crate) fn from_transform(node: NodeId, err: TransformError) -> Self {
        match err {
            TransformError::Untrained => Self::UntrainedTransform { node },
            TransformError::Data(data) => Self::Data(data),
            TransformError::Failed(message) => Self::NodeFailed { node, message },
        }
    }
}

/// Errors reported by [`Transform`] implementations.
///
/// The engine maps these onto [`GraphError`] variants carrying the id of the
/// node whose transform failed.
///
/// [`Transform`]: crate::Transform
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// The transform requires fitted state but has not been trained.
    #[error("transform has not been fitted")]
    Untrained,

    /// A data model operation failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// The transform failed for any other reason.
    #[error("{0}")]
    Failed(String),
}
