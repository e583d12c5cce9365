//! Frozen graph node records.

use std::collections::BTreeSet;

use trellis_data::ColumnId;

use crate::engine::ExecutionMode;
use crate::error::GraphResult;
use crate::id::NodeId;
use crate::token::{ValueToken, resolve_token};

/// A frozen node of a [`DataGraph`].
///
/// Source nodes have no parents; their declared outputs are projected from
/// the execution input. Transform nodes consume the tokens recorded on their
/// parent edges.
///
/// [`DataGraph`]: crate::DataGraph
#[derive(Debug, Clone)]
pub(crate) struct GraphNode {
    pub(crate) id: NodeId,
    /// Declared outputs, in declaration order.
    pub(crate) outputs: Vec<ColumnId>,
    /// Names of outputs only available while training.
    pub(crate) train_only: BTreeSet<String>,
    /// Parent edges, in first-token order.
    pub(crate) parents: Vec<ParentEdge>,
}

impl GraphNode {
    /// Returns the outputs this node publishes in the given mode.
    pub(crate) fn outputs_for(&self, mode: ExecutionMode) -> Vec<ColumnId> {
        match mode {
            ExecutionMode::Train => self.outputs.clone(),
            ExecutionMode::Inference => self
                .outputs
                .iter()
                .filter(|id| !self.train_only.contains(id.name()))
                .cloned()
                .collect(),
        }
    }

    /// Mints a token for one of this node's declared outputs.
    pub(crate) fn token(&self, id: &ColumnId) -> GraphResult<ValueToken> {
        resolve_token(self.id, &self.outputs, id)
    }
}

/// One consuming edge of a node: the parent it reads from and the tokens it
/// takes from that parent.
///
/// An edge whose `tokens` list is empty carries train-only data exclusively
/// and is skipped entirely during inference.
#[derive(Debug, Clone)]
pub(crate) struct ParentEdge {
    pub(crate) parent: NodeId,
    /// Tokens consumed in both execution modes.
    pub(crate) tokens: Vec<ValueToken>,
    /// Tokens consumed only while fitting.
    pub(crate) train_tokens: Vec<ValueToken>,
}

impl ParentEdge {
    pub(crate) fn new(parent: NodeId) -> Self {
        Self {
            parent,
            tokens: Vec::new(),
            train_tokens: Vec::new(),
        }
    }

    /// Returns whether this edge is only traversed while training.
    pub(crate) fn is_train_only(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the column ids to project from the parent's output.
    pub(crate) fn projected_ids(&self, mode: ExecutionMode) -> Vec<ColumnId> {
        match mode {
            ExecutionMode::Train => self
                .tokens
                .iter()
                .chain(self.train_tokens.iter())
                .map(|token| token.id().clone())
                .collect(),
            ExecutionMode::Inference => {
                self.tokens.iter().map(|token| token.id().clone()).collect()
            }
        }
    }
}

/// Edge annotation on the frozen petgraph structure.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeKind {
    /// Whether the edge is only traversed while training.
    pub(crate) train_only: bool,
}
