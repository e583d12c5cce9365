//! The frozen, executable data graph.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tokio::sync::RwLock;
use trellis_data::{ColumnId, DataSet, Value};

use crate::builder::GraphBuilder;
use crate::engine::{Engine, ExecutionMode, execute};
use crate::error::{GraphError, GraphResult};
use crate::id::NodeId;
use crate::node::{EdgeKind, GraphNode};
use crate::token::ValueToken;
use crate::transform::Transform;

pub(crate) type TransformSlot = Arc<RwLock<Box<dyn Transform>>>;

/// An immutable directed acyclic graph of data transformations.
///
/// Built with [`GraphBuilder`] and executed in two modes:
/// [`train_transform`] fits every trainable transform while data flows from
/// the sources to the result node, and [`transform`] scores new data using
/// the state learned by an earlier training run.
///
/// Learned state lives on the graph's transforms, so `train_transform` must
/// not run concurrently with any other execution on the same graph. Training
/// again re-fits and replaces prior state. Concurrent [`transform`] calls
/// are safe: inference never mutates transform state.
///
/// [`train_transform`]: DataGraph::train_transform
/// [`transform`]: DataGraph::transform
pub struct DataGraph {
    graph: DiGraph<GraphNode, EdgeKind>,
    /// Transform slot per node, `None` for sources; indexed by node ordinal.
    slots: Vec<Option<TransformSlot>>,
    result: NodeId,
}

impl DataGraph {
    /// Returns a builder for assembling a graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    pub(crate) fn new(
        graph: DiGraph<GraphNode, EdgeKind>,
        slots: Vec<Option<TransformSlot>>,
        result: NodeId,
    ) -> Self {
        Self {
            graph,
            slots,
            result,
        }
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns a handle to the result node for reading the final output.
    pub fn result(&self) -> ResultHandle<'_> {
        ResultHandle {
            node: self.node(self.result),
        }
    }

    /// Trains the graph on `input` and returns the result node's output.
    ///
    /// Source values declared train-only must be present in `input`. Every
    /// trainable transform is re-fitted in place; state from a previous
    /// training run is replaced. Columns the result node declared train-only
    /// are dropped from the returned data set.
    pub async fn train_transform(&self, input: DataSet, engine: &Engine) -> GraphResult<DataSet> {
        execute(self, input, ExecutionMode::Train, engine).await
    }

    /// Runs the graph on `input` using previously learned state.
    ///
    /// Train-only values are neither read from `input` nor produced; nodes
    /// reachable from the result only through train-only edges are not
    /// executed at all. Fails fast with
    /// [`GraphError::TrainOnlyValueUnavailable`] if any executed transform
    /// requires a train-only value, before any node is scheduled.
    pub async fn transform(&self, input: DataSet, engine: &Engine) -> GraphResult<DataSet> {
        execute(self, input, ExecutionMode::Inference, engine).await
    }

    /// Builds an inference input data set from row-major values.
    ///
    /// Columns follow the source node's declaration order, excluding
    /// train-only values. Only available for graphs with exactly one source.
    pub fn create_source(&self, rows: Vec<Vec<Value>>) -> GraphResult<DataSet> {
        let source = self.only_source()?;
        let ids: Vec<ColumnId> = source
            .outputs
            .iter()
            .filter(|id| !source.train_only.contains(id.name()))
            .cloned()
            .collect();
        Ok(DataSet::from_matrix(&ids, rows)?)
    }

    /// Builds a training input data set from row-major values.
    ///
    /// Like [`create_source`] but includes train-only columns.
    ///
    /// [`create_source`]: DataGraph::create_source
    pub fn create_training_source(&self, rows: Vec<Vec<Value>>) -> GraphResult<DataSet> {
        let source = self.only_source()?;
        Ok(DataSet::from_matrix(&source.outputs, rows)?)
    }

    pub(crate) fn result_id(&self) -> NodeId {
        self.result
    }

    pub(crate) fn node(&self, id: NodeId) -> &GraphNode {
        &self.graph[NodeIndex::new(id.index())]
    }

    pub(crate) fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.graph.node_count()).map(NodeId::from_index)
    }

    pub(crate) fn slot(&self, id: NodeId) -> Option<&TransformSlot> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn is_source(&self, id: NodeId) -> bool {
        self.slot(id).is_none()
    }

    /// Marks the nodes backward-reachable from the result node.
    ///
    /// During inference, train-only edges are not traversed, so nodes that
    /// feed the result only while training are excluded.
    pub(crate) fn reachable(&self, mode: ExecutionMode) -> Vec<bool> {
        let mut seen = vec![false; self.graph.node_count()];
        seen[self.result.index()] = true;
        let mut stack = vec![NodeIndex::new(self.result.index())];
        while let Some(idx) = stack.pop() {
            for edge in self.graph.edges_directed(idx, Direction::Incoming) {
                if mode.is_inference() && edge.weight().train_only {
                    continue;
                }
                let parent = edge.source();
                if !seen[parent.index()] {
                    seen[parent.index()] = true;
                    stack.push(parent);
                }
            }
        }
        seen
    }

    /// Returns the reachable nodes in execution order.
    ///
    /// Kahn's algorithm over in-degree, with declaration order breaking ties
    /// so the schedule is independent of worker count and completion order.
    pub(crate) fn execution_order(&self, reachable: &[bool], mode: ExecutionMode) -> Vec<NodeId> {
        let traversed = |edge: &EdgeKind| !(mode.is_inference() && edge.train_only);

        let mut in_degree = vec![0usize; self.graph.node_count()];
        let mut ready = BTreeSet::new();
        for idx in self.graph.node_indices() {
            if !reachable[idx.index()] {
                continue;
            }
            let degree = self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .filter(|edge| traversed(edge.weight()) && reachable[edge.source().index()])
                .count();
            in_degree[idx.index()] = degree;
            if degree == 0 {
                ready.insert(NodeId::from_index(idx.index()));
            }
        }

        let mut order = Vec::with_capacity(reachable.iter().filter(|seen| **seen).count());
        while let Some(id) = ready.pop_first() {
            order.push(id);
            let idx = NodeIndex::new(id.index());
            for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
                let child = edge.target().index();
                if !reachable[child] || !traversed(edge.weight()) {
                    continue;
                }
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.insert(NodeId::from_index(child));
                }
            }
        }
        order
    }

    fn only_source(&self) -> GraphResult<&GraphNode> {
        let mut sources = self.node_ids().filter(|id| self.is_source(*id));
        let first = sources.next().ok_or_else(|| {
            GraphError::InvalidGraph("graph has no source node".into())
        })?;
        if sources.next().is_some() {
            return Err(GraphError::InvalidGraph(
                "source helpers require exactly one source node".into(),
            ));
        }
        Ok(self.node(first))
    }
}

impl fmt::Debug for DataGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGraph")
            .field("node_count", &self.graph.node_count())
            .field("edge_count", &self.graph.edge_count())
            .field("result", &self.result)
            .finish()
    }
}

/// Handle to the frozen graph's result node.
///
/// Mints typed tokens for reading values out of the final output data set.
#[derive(Debug, Clone, Copy)]
pub struct ResultHandle<'a> {
    node: &'a GraphNode,
}

impl ResultHandle<'_> {
    /// Returns the result node's id.
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Returns the result node's declared outputs, in declaration order.
    pub fn column_ids(&self) -> &[ColumnId] {
        &self.node.outputs
    }

    /// Mints a token for one of the result node's declared outputs.
    pub fn token(&self, id: &ColumnId) -> GraphResult<ValueToken> {
        self.node.token(id)
    }
}
