//! Incremental graph assembly and build-time validation.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use tokio::sync::RwLock;
use trellis_data::ColumnId;

use crate::TRACING_TARGET;
use crate::error::{GraphError, GraphResult};
use crate::graph::DataGraph;
use crate::id::NodeId;
use crate::node::{EdgeKind, GraphNode, ParentEdge};
use crate::token::{ValueToken, resolve_token};
use crate::transform::Transform;
use crate::transforms::{ColumnSubset, DropColumns, MergeColumns};

/// Builder for a [`DataGraph`].
///
/// Nodes are registered incrementally: sources via [`source`], transform
/// nodes via [`add_transform`] (parents are derived from the transform's
/// input tokens). [`build`] validates the assembled graph and freezes it;
/// afterwards the builder is gone and the graph cannot be mutated.
///
/// [`source`]: GraphBuilder::source
/// [`add_transform`]: GraphBuilder::add_transform
/// [`build`]: GraphBuilder::build
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<BuildNode>,
    result: Option<NodeId>,
}

struct BuildNode {
    id: NodeId,
    outputs: Vec<ColumnId>,
    train_only: BTreeSet<String>,
    parents: Vec<ParentEdge>,
    transform: Option<Box<dyn Transform>>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a source node declaring values supplied externally at run time.
    pub fn source(&mut self) -> SourceBuilder<'_> {
        SourceBuilder {
            builder: self,
            outputs: Vec::new(),
            train_only: BTreeSet::new(),
        }
    }

    /// Registers a transform node.
    ///
    /// The node's parents are derived from the transform's input tokens, in
    /// order of first appearance. Fails with [`GraphError::DanglingReference`]
    /// if a token's producer is not a node registered on this builder, and
    /// with [`GraphError::DuplicateValue`] if the transform's outputs or
    /// gathered inputs would collide by name.
    pub fn add_transform(&mut self, transform: impl Transform + 'static) -> GraphResult<NodeHandle> {
        self.add_boxed(Box::new(transform))
    }

    fn add_boxed(&mut self, transform: Box<dyn Transform>) -> GraphResult<NodeHandle> {
        let outputs = transform.outputs().to_vec();
        if outputs.is_empty() {
            return Err(GraphError::InvalidGraph(
                "transform node declares no outputs".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for id in &outputs {
            if !seen.insert(id.name().to_string()) {
                return Err(GraphError::DuplicateValue {
                    name: id.name().to_string(),
                });
            }
        }

        let inputs = transform.inputs().to_vec();
        let train_inputs = transform.train_only_inputs().to_vec();
        if inputs.is_empty() && train_inputs.is_empty() {
            return Err(GraphError::InvalidGraph(
                "transform node declares no inputs".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for token in inputs.iter().chain(train_inputs.iter()) {
            if !seen.insert(token.name().to_string()) {
                return Err(GraphError::DuplicateValue {
                    name: token.name().to_string(),
                });
            }
        }

        let mut parents: Vec<ParentEdge> = Vec::new();
        for token in &inputs {
            self.validate_token(token)?;
            Self::edge_for(&mut parents, token.producer())
                .tokens
                .push(token.clone());
        }
        for token in &train_inputs {
            self.validate_token(token)?;
            Self::edge_for(&mut parents, token.producer())
                .train_tokens
                .push(token.clone());
        }

        Ok(self.register(outputs, BTreeSet::new(), parents, Some(transform)))
    }

    /// Adds a node merging its parents' values into one table.
    ///
    /// See [`MergeColumns`] for the collision rules.
    pub fn merge(&mut self, parents: &[&NodeHandle]) -> GraphResult<NodeHandle> {
        let transform = MergeColumns::new(parents)?;
        self.add_transform(transform)
    }

    /// Adds a node keeping only the given columns of `parent`.
    pub fn keep_columns(&mut self, parent: &NodeHandle, keep: &[ColumnId]) -> GraphResult<NodeHandle> {
        let mut subset = ColumnSubset::builder(parent);
        for id in keep {
            subset = subset.keep(id)?;
        }
        self.add_transform(subset.build()?)
    }

    /// Adds a node dropping the named columns of `parent`.
    pub fn drop_columns(&mut self, parent: &NodeHandle, exclude: &[&str]) -> GraphResult<NodeHandle> {
        let transform = DropColumns::new(parent, exclude)?;
        self.add_transform(transform)
    }

    /// Marks the graph's sink; its output is the result of an execution.
    ///
    /// Calling this again replaces the previous result node.
    pub fn set_result(&mut self, node: &NodeHandle) {
        self.result = Some(node.id());
    }

    /// Validates the assembled graph and freezes it into a [`DataGraph`].
    pub fn build(self) -> GraphResult<DataGraph> {
        let result = self.result.ok_or(GraphError::NoResult)?;
        if result.index() >= self.nodes.len() {
            return Err(GraphError::InvalidGraph(format!(
                "result node {result} is not part of this graph"
            )));
        }

        for node in &self.nodes {
            for edge in &node.parents {
                for token in edge.tokens.iter().chain(edge.train_tokens.iter()) {
                    self.validate_token(token)?;
                }
            }
        }

        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.nodes.len());
        for node in &self.nodes {
            graph.add_node(GraphNode {
                id: node.id,
                outputs: node.outputs.clone(),
                train_only: node.train_only.clone(),
                parents: node.parents.clone(),
            });
        }
        for node in &self.nodes {
            let child = NodeIndex::new(node.id.index());
            for edge in &node.parents {
                let parent = NodeIndex::new(edge.parent.index());
                graph.add_edge(
                    parent,
                    child,
                    EdgeKind {
                        train_only: edge.is_train_only(),
                    },
                );
            }
        }

        if petgraph::algo::is_cyclic_directed(&graph) {
            return Err(GraphError::CyclicGraph);
        }

        let slots = self
            .nodes
            .into_iter()
            .map(|node| node.transform.map(|t| Arc::new(RwLock::new(t))))
            .collect();

        tracing::debug!(
            target: TRACING_TARGET,
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            result = %result,
            "data graph built"
        );

        Ok(DataGraph::new(graph, slots, result))
    }

    fn register(
        &mut self,
        outputs: Vec<ColumnId>,
        train_only: BTreeSet<String>,
        parents: Vec<ParentEdge>,
        transform: Option<Box<dyn Transform>>,
    ) -> NodeHandle {
        let id = NodeId::from_index(self.nodes.len());
        tracing::debug!(
            target: TRACING_TARGET,
            node = %id,
            outputs = outputs.len(),
            parents = parents.len(),
            "registered graph node"
        );
        let decl = Arc::new(NodeDecl {
            id,
            outputs: outputs.clone(),
            train_only: train_only.clone(),
        });
        self.nodes.push(BuildNode {
            id,
            outputs,
            train_only,
            parents,
            transform,
        });
        NodeHandle { decl }
    }

    // A token resolves iff its producer is registered here and declares the
    // referenced name with the referenced kind.
    fn validate_token(&self, token: &ValueToken) -> GraphResult<()> {
        let declared = self
            .nodes
            .get(token.producer().index())
            .is_some_and(|node| {
                node.outputs
                    .iter()
                    .any(|out| out.name() == token.name() && out.kind() == token.kind())
            });
        if !declared {
            return Err(GraphError::DanglingReference {
                token: token.clone(),
            });
        }
        Ok(())
    }

    fn edge_for(parents: &mut Vec<ParentEdge>, parent: NodeId) -> &mut ParentEdge {
        let pos = match parents.iter().position(|edge| edge.parent == parent) {
            Some(pos) => pos,
            None => {
                parents.push(ParentEdge::new(parent));
                parents.len() - 1
            }
        };
        &mut parents[pos]
    }
}

impl fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("node_count", &self.nodes.len())
            .field("result", &self.result)
            .finish()
    }
}

/// Builder for a source node.
///
/// Obtained from [`GraphBuilder::source`]; declares the values a graph
/// execution must supply through its input data set.
#[derive(Debug)]
pub struct SourceBuilder<'a> {
    builder: &'a mut GraphBuilder,
    outputs: Vec<ColumnId>,
    train_only: BTreeSet<String>,
}

impl SourceBuilder<'_> {
    /// Declares a value the input must supply in every execution mode.
    pub fn with_value(mut self, id: ColumnId) -> GraphResult<Self> {
        self.declare(id, false)?;
        Ok(self)
    }

    /// Declares a value the input supplies only while training.
    ///
    /// Train-only values never appear in data produced during inference.
    pub fn with_train_only_value(mut self, id: ColumnId) -> GraphResult<Self> {
        self.declare(id, true)?;
        Ok(self)
    }

    /// Finalizes the source node and returns its handle.
    pub fn build(self) -> GraphResult<NodeHandle> {
        if self.outputs.is_empty() {
            return Err(GraphError::InvalidGraph(
                "source node declares no values".into(),
            ));
        }
        Ok(self
            .builder
            .register(self.outputs, self.train_only, Vec::new(), None))
    }

    fn declare(&mut self, id: ColumnId, train_only: bool) -> GraphResult<()> {
        if self.outputs.iter().any(|out| out.name() == id.name()) {
            return Err(GraphError::DuplicateValue {
                name: id.name().to_string(),
            });
        }
        if train_only {
            self.train_only.insert(id.name().to_string());
        }
        self.outputs.push(id);
        Ok(())
    }
}

/// Handle to a registered node, used to wire its consumers.
///
/// Handles are cheap to clone and only meaningful for the builder that
/// produced them.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    decl: Arc<NodeDecl>,
}

#[derive(Debug)]
struct NodeDecl {
    id: NodeId,
    outputs: Vec<ColumnId>,
    train_only: BTreeSet<String>,
}

impl NodeHandle {
    /// Returns the node's id.
    pub fn id(&self) -> NodeId {
        self.decl.id
    }

    /// Returns the node's declared outputs, in declaration order.
    pub fn outputs(&self) -> &[ColumnId] {
        &self.decl.outputs
    }

    /// Returns whether the named output is only available while training.
    pub fn is_train_only(&self, name: &str) -> bool {
        self.decl.train_only.contains(name)
    }

    /// Mints a token for one of this node's declared outputs.
    ///
    /// Fails with [`GraphError::UnknownValue`] if the node does not declare
    /// a value with the given name and kind.
    pub fn token(&self, id: &ColumnId) -> GraphResult<ValueToken> {
        resolve_token(self.decl.id, &self.decl.outputs, id)
    }
}
