//! Concurrent, dependency-gated graph execution.
//!
//! One future is composed per reachable node. A node's task awaits its
//! parents' shared futures, gathers its input by projecting each parent's
//! output onto the consumed tokens and joining the projections by row
//! position, then runs the transform under a worker-pool permit. The result
//! node's future is the execution's result; the first failing node completes
//! it exceptionally and every downstream task short-circuits without running
//! its transform.
//!
//! Row order is always positional and the schedule is derived from the
//! frozen graph alone, so the output is identical for any worker count.

use std::collections::HashMap;
use std::sync::Arc;

use derive_more::{Debug, Display, From, Into};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use strum::{Display as StrumDisplay, EnumIs};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use trellis_data::DataSet;
use uuid::Uuid;

use super::EngineConfig;
use crate::TRACING_TARGET;
use crate::error::{GraphError, GraphResult};
use crate::graph::{DataGraph, TransformSlot};
use crate::id::NodeId;
use crate::node::GraphNode;

/// The graph execution engine.
///
/// Holds the worker pool bound shared by all executions run against it. The
/// engine itself is stateless with respect to graphs; any graph may be
/// executed on any engine.
pub struct Engine {
    config: EngineConfig,
    semaphore: Arc<Semaphore>,
}

impl Engine {
    /// Creates a new engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.workers));

        tracing::info!(
            target: TRACING_TARGET,
            workers = config.workers,
            "execution engine initialized"
        );

        Self { config, semaphore }
    }

    /// Creates a new engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the number of currently idle worker slots.
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub(crate) fn semaphore(&self) -> Arc<Semaphore> {
        self.semaphore.clone()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("available_slots", &self.available_slots())
            .finish()
    }
}

/// Identifier for a single execution run, used in tracing output.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
pub(crate) struct ExecutionId(Uuid);

impl ExecutionId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

/// Which entry point an execution was started from.
#[derive(Clone, Copy, PartialEq, Eq, StrumDisplay, EnumIs)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ExecutionMode {
    /// Fit transforms while data flows through the graph.
    Train,
    /// Apply previously learned state without mutating it.
    Inference,
}

/// A node's published output, awaitable by any number of consumers.
type SharedOutput = Shared<BoxFuture<'static, Result<DataSet, GraphError>>>;

/// Runs `graph` on `input` in the given mode.
pub(crate) async fn execute(
    graph: &DataGraph,
    input: DataSet,
    mode: ExecutionMode,
    engine: &Engine,
) -> GraphResult<DataSet> {
    let execution = ExecutionId::new();
    let reachable = graph.reachable(mode);
    if mode.is_inference() {
        check_inference_inputs(graph, &reachable)?;
    }
    let order = graph.execution_order(&reachable, mode);

    tracing::debug!(
        target: TRACING_TARGET,
        execution = %execution,
        mode = %mode,
        node_count = order.len(),
        rows = input.num_rows(),
        "starting graph execution"
    );

    let mut outputs: HashMap<NodeId, SharedOutput> = HashMap::with_capacity(order.len());
    for id in &order {
        let node = graph.node(*id);
        let fut = match graph.slot(*id) {
            None => spawn_source(node, input.clone(), mode),
            Some(slot) => spawn_transform(node, slot.clone(), mode, &outputs, engine),
        };
        outputs.insert(*id, fut);
    }

    let result_fut = outputs.remove(&graph.result_id()).ok_or_else(|| {
        GraphError::Internal("result node missing from execution plan".into())
    })?;
    let mut result = result_fut.await?;

    if mode.is_train() {
        let node = graph.node(graph.result_id());
        if !node.train_only.is_empty() {
            let names: Vec<&str> = node.train_only.iter().map(String::as_str).collect();
            result = result.drop_columns(&names);
        }
    }

    tracing::debug!(
        target: TRACING_TARGET,
        execution = %execution,
        rows = result.num_rows(),
        columns = result.num_columns(),
        "graph execution completed"
    );

    Ok(result)
}

// A transform may only require a train-only value through its train-only
// input list. Any train-only value among the regular inputs of a node that
// would run during inference is reported before anything is scheduled.
fn check_inference_inputs(graph: &DataGraph, reachable: &[bool]) -> GraphResult<()> {
    for id in graph.node_ids() {
        if !reachable[id.index()] {
            continue;
        }
        let node = graph.node(id);
        for edge in &node.parents {
            let parent = graph.node(edge.parent);
            for token in &edge.tokens {
                if parent.train_only.contains(token.name()) {
                    return Err(GraphError::TrainOnlyValueUnavailable {
                        node: id,
                        name: token.name().to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn spawn_source(node: &GraphNode, input: DataSet, mode: ExecutionMode) -> SharedOutput {
    let node_id = node.id;
    let ids = node.outputs_for(mode);
    let handle = tokio::spawn(async move {
        tracing::trace!(
            target: TRACING_TARGET,
            node = %node_id,
            columns = ids.len(),
            "projecting source input"
        );
        input.project(&ids).map_err(GraphError::from)
    });
    flatten(handle)
}

fn spawn_transform(
    node: &GraphNode,
    slot: TransformSlot,
    mode: ExecutionMode,
    outputs: &HashMap<NodeId, SharedOutput>,
    engine: &Engine,
) -> SharedOutput {
    let node_id = node.id;

    let mut parents = Vec::with_capacity(node.parents.len());
    for edge in &node.parents {
        if mode.is_inference() && edge.is_train_only() {
            continue;
        }
        match outputs.get(&edge.parent) {
            Some(fut) => parents.push((edge.clone(), fut.clone())),
            None => {
                return failed(GraphError::Internal(format!(
                    "parent {} of node {node_id} was not scheduled first",
                    edge.parent
                )));
            }
        }
    }

    let semaphore = engine.semaphore();
    let work = async move {
        // Await parents in declaration order; the first failure propagates
        // and this node's transform is never invoked.
        let mut gathered: Option<DataSet> = None;
        for (edge, fut) in parents {
            let parent_output = fut.await?;
            let part = parent_output.project(&edge.projected_ids(mode))?;
            gathered = Some(match gathered {
                None => part,
                Some(acc) => acc.zip(&part)?,
            });
        }
        let gathered = gathered.unwrap_or_default();

        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|err| GraphError::Internal(format!("worker pool closed: {err}")))?;

        tracing::trace!(
            target: TRACING_TARGET,
            node = %node_id,
            rows = gathered.num_rows(),
            "running transform"
        );
        let applied = match mode {
            ExecutionMode::Train => slot.write().await.fit_apply(gathered).await,
            ExecutionMode::Inference => slot.read().await.apply(gathered).await,
        };
        if let Err(err) = &applied {
            tracing::error!(
                target: TRACING_TARGET,
                node = %node_id,
                error = %err,
                "transform failed"
            );
        }
        applied.map_err(|err| GraphError::from_transform(node_id, err))
    };
    flatten(tokio::spawn(work))
}

fn failed(err: GraphError) -> SharedOutput {
    async move { Err(err) }.boxed().shared()
}

fn flatten(handle: JoinHandle<Result<DataSet, GraphError>>) -> SharedOutput {
    async move {
        match handle.await {
            Ok(result) => result,
            Err(err) => Err(GraphError::Internal(format!("node task aborted: {err}"))),
        }
    }
    .boxed()
    .shared()
}
