//! Shared transforms and helpers for the integration tests.
//!
//! These mirror the kinds of transforms real pipelines attach to a graph:
//! simple stateless mappings, a trainable aggregate, and a supervised
//! membership learner.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use trellis_runtime::prelude::*;

/// Builds an engine with the given worker count.
pub fn engine(workers: usize) -> Engine {
    let config = EngineConfig::builder()
        .workers(workers)
        .build()
        .expect("valid engine config");
    Engine::new(config)
}

/// Stateless: adds a constant to an integer column.
pub struct AddConstant {
    amount: i64,
    src: ColumnId,
    inputs: Vec<ValueToken>,
    outputs: Vec<ColumnId>,
}

impl AddConstant {
    pub fn new(
        parent: &NodeHandle,
        src: &ColumnId,
        output: ColumnId,
        amount: i64,
    ) -> GraphResult<Self> {
        Ok(Self {
            amount,
            src: src.clone(),
            inputs: vec![parent.token(src)?],
            outputs: vec![output],
        })
    }
}

#[async_trait]
impl Transform for AddConstant {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, input: DataSet) -> TransformResult<DataSet> {
        let cells = input
            .column(&self.src)?
            .iter()
            .map(|cell| Value::from(cell.as_int().map(|n| n + self.amount)))
            .collect();
        Ok(DataSet::single(self.outputs[0].clone(), cells)?)
    }
}

/// Stateless: lower-cases a text column.
pub struct LowerCase {
    src: ColumnId,
    inputs: Vec<ValueToken>,
    outputs: Vec<ColumnId>,
}

impl LowerCase {
    pub fn new(parent: &NodeHandle, src: &ColumnId, output: ColumnId) -> GraphResult<Self> {
        Ok(Self {
            src: src.clone(),
            inputs: vec![parent.token(src)?],
            outputs: vec![output],
        })
    }
}

#[async_trait]
impl Transform for LowerCase {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, input: DataSet) -> TransformResult<DataSet> {
        let cells = input
            .column(&self.src)?
            .iter()
            .map(|cell| Value::from(cell.as_text().map(str::to_lowercase)))
            .collect();
        Ok(DataSet::single(self.outputs[0].clone(), cells)?)
    }
}

/// Stateless: inverts a boolean column.
pub struct InvertBool {
    src: ColumnId,
    inputs: Vec<ValueToken>,
    outputs: Vec<ColumnId>,
}

impl InvertBool {
    pub fn new(parent: &NodeHandle, src: &ColumnId, output: ColumnId) -> GraphResult<Self> {
        Ok(Self {
            src: src.clone(),
            inputs: vec![parent.token(src)?],
            outputs: vec![output],
        })
    }
}

#[async_trait]
impl Transform for InvertBool {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, input: DataSet) -> TransformResult<DataSet> {
        let cells = input
            .column(&self.src)?
            .iter()
            .map(|cell| Value::from(cell.as_bool().map(|b| !b)))
            .collect();
        Ok(DataSet::single(self.outputs[0].clone(), cells)?)
    }
}

/// Trainable: learns the minimum of an integer column during fitting and
/// outputs it for every row thereafter.
pub struct LearnMin {
    src: ColumnId,
    inputs: Vec<ValueToken>,
    outputs: Vec<ColumnId>,
    min: Option<i64>,
}

impl LearnMin {
    pub fn new(parent: &NodeHandle, src: &ColumnId, output: ColumnId) -> GraphResult<Self> {
        Ok(Self {
            src: src.clone(),
            inputs: vec![parent.token(src)?],
            outputs: vec![output],
            min: None,
        })
    }
}

#[async_trait]
impl Transform for LearnMin {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, input: DataSet) -> TransformResult<DataSet> {
        let min = self.min.ok_or(TransformError::Untrained)?;
        let cells = (0..input.num_rows()).map(|_| Value::Int(min)).collect();
        Ok(DataSet::single(self.outputs[0].clone(), cells)?)
    }

    async fn fit_apply(&mut self, input: DataSet) -> TransformResult<DataSet> {
        self.min = input
            .column(&self.src)?
            .iter()
            .filter_map(Value::as_int)
            .min();
        if self.min.is_none() {
            return Err(TransformError::Failed(
                "cannot learn a minimum from an empty column".into(),
            ));
        }
        self.apply(input).await
    }
}

/// Supervised: learns which feature strings were ever paired with a `true`
/// target during training, then predicts membership in that set.
pub struct TrueIfSeen {
    src: ColumnId,
    target: ColumnId,
    inputs: Vec<ValueToken>,
    train_inputs: Vec<ValueToken>,
    outputs: Vec<ColumnId>,
    seen: BTreeSet<String>,
    fitted: bool,
}

impl TrueIfSeen {
    pub fn new(
        words: (&NodeHandle, &ColumnId),
        target: (&NodeHandle, &ColumnId),
        output: ColumnId,
    ) -> GraphResult<Self> {
        Ok(Self {
            src: words.1.clone(),
            target: target.1.clone(),
            inputs: vec![words.0.token(words.1)?],
            train_inputs: vec![target.0.token(target.1)?],
            outputs: vec![output],
            seen: BTreeSet::new(),
            fitted: false,
        })
    }
}

#[async_trait]
impl Transform for TrueIfSeen {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn train_only_inputs(&self) -> &[ValueToken] {
        &self.train_inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, input: DataSet) -> TransformResult<DataSet> {
        if !self.fitted {
            return Err(TransformError::Untrained);
        }
        let cells = input
            .column(&self.src)?
            .iter()
            .map(|cell| {
                let hit = cell.as_text().is_some_and(|word| self.seen.contains(word));
                Value::from(hit)
            })
            .collect();
        Ok(DataSet::single(self.outputs[0].clone(), cells)?)
    }

    async fn fit_apply(&mut self, input: DataSet) -> TransformResult<DataSet> {
        let words = input.column(&self.src)?.clone();
        let targets = input.column(&self.target)?.clone();
        self.seen.clear();
        for (word, target) in words.iter().zip(targets.iter()) {
            if target.as_bool().unwrap_or(false) {
                if let Some(word) = word.as_text() {
                    self.seen.insert(word.to_string());
                }
            }
        }
        self.fitted = true;
        self.apply(input).await
    }
}

/// Always fails with the given message.
pub struct Failing {
    message: String,
    inputs: Vec<ValueToken>,
    outputs: Vec<ColumnId>,
}

impl Failing {
    pub fn new(
        parent: &NodeHandle,
        src: &ColumnId,
        output: ColumnId,
        message: &str,
    ) -> GraphResult<Self> {
        Ok(Self {
            message: message.to_string(),
            inputs: vec![parent.token(src)?],
            outputs: vec![output],
        })
    }
}

#[async_trait]
impl Transform for Failing {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, _input: DataSet) -> TransformResult<DataSet> {
        Err(TransformError::Failed(self.message.clone()))
    }
}

/// Passthrough that counts how often it is fitted and applied.
pub struct Counting {
    src: ColumnId,
    inputs: Vec<ValueToken>,
    outputs: Vec<ColumnId>,
    pub fits: Arc<AtomicUsize>,
    pub applies: Arc<AtomicUsize>,
}

impl Counting {
    pub fn new(parent: &NodeHandle, src: &ColumnId, output: ColumnId) -> GraphResult<Self> {
        Ok(Self {
            src: src.clone(),
            inputs: vec![parent.token(src)?],
            outputs: vec![output],
            fits: Arc::new(AtomicUsize::new(0)),
            applies: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Returns handles to the fit/apply counters before the transform is
    /// moved into a graph.
    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.fits.clone(), self.applies.clone())
    }

    async fn passthrough(&self, input: DataSet) -> TransformResult<DataSet> {
        let column = input.column(&self.src)?.clone();
        Ok(DataSet::builder()
            .prebuilt(self.outputs[0].clone(), column)
            .build()?)
    }
}

#[async_trait]
impl Transform for Counting {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, input: DataSet) -> TransformResult<DataSet> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        self.passthrough(input).await
    }

    async fn fit_apply(&mut self, input: DataSet) -> TransformResult<DataSet> {
        self.fits.fetch_add(1, Ordering::SeqCst);
        self.passthrough(input).await
    }
}

/// Collects a boolean column into a plain vec, treating nulls as `false`.
pub fn bool_column(data: &DataSet, id: &ColumnId) -> Vec<bool> {
    data.column(id)
        .expect("column present")
        .iter()
        .map(|cell| cell.as_bool().unwrap_or(false))
        .collect()
}

/// Collects an integer column into a plain vec.
pub fn int_column(data: &DataSet, id: &ColumnId) -> Vec<i64> {
    data.column(id)
        .expect("column present")
        .iter()
        .map(|cell| cell.as_int().expect("int cell"))
        .collect()
}
