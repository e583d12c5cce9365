//! Column subset and rename transform.

use async_trait::async_trait;
use trellis_data::{ColumnId, DataSet};

use crate::builder::NodeHandle;
use crate::error::{GraphError, GraphResult, TransformResult};
use crate::token::ValueToken;
use crate::transform::Transform;

/// Keeps a subset of a parent's columns, optionally under new names.
#[derive(Debug, Clone)]
pub struct ColumnSubset {
    inputs: Vec<ValueToken>,
    /// Maps each kept source column to the id it is published under.
    keep: Vec<(ColumnId, ColumnId)>,
    outputs: Vec<ColumnId>,
}

impl ColumnSubset {
    /// Returns a builder selecting columns of `parent`.
    pub fn builder(parent: &NodeHandle) -> ColumnSubsetBuilder<'_> {
        ColumnSubsetBuilder {
            parent,
            keep: Vec::new(),
        }
    }
}

#[async_trait]
impl Transform for ColumnSubset {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, input: DataSet) -> TransformResult<DataSet> {
        let mut builder = DataSet::builder();
        for (src, dst) in &self.keep {
            let column = input.column(src)?.clone();
            builder = builder.prebuilt(dst.clone(), column);
        }
        Ok(builder.build()?)
    }
}

/// Builder for [`ColumnSubset`].
#[derive(Debug)]
pub struct ColumnSubsetBuilder<'a> {
    parent: &'a NodeHandle,
    keep: Vec<(ColumnId, ColumnId)>,
}

impl ColumnSubsetBuilder<'_> {
    /// Keeps a column under its existing id.
    pub fn keep(self, id: &ColumnId) -> GraphResult<Self> {
        let kept = id.clone();
        self.keep_as(id, kept)
    }

    /// Keeps a column under a new name, preserving its kind.
    pub fn keep_renamed(self, id: &ColumnId, new_name: &str) -> GraphResult<Self> {
        let renamed = id.renamed(new_name);
        self.keep_as(id, renamed)
    }

    /// Finalizes the subset.
    pub fn build(self) -> GraphResult<ColumnSubset> {
        if self.keep.is_empty() {
            return Err(GraphError::InvalidGraph(
                "column subset keeps no columns".into(),
            ));
        }

        let mut inputs = Vec::with_capacity(self.keep.len());
        let mut outputs = Vec::with_capacity(self.keep.len());
        for (src, dst) in &self.keep {
            if outputs.iter().any(|out: &ColumnId| out.name() == dst.name()) {
                return Err(GraphError::DuplicateValue {
                    name: dst.name().to_string(),
                });
            }
            inputs.push(self.parent.token(src)?);
            outputs.push(dst.clone());
        }

        Ok(ColumnSubset {
            inputs,
            keep: self.keep,
            outputs,
        })
    }

    fn keep_as(mut self, id: &ColumnId, renamed: ColumnId) -> GraphResult<Self> {
        if self.keep.iter().any(|(src, _)| src.name() == id.name()) {
            return Err(GraphError::DuplicateValue {
                name: id.name().to_string(),
            });
        }
        self.keep.push((id.clone(), renamed));
        Ok(self)
    }
}
