//! Column-wise merge of multiple parent outputs.

use std::collections::BTreeSet;

use async_trait::async_trait;
use trellis_data::{ColumnId, DataSet};

use crate::builder::NodeHandle;
use crate::error::{GraphError, GraphResult, TransformResult};
use crate::token::ValueToken;
use crate::transform::Transform;

/// Merges the outputs of several parent nodes into one table.
///
/// The merged node re-declares every parent's regular output under its own
/// id; train-only parent values are not carried over. Parents whose outputs
/// collide by name are rejected when the merge is constructed.
#[derive(Debug, Clone)]
pub struct MergeColumns {
    inputs: Vec<ValueToken>,
    outputs: Vec<ColumnId>,
}

impl MergeColumns {
    /// Creates a merge over the given parents' regular outputs.
    pub fn new(parents: &[&NodeHandle]) -> GraphResult<Self> {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut seen = BTreeSet::new();
        for parent in parents {
            for id in parent.outputs() {
                if parent.is_train_only(id.name()) {
                    continue;
                }
                if !seen.insert(id.name().to_string()) {
                    return Err(GraphError::DuplicateValue {
                        name: id.name().to_string(),
                    });
                }
                inputs.push(parent.token(id)?);
                outputs.push(id.clone());
            }
        }
        if inputs.is_empty() {
            return Err(GraphError::InvalidGraph(
                "merge requires at least one parent with values".into(),
            ));
        }
        Ok(Self { inputs, outputs })
    }
}

#[async_trait]
impl Transform for MergeColumns {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, input: DataSet) -> TransformResult<DataSet> {
        // The gathered input is already the column-wise join of the parents.
        Ok(input)
    }
}
