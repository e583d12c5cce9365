//! All-columns-except transform.

use async_trait::async_trait;
use trellis_data::{ColumnId, DataSet};

use crate::builder::NodeHandle;
use crate::error::{GraphError, GraphResult, TransformResult};
use crate::token::ValueToken;
use crate::transform::Transform;

/// Publishes every regular column of its parent except the named ones.
///
/// Names that do not match any parent output are ignored.
#[derive(Debug, Clone)]
pub struct DropColumns {
    inputs: Vec<ValueToken>,
    outputs: Vec<ColumnId>,
}

impl DropColumns {
    /// Creates a drop over the columns of `parent`.
    pub fn new(parent: &NodeHandle, exclude: &[&str]) -> GraphResult<Self> {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for id in parent.outputs() {
            if parent.is_train_only(id.name()) || exclude.contains(&id.name()) {
                continue;
            }
            inputs.push(parent.token(id)?);
            outputs.push(id.clone());
        }
        if outputs.is_empty() {
            return Err(GraphError::InvalidGraph(
                "dropping every column leaves no values".into(),
            ));
        }
        Ok(Self { inputs, outputs })
    }
}

#[async_trait]
impl Transform for DropColumns {
    fn inputs(&self) -> &[ValueToken] {
        &self.inputs
    }

    fn outputs(&self) -> &[ColumnId] {
        &self.outputs
    }

    async fn apply(&self, input: DataSet) -> TransformResult<DataSet> {
        // Gathering already projected the kept columns out of the parent.
        Ok(input)
    }
}
