//! The transform interface consumed by graph nodes.

use async_trait::async_trait;
use trellis_data::{ColumnId, DataSet};

use crate::error::TransformResult;
use crate::token::ValueToken;

/// A unit of computation attached to a graph node.
///
/// A transform declares the tokens it consumes and the column ids it
/// produces. The engine gathers its input by projecting each parent's output
/// onto the declared tokens and joining the projections row for row, then
/// invokes [`fit_apply`] during training or [`apply`] during inference.
///
/// Stateless transforms implement only [`apply`]; the default [`fit_apply`]
/// delegates to it. Trainable transforms override [`fit_apply`] to update
/// their learned state before producing output, and make [`apply`] fail with
/// [`TransformError::Untrained`] until fitted. Given identical input and
/// state, both methods must be deterministic.
///
/// Tokens listed in [`train_only_inputs`] are gathered only while fitting;
/// they may reference train-only source values. Tokens listed in [`inputs`]
/// are gathered in both modes and must be available during inference.
///
/// [`apply`]: Transform::apply
/// [`fit_apply`]: Transform::fit_apply
/// [`inputs`]: Transform::inputs
/// [`train_only_inputs`]: Transform::train_only_inputs
/// [`TransformError::Untrained`]: crate::TransformError::Untrained
#[async_trait]
pub trait Transform: Send + Sync {
    /// Tokens this transform consumes in both execution modes.
    fn inputs(&self) -> &[ValueToken];

    /// Tokens this transform consumes only while fitting.
    fn train_only_inputs(&self) -> &[ValueToken] {
        &[]
    }

    /// Column ids this transform produces.
    fn outputs(&self) -> &[ColumnId];

    /// Produces output from the gathered input using existing state.
    async fn apply(&self, input: DataSet) -> TransformResult<DataSet>;

    /// Fits internal state on the gathered input, then produces output.
    async fn fit_apply(&mut self, input: DataSet) -> TransformResult<DataSet> {
        self.apply(input).await
    }
}
