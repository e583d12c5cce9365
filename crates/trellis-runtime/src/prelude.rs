//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types for ergonomic imports:
//!
//! ```rust
//! use trellis_runtime::prelude::*;
//! ```

pub use crate::builder::{GraphBuilder, NodeHandle, SourceBuilder};
pub use crate::engine::{Engine, EngineConfig};
pub use crate::error::{GraphError, GraphResult, TransformError, TransformResult};
pub use crate::graph::{DataGraph, ResultHandle};
pub use crate::id::NodeId;
pub use crate::token::ValueToken;
pub use crate::transform::Transform;
pub use crate::transforms::{ColumnSubset, DropColumns, MergeColumns};

pub use trellis_data::{
    Column, ColumnId, DataError, DataResult, DataSet, DataSetBuilder, Observation, Value,
    ValueKind,
};
