#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod engine;
pub mod transforms;

mod builder;
mod error;
mod graph;
mod id;
mod node;
mod token;
mod transform;

#[doc(hidden)]
pub mod prelude;

pub use builder::{GraphBuilder, NodeHandle, SourceBuilder};
pub use error::{GraphError, GraphResult, TransformError, TransformResult};
pub use graph::{DataGraph, ResultHandle};
pub use id::NodeId;
pub use token::ValueToken;
pub use transform::Transform;

/// Tracing target for runtime operations.
pub const TRACING_TARGET: &str = "trellis_runtime";
