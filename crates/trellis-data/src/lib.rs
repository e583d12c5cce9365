#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod column;
mod dataset;
mod error;
mod observation;
mod value;

pub use column::{Column, ColumnId};
pub use dataset::{DataSet, DataSetBuilder};
pub use error::{DataError, DataResult};
pub use observation::{Observation, Rows};
pub use value::{Value, ValueKind};
